//! frame_drain.rs
//! Latest-value-wins sampling of the socket once per frame.
//! - reads until the source would block; every read overwrites the previous capture
//! - older datagrams are discarded unread by the pipeline (only counted)
//! - bounded by `max_reads` so a flood cannot stall the frame

use std::{net::SocketAddr, time::Instant};
use log::warn;

use crate::component_a::socket_channel::DatagramSource;

/// One received payload.
#[derive(Debug, Clone)]
pub struct Datagram {
    pub payload: Vec<u8>,
    pub from: SocketAddr,
    pub received_at: Instant,
}

/// Result of one drain pass.
#[derive(Debug, Default)]
pub struct DrainReport {
    pub latest: Option<Datagram>,
    /// Datagrams read this pass, including the one kept.
    pub received: usize,
    /// Pass stopped at `max_reads` with data possibly still queued.
    pub truncated: bool,
}

impl DrainReport {
    /// Datagrams superseded by a newer one in the same pass.
    pub fn stale(&self) -> usize {
        self.received.saturating_sub(1)
    }
}

pub struct FrameDrain {
    buf: Vec<u8>,
    max_reads: usize,
}

impl FrameDrain {
    pub fn new(recv_buffer_len: usize, max_reads: usize) -> Self {
        Self {
            buf: vec![0u8; recv_buffer_len.max(1)],
            max_reads: max_reads.max(1),
        }
    }

    /// Newest datagram currently queued on `source`, if any.
    pub fn drain<S: DatagramSource>(&mut self, source: &mut S) -> Option<Datagram> {
        self.drain_report(source).latest
    }

    pub fn drain_report<S: DatagramSource>(&mut self, source: &mut S) -> DrainReport {
        let mut report = DrainReport::default();

        loop {
            if report.received >= self.max_reads {
                report.truncated = true;
                break;
            }

            match source.try_recv(&mut self.buf) {
                Ok(Some((len, from))) => {
                    report.received += 1;
                    report.latest = Some(Datagram {
                        payload: self.buf[..len].to_vec(),
                        from,
                        received_at: Instant::now(),
                    });
                }
                Ok(None) => break,
                Err(e) => {
                    // Keep whatever was captured; next frame retries.
                    warn!("[FrameDrain] receive error after {} datagrams: {}", report.received, e);
                    break;
                }
            }
        }

        report
    }
}
