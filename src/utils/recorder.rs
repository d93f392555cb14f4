//! recorder.rs
//! Optional per-frame CSV trace of what the behavior applied.
//!
//! - `record()` is a lock-free push from the frame callback; a full queue drops and counts
//! - a background exporter drains the queue in batches and serialises rows with `csv`
//! - `stop()` drains whatever is left, flushes and joins; safe to call more than once

use std::{
    fs::File,
    io::BufWriter,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_queue::ArrayQueue;
use csv::Writer;
use log::{debug, error};
use parking_lot::Mutex;
use serde::Serialize;

const RECORD_CAPACITY: usize = 4096;
const EXPORT_POLL_MS: u64 = 5;
const FLUSH_BATCHES: usize = 8;

/// How a frame ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameKind {
    Applied,
    NoData,
    ParseError,
    SceneError,
}

/// One CSV row.
#[derive(Debug, Clone, Serialize)]
pub struct FrameRecord {
    pub frame: u64,
    pub host_time: f64,
    pub delta_time: f64,
    pub kind: FrameKind,
    pub datagrams: usize,
    pub base_deg: Option<f64>,
    pub shoulder_deg: Option<f64>,
    pub elbow_deg: Option<f64>,
    pub wrist_deg: Option<f64>,
    pub scale: Option<f64>,
}

pub struct FrameRecorder {
    queue: Arc<ArrayQueue<FrameRecord>>,
    dropped: Arc<AtomicU64>,
    running: Arc<AtomicBool>,
    exporter: Mutex<Option<JoinHandle<()>>>,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::with_capacity(RECORD_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            queue: Arc::new(ArrayQueue::new(capacity.max(1))),
            dropped: Arc::new(AtomicU64::new(0)),
            running: Arc::new(AtomicBool::new(false)),
            exporter: Mutex::new(None),
        }
    }

    /// Non-blocking; drops the record if the queue is full.
    #[inline]
    pub fn record(&self, rec: FrameRecord) {
        if self.queue.push(rec).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Spawn the CSV exporter. Only one exporter may run at a time.
    pub fn start_exporter(&self, output_csv: PathBuf) -> Result<(), String> {
        let mut guard = self.exporter.lock();
        if guard.is_some() {
            return Err("exporter already running".into());
        }

        let file = File::create(&output_csv)
            .map_err(|e| format!("failed to create {}: {}", output_csv.display(), e))?;

        let queue = self.queue.clone();
        let running = self.running.clone();
        running.store(true, Ordering::SeqCst);

        let handle = thread::Builder::new()
            .name("frame-recorder".into())
            .spawn(move || {
                let mut wtr = Writer::from_writer(BufWriter::new(file));
                let mut batches = 0usize;

                while running.load(Ordering::SeqCst) {
                    // Batch dequeue: up to 256 rows per poll
                    let written = write_batch(&queue, &mut wtr, 256);
                    if written > 0 {
                        batches += 1;
                        if batches >= FLUSH_BATCHES {
                            wtr.flush().ok();
                            batches = 0;
                        }
                    } else {
                        thread::sleep(Duration::from_millis(EXPORT_POLL_MS));
                    }
                }

                // Final drain
                write_batch(&queue, &mut wtr, usize::MAX);
                if let Err(e) = wtr.flush() {
                    error!("[FrameRecorder] flush failed: {}", e);
                }
                debug!("[FrameRecorder] exporter exiting");
            })
            .map_err(|e| format!("failed to spawn exporter: {}", e))?;

        *guard = Some(handle);
        Ok(())
    }

    /// Stop and join the exporter, flushing remaining rows.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        let handle = self.exporter.lock().take();
        if let Some(h) = handle {
            let _ = h.join();
        }
    }
}

impl Default for FrameRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FrameRecorder {
    fn drop(&mut self) {
        self.stop();
    }
}

fn write_batch<W: std::io::Write>(
    queue: &ArrayQueue<FrameRecord>,
    wtr: &mut Writer<W>,
    max: usize,
) -> usize {
    let mut written = 0;
    while written < max {
        match queue.pop() {
            Some(rec) => {
                if let Err(e) = wtr.serialize(&rec) {
                    error!("[FrameRecorder] failed to write row {}: {}", rec.frame, e);
                }
                written += 1;
            }
            None => break,
        }
    }
    written
}
