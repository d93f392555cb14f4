
//! Per-session frame metrics for the telemetry → scene pipeline.
//!
//! Counters classify every host frame (applied / no data / skipped) and count datagrams
//! read versus discarded as stale. Histories are bounded to 1000 points per metric.

use std::collections::VecDeque;

pub const MAX_POINTS: usize = 1_000;

#[derive(Debug, Default, Clone)]
pub struct FrameMetrics {
    /// Frames processed while playing.
    pub frames: u64,
    pub applied: u64,
    pub no_data: u64,
    pub parse_errors: u64,
    pub scene_errors: u64,

    /// Datagrams read from the socket, including superseded ones.
    pub datagrams: u64,
    /// Datagrams overwritten by a newer one in the same frame.
    pub stale_discarded: u64,
    /// Frames whose drain hit the per-frame read cap.
    pub truncated_drains: u64,

    /// Host delta time per frame (seconds)
    pub frame_dt: VecDeque<f64>,
    /// Applied gripper scale
    pub scale: VecDeque<f64>,
    /// Receive → scene write latency (microseconds)
    pub apply_latency_us: VecDeque<u64>,
}

impl FrameMetrics {
    pub fn skipped(&self) -> u64 {
        self.parse_errors + self.scene_errors
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Appends value to metrics buffer; removes oldest if at capacity (FIFO).
#[inline]
pub fn push_capped(buf: &mut VecDeque<f64>, val: f64) {
    if buf.len() >= MAX_POINTS {
        buf.pop_front();
    }
    buf.push_back(val);
}

/// Appends u64 value to metrics buffer; removes oldest if at capacity.
#[inline]
pub fn push_capped_u64(buf: &mut VecDeque<u64>, val: u64) {
    if buf.len() >= MAX_POINTS {
        buf.pop_front();
    }
    buf.push_back(val);
}

/// Statistics summary for a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub count: usize,
}

/// Computes min, max, mean for float buffer.
pub fn calculate_stats(data: &VecDeque<f64>) -> Option<Stats> {
    if data.is_empty() {
        return None;
    }

    let count = data.len();
    let min = data.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let mean = data.iter().sum::<f64>() / count as f64;

    Some(Stats { min, max, mean, count })
}

/// Computes min, max, mean for u64 buffer (cast to f64).
pub fn calculate_stats_u64(data: &VecDeque<u64>) -> Option<Stats> {
    if data.is_empty() {
        return None;
    }

    let count = data.len();
    let min = data.iter().map(|&x| x as f64).fold(f64::INFINITY, f64::min);
    let max = data.iter().map(|&x| x as f64).fold(f64::NEG_INFINITY, f64::max);
    let mean = data.iter().map(|&x| x as f64).sum::<f64>() / count as f64;

    Some(Stats { min, max, mean, count })
}
