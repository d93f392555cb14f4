//! CSV export of session summaries: one row per play run.
//!
//! Appends to a persistent file so repeated runs can be compared. Header is written
//! only when the file is new.

use crate::utils::metrics::{FrameMetrics, calculate_stats, calculate_stats_u64};
use csv::WriterBuilder;
use serde::Serialize;
use std::{
    fs::{OpenOptions, create_dir_all},
    path::Path,
};
use log::info;

#[derive(Debug, Serialize, PartialEq)]
pub struct SessionSummary {
    pub frames: u64,
    pub applied: u64,
    pub no_data: u64,
    pub parse_errors: u64,
    pub scene_errors: u64,
    pub datagrams: u64,
    pub stale_discarded: u64,
    pub applied_rate: f64,
    pub mean_dt_ms: f64,
    pub mean_scale: f64,
    pub max_apply_latency_us: f64,
}

impl SessionSummary {
    pub fn from_metrics(m: &FrameMetrics) -> Self {
        let applied_rate = if m.frames > 0 {
            (m.applied as f64 / m.frames as f64) * 100.0
        } else {
            0.0
        };

        Self {
            frames: m.frames,
            applied: m.applied,
            no_data: m.no_data,
            parse_errors: m.parse_errors,
            scene_errors: m.scene_errors,
            datagrams: m.datagrams,
            stale_discarded: m.stale_discarded,
            applied_rate,
            mean_dt_ms: calculate_stats(&m.frame_dt).map_or(0.0, |s| s.mean * 1_000.0),
            mean_scale: calculate_stats(&m.scale).map_or(0.0, |s| s.mean),
            max_apply_latency_us: calculate_stats_u64(&m.apply_latency_us).map_or(0.0, |s| s.max),
        }
    }
}

/// Append one summary row to `csv_path`, creating parent dirs and header as needed.
pub fn export_summary_csv(metrics: &FrameMetrics, csv_path: &Path) -> Result<(), csv::Error> {
    if let Some(parent) = csv_path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }

    let file_exists = csv_path.exists();
    let file = OpenOptions::new().create(true).append(true).open(csv_path)?;

    let mut wtr = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);
    wtr.serialize(SessionSummary::from_metrics(metrics))?;
    wtr.flush()?;

    info!("Summary exported to: {}", csv_path.display());
    Ok(())
}
