//! # Puppet Host
//! Stand-in for the simulation host: owns the stage, drives the behavior's
//! lifecycle and calls `on_update` from a fixed frame clock.
//!
//! A rig emulator thread streams `p1,p2,p3,p4,fsr` datagrams at the sample
//! interval, so the full socket → parse → map → stage path runs end to end.
//!
//! ## Usage
//! `puppet_host [seconds]` (default 10). Logging via `RUST_LOG`.
//! Endpoint, prim path and frame log come from `PUPPET_*` variables.
//!
//! ## Outputs
//! - `PUPPET_FRAME_LOG` — per-frame CSV (optional).
//! - `data/logs/session_summary.csv` — one row per run.

use digitwin_puppet::{
    behavior::{FrameOutcome, PuppetBehavior},
    component_a::sensor::RigEmulator,
    component_b::scene::InMemoryStage,
    config::BehaviorConfig,
    utils::{export::export_summary_csv, recorder::FrameRecorder},
};

use crossbeam::channel::tick;
use std::{
    env,
    net::SocketAddr,
    path::Path,
    process,
    sync::{Arc, atomic::{AtomicBool, Ordering}},
    thread,
    time::{Duration, Instant},
};
use log::{info, error, warn};

const DEFAULT_RUN_SECS: u64 = 10;
const FRAME_PERIOD_MS: u64 = 16;    // ~60 Hz host tick
const SUMMARY_CSV: &str = "data/logs/session_summary.csv";

fn main() {
    env_logger::init();
    info!("=== PUPPET HOST START ===");

    let config = match BehaviorConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("invalid configuration: {}", e);
            process::exit(2);
        }
    };

    let run_secs = env::args()
        .nth(1)
        .and_then(|a| a.parse::<u64>().ok())
        .unwrap_or(DEFAULT_RUN_SECS);

    if let Err(e) = run_session(config, Duration::from_secs(run_secs)) {
        error!("{}", e);
        process::exit(1);
    }

    info!("=== PUPPET HOST FINISHED ===");
}

fn run_session(config: BehaviorConfig, run_for: Duration) -> Result<(), String> {
    // Stage holds the five driven targets plus the prim the behavior sits on.
    let mut stage = InMemoryStage::with_prims(config.targets.paths().map(str::to_string));
    stage.define_prim(config.prim_path.clone());

    let recorder = Arc::new(FrameRecorder::new());
    if let Some(path) = &config.frame_log {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        recorder.start_exporter(path.clone())?;
        info!("[Host] frame log -> {}", path.display());
    }

    let sample_interval = config.sample_interval;
    let mut behavior = PuppetBehavior::new(config, stage).with_recorder(recorder.clone());

    behavior.on_init();
    behavior.on_play().map_err(|e| format!("play failed: {}", e))?;

    let target = match behavior.session() {
        Some(s) => emulator_target(s.channel().local_addr()),
        None => return Err("session missing after play".into()),
    };

    // ========================================================================
    // Rig emulator: periodic UDP telemetry at the sample interval
    // ========================================================================
    let running = Arc::new(AtomicBool::new(true));
    let emulator = RigEmulator::new(target, sample_interval, running.clone());
    let sent = emulator.sent.clone();
    let emulator_handle = thread::Builder::new()
        .name("rig-emulator".into())
        .spawn(move || {
            if let Err(e) = emulator.run() {
                error!("[RigEmulator] {}", e);
            }
        })
        .map_err(|e| format!("failed to spawn emulator: {}", e))?;

    info!("[Host] streaming to {} for {}s", target, run_for.as_secs());

    // ========================================================================
    // Frame loop
    // ========================================================================
    let ticker = tick(Duration::from_millis(FRAME_PERIOD_MS));
    let start = Instant::now();
    let mut last = start;
    let mut last_report = start;

    while start.elapsed() < run_for {
        if ticker.recv().is_err() {
            break;
        }
        let now = Instant::now();
        let delta = now.duration_since(last).as_secs_f64();
        last = now;

        match behavior.on_update(now.duration_since(start).as_secs_f64(), delta) {
            FrameOutcome::Applied(a) if now.duration_since(last_report) >= Duration::from_secs(1) => {
                last_report = now;
                info!(
                    "[Host] joints=({:.1}, {:.1}, {:.1}, {:.1}) deg scale={:.3}",
                    a.angles.base, a.angles.shoulder, a.angles.elbow, a.angles.wrist, a.scale.value()
                );
            }
            FrameOutcome::SceneFailed(e) => warn!("[Host] frame skipped: {}", e),
            _ => {}
        }
    }

    running.store(false, Ordering::Release);
    let _ = emulator_handle.join();

    let metrics = behavior.metrics().clone();
    behavior.on_stop();
    behavior.on_destroy();
    recorder.stop();

    info!(
        "[Host] sent={} frames={} applied={} no_data={} skipped={} stale={} dropped_records={}",
        sent.load(Ordering::Relaxed),
        metrics.frames,
        metrics.applied,
        metrics.no_data,
        metrics.skipped(),
        metrics.stale_discarded,
        recorder.dropped()
    );

    if let Err(e) = export_summary_csv(&metrics, Path::new(SUMMARY_CSV)) {
        error!("[Host] summary export failed: {}", e);
    }
    Ok(())
}

/// Wildcard binds are reached over loopback.
fn emulator_target(bound: SocketAddr) -> SocketAddr {
    if bound.ip().is_unspecified() {
        SocketAddr::from(([127, 0, 0, 1], bound.port()))
    } else {
        bound
    }
}
