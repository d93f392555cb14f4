//! behavior.rs
//! Host-facing behavior: lifecycle state machine + the per-frame pipeline.
//!
//! Pipeline per `on_update` (Playing only):
//!   drain socket (latest wins) → parse → map angles + scale → write stage
//!
//! Lifecycle:
//! - `on_init`:    Unloaded → Initialized
//! - `on_play`:    Initialized | Paused | Stopped → Playing (binds the session socket)
//! - `on_pause`:   Playing → Paused (releases the socket)
//! - `on_stop`:    any → Stopped (releases the socket, resets pose); idempotent
//! - `on_destroy`: any → Unloaded (same teardown as stop)
//!
//! Nothing raised inside a frame escapes `on_update`; the outcome is returned instead.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use log::{debug, info, warn};

use crate::component_a::{
    frame_drain::FrameDrain,
    parser::{self, SensorSample},
    socket_channel::SocketChannel,
};
use crate::component_b::{
    actuator,
    mapper::{self, JointAngles, ScaleFactor},
    scene::Stage,
};
use crate::config::BehaviorConfig;
use crate::error::{BehaviorError, ParseError, SceneError};
use crate::utils::{
    metrics::{FrameMetrics, push_capped, push_capped_u64},
    recorder::{FrameKind, FrameRecord, FrameRecorder},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Unloaded,
    Initialized,
    Playing,
    Paused,
    Stopped,
}

/// One play run: owns the socket exclusively.
pub struct Session {
    channel: SocketChannel,
    drain: FrameDrain,
    /// Advisory only; the host's frame callback sets the real cadence.
    pub sample_interval: Duration,
    pub started_at: Instant,
}

impl Session {
    pub fn open(config: &BehaviorConfig) -> Result<Self, BehaviorError> {
        let channel = SocketChannel::open(config.bind_addr)?;
        Ok(Self {
            channel,
            drain: FrameDrain::new(config.recv_buffer_len, config.max_drain_reads),
            sample_interval: config.sample_interval,
            started_at: Instant::now(),
        })
    }

    pub fn channel(&self) -> &SocketChannel {
        &self.channel
    }

    fn close(&mut self) {
        self.channel.close();
    }
}

/// Values written to the stage in one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Actuation {
    pub sample: SensorSample,
    pub angles: JointAngles,
    pub scale: ScaleFactor,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// Not playing; nothing polled.
    Inactive,
    /// No datagram queued this frame.
    NoData,
    Applied(Actuation),
    ParseFailed(ParseError),
    SceneFailed(SceneError),
}

/// Telemetry-driven puppet behavior, generic over the host's stage.
pub struct PuppetBehavior<S: Stage> {
    config: BehaviorConfig,
    stage: S,
    state: LifecycleState,
    session: Option<Session>,
    metrics: FrameMetrics,
    recorder: Option<Arc<FrameRecorder>>,
}

impl<S: Stage> PuppetBehavior<S> {
    pub fn new(config: BehaviorConfig, stage: S) -> Self {
        Self {
            config,
            stage,
            state: LifecycleState::Unloaded,
            session: None,
            metrics: FrameMetrics::default(),
            recorder: None,
        }
    }

    /// Route per-frame records to `recorder` (exporter is owned by the caller).
    pub fn with_recorder(mut self, recorder: Arc<FrameRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn stage(&self) -> &S {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut S {
        &mut self.stage
    }

    pub fn config(&self) -> &BehaviorConfig {
        &self.config
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn metrics(&self) -> &FrameMetrics {
        &self.metrics
    }

    // ========================================================================
    // Host lifecycle callbacks
    // ========================================================================

    pub fn on_init(&mut self) {
        info!("[Behavior] on_init -> {}", self.config.prim_path);
        if self.state == LifecycleState::Unloaded {
            self.state = LifecycleState::Initialized;
        }
    }

    /// Bind the session socket. A bind failure leaves the state unchanged.
    pub fn on_play(&mut self) -> Result<(), BehaviorError> {
        info!("[Behavior] on_play -> {}", self.config.prim_path);
        match self.state {
            LifecycleState::Playing => {
                debug!("[Behavior] already playing");
                return Ok(());
            }
            LifecycleState::Unloaded => self.on_init(),
            _ => {}
        }

        let session = Session::open(&self.config)?;
        self.session = Some(session);
        self.metrics.reset();
        self.state = LifecycleState::Playing;
        Ok(())
    }

    pub fn on_pause(&mut self) {
        info!("[Behavior] on_pause -> {}", self.config.prim_path);
        if self.state != LifecycleState::Playing {
            return;
        }
        self.release_session();
        self.state = LifecycleState::Paused;
    }

    pub fn on_stop(&mut self) {
        info!("[Behavior] on_stop -> {}", self.config.prim_path);
        self.teardown();
        if self.state != LifecycleState::Unloaded {
            self.state = LifecycleState::Stopped;
        }
    }

    pub fn on_destroy(&mut self) {
        info!("[Behavior] on_destroy -> {}", self.config.prim_path);
        self.teardown();
        self.state = LifecycleState::Unloaded;
    }

    /// One host frame. Never fails; see [`FrameOutcome`].
    pub fn on_update(&mut self, current_time: f64, delta_time: f64) -> FrameOutcome {
        let Some(session) = self.session.as_mut() else {
            return FrameOutcome::Inactive;
        };
        if self.state != LifecycleState::Playing {
            return FrameOutcome::Inactive;
        }

        let report = session.drain.drain_report(&mut session.channel);

        self.metrics.frames += 1;
        self.metrics.datagrams += report.received as u64;
        self.metrics.stale_discarded += report.stale() as u64;
        if report.truncated {
            self.metrics.truncated_drains += 1;
        }
        push_capped(&mut self.metrics.frame_dt, delta_time);

        let outcome = match report.latest {
            None => {
                self.metrics.no_data += 1;
                FrameOutcome::NoData
            }
            Some(datagram) => match parser::parse(&datagram) {
                Err(e) => {
                    debug!("[Behavior] dropping frame from {}: {}", datagram.from, e);
                    self.metrics.parse_errors += 1;
                    FrameOutcome::ParseFailed(e)
                }
                Ok(sample) => {
                    let angles = mapper::map_angles(&sample);
                    let scale = mapper::map_scale(sample.fsr_reading);

                    match actuator::apply(&mut self.stage, &self.config.targets, &angles, scale) {
                        Ok(()) => {
                            self.metrics.applied += 1;
                            push_capped(&mut self.metrics.scale, scale.value());
                            push_capped_u64(
                                &mut self.metrics.apply_latency_us,
                                datagram.received_at.elapsed().as_micros() as u64,
                            );
                            FrameOutcome::Applied(Actuation { sample, angles, scale })
                        }
                        Err(e) => {
                            warn!("[Behavior] scene write skipped: {}", e);
                            self.metrics.scene_errors += 1;
                            FrameOutcome::SceneFailed(e)
                        }
                    }
                }
            },
        };

        if let Some(recorder) = &self.recorder {
            recorder.record(frame_record(
                self.metrics.frames,
                current_time,
                delta_time,
                report.received,
                &outcome,
            ));
        }

        outcome
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    fn release_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.close();
            debug!(
                "[Behavior] session closed after {:.2}s: frames={} applied={} skipped={}",
                session.started_at.elapsed().as_secs_f64(),
                self.metrics.frames,
                self.metrics.applied,
                self.metrics.skipped()
            );
        }
    }

    fn teardown(&mut self) {
        self.release_session();
        if let Err(e) = actuator::reset_pose(&mut self.stage, &self.config.prim_path) {
            warn!("[Behavior] pose reset skipped: {}", e);
        }
    }
}

fn frame_record(
    frame: u64,
    host_time: f64,
    delta_time: f64,
    datagrams: usize,
    outcome: &FrameOutcome,
) -> FrameRecord {
    let (kind, applied) = match outcome {
        FrameOutcome::Applied(a) => (FrameKind::Applied, Some(a)),
        FrameOutcome::ParseFailed(_) => (FrameKind::ParseError, None),
        FrameOutcome::SceneFailed(_) => (FrameKind::SceneError, None),
        FrameOutcome::NoData | FrameOutcome::Inactive => (FrameKind::NoData, None),
    };

    FrameRecord {
        frame,
        host_time,
        delta_time,
        kind,
        datagrams,
        base_deg: applied.map(|a| a.angles.base),
        shoulder_deg: applied.map(|a| a.angles.shoulder),
        elbow_deg: applied.map(|a| a.angles.elbow),
        wrist_deg: applied.map(|a| a.angles.wrist),
        scale: applied.map(|a| a.scale.value()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component_b::{
        actuator::{ROTATE_ATTR, SceneTargets},
        scene::{AttrValue, InMemoryStage},
    };
    use std::net::{SocketAddr, UdpSocket};

    const PRIM: &str = "/DigiTwin";

    fn rig_stage() -> InMemoryStage {
        let mut stage = InMemoryStage::with_prims(SceneTargets::default().paths().map(str::to_string));
        stage.define_prim(PRIM);
        stage
    }

    fn loopback_config() -> BehaviorConfig {
        BehaviorConfig::default().with_bind_addr(SocketAddr::from(([127, 0, 0, 1], 0)))
    }

    #[test]
    fn update_before_play_is_inactive() {
        let mut b = PuppetBehavior::new(loopback_config(), rig_stage());
        b.on_init();
        assert_eq!(b.state(), LifecycleState::Initialized);
        assert_eq!(b.on_update(0.0, 0.016), FrameOutcome::Inactive);
        assert_eq!(b.metrics().frames, 0);
    }

    #[test]
    fn play_opens_and_pause_releases_socket() {
        let mut b = PuppetBehavior::new(loopback_config(), rig_stage());
        b.on_init();
        b.on_play().unwrap();
        assert_eq!(b.state(), LifecycleState::Playing);
        assert!(b.session().unwrap().channel().is_open());
        assert_eq!(b.on_update(0.0, 0.016), FrameOutcome::NoData);

        b.on_pause();
        assert_eq!(b.state(), LifecycleState::Paused);
        assert!(b.session().is_none());
        assert_eq!(b.on_update(0.016, 0.016), FrameOutcome::Inactive);

        b.on_play().unwrap();
        assert_eq!(b.state(), LifecycleState::Playing);
    }

    #[test]
    fn stop_twice_and_stop_after_destroy_are_harmless() {
        let mut b = PuppetBehavior::new(loopback_config(), rig_stage());
        b.on_init();
        b.on_play().unwrap();

        b.on_stop();
        b.on_stop();
        assert_eq!(b.state(), LifecycleState::Stopped);
        assert_eq!(b.stage().attribute(PRIM, ROTATE_ATTR), Some(AttrValue::Vec3d([0.0; 3])));

        b.on_destroy();
        b.on_stop();
        assert_eq!(b.state(), LifecycleState::Unloaded);
    }

    #[test]
    fn bind_failure_leaves_state_unchanged() {
        let holder = UdpSocket::bind("127.0.0.1:0").unwrap();
        let taken = holder.local_addr().unwrap();

        let mut b = PuppetBehavior::new(BehaviorConfig::default().with_bind_addr(taken), rig_stage());
        b.on_init();
        assert!(b.on_play().is_err());
        assert_eq!(b.state(), LifecycleState::Initialized);
        assert!(b.session().is_none());
    }

    #[test]
    fn teardown_without_behavior_prim_does_not_panic() {
        let stage = InMemoryStage::with_prims(SceneTargets::default().paths().map(str::to_string));
        let mut b = PuppetBehavior::new(loopback_config(), stage);
        b.on_init();
        b.on_stop();
        b.on_destroy();
        assert_eq!(b.state(), LifecycleState::Unloaded);
    }

    #[test]
    fn frame_record_carries_applied_values() {
        let outcome = FrameOutcome::Applied(Actuation {
            sample: SensorSample { pot_1: 0.0, pot_2: 0.0, pot_3: 0.0, pot_4: 0.0, fsr_reading: 0.0 },
            angles: JointAngles { base: 1.0, shoulder: 2.0, elbow: 3.0, wrist: -4.0 },
            scale: ScaleFactor(0.1),
        });
        let rec = frame_record(7, 1.0, 0.02, 3, &outcome);
        assert_eq!(rec.kind, FrameKind::Applied);
        assert_eq!(rec.wrist_deg, Some(-4.0));
        assert_eq!(rec.datagrams, 3);

        let rec = frame_record(8, 1.0, 0.02, 0, &FrameOutcome::NoData);
        assert_eq!(rec.kind, FrameKind::NoData);
        assert!(rec.scale.is_none());
    }
}
