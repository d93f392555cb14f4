//! sensor.rs
//! Emulates the rig's microcontroller: four potentiometers + one FSR streamed over UDP.
//! - Real-time pacing: SpinSleeper keeps the 20 ms sample period steady
//! - Deadline tracking: late releases are counted, not compensated
//! - Payload matches the wire format the parser expects (`p1,p2,p3,p4,fsr`)

use rand::random_range;
use spin_sleep::{SpinSleeper, SpinStrategy};
use std::{
    f64::consts::TAU,
    io,
    net::{SocketAddr, UdpSocket},
    sync::{Arc, atomic::{AtomicBool, AtomicU64, Ordering}},
    time::{Duration, Instant},
};
use log::{debug, warn};

pub const POT_FULL_SCALE: f64 = 1023.0;
pub const FSR_SWEEP_MAX: f64 = 400.0;  // spans both clamp regions of the scale map

/// Synthetic reading for one release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigReading {
    pub pots: [f64; 4],
    pub fsr: f64,
}

impl RigReading {
    /// Wire text, integer-valued like the microcontroller's `analogRead`.
    pub fn to_payload(&self) -> String {
        format!(
            "{},{},{},{},{}",
            self.pots[0].round(),
            self.pots[1].round(),
            self.pots[2].round(),
            self.pots[3].round(),
            self.fsr.round()
        )
    }
}

/// Slow phase-shifted sweeps per joint, FSR triangle wave, small noise on top.
pub fn synth_reading(t_secs: f64, noise: f64) -> RigReading {
    let mut pots = [0.0; 4];
    for (i, pot) in pots.iter_mut().enumerate() {
        let phase = t_secs * 0.25 * TAU + i as f64 * TAU / 4.0;
        let jitter = if noise > 0.0 { random_range(-noise..noise) } else { 0.0 };
        *pot = (POT_FULL_SCALE / 2.0 * (1.0 + phase.sin()) + jitter).clamp(0.0, POT_FULL_SCALE);
    }

    let tri = (t_secs * 0.5).fract();
    let fsr = FSR_SWEEP_MAX * if tri < 0.5 { tri * 2.0 } else { (1.0 - tri) * 2.0 };

    RigReading { pots, fsr }
}

pub struct RigEmulator {
    pub target: SocketAddr,
    pub period: Duration,
    pub noise: f64,
    pub running: Arc<AtomicBool>,
    pub sent: Arc<AtomicU64>,
    pub late: Arc<AtomicU64>,
}

impl RigEmulator {
    pub fn new(target: SocketAddr, period: Duration, running: Arc<AtomicBool>) -> Self {
        Self {
            target,
            period,
            noise: 4.0,
            running,
            sent: Arc::new(AtomicU64::new(0)),
            late: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Periodic release loop; returns when `running` is cleared.
    pub fn run(&self) -> io::Result<()> {
        let socket = UdpSocket::bind(SocketAddr::from(([0, 0, 0, 0], 0)))?;
        let sleeper = SpinSleeper::new(100_000)
            .with_spin_strategy(SpinStrategy::YieldThread);

        let start = Instant::now();
        let mut next_release = start + self.period;

        while self.running.load(Ordering::Acquire) {
            let now = Instant::now();
            if now < next_release {
                sleeper.sleep(next_release - now);
            } else {
                // woke up late (OS scheduling jitter)
                self.late.fetch_add(1, Ordering::Relaxed);
            }

            let reading = synth_reading(start.elapsed().as_secs_f64(), self.noise);
            match socket.send_to(reading.to_payload().as_bytes(), self.target) {
                Ok(_) => {
                    self.sent.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => warn!("[RigEmulator] send to {} failed: {}", self.target, e),
            }

            next_release += self.period;
        }

        debug!(
            "[RigEmulator] stopped. sent={} late={}",
            self.sent.load(Ordering::Relaxed),
            self.late.load(Ordering::Relaxed)
        );
        Ok(())
    }
}
