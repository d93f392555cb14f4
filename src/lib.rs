//! # digitwin_puppet
//! Drives a robot digital twin from UDP sensor telemetry, one host frame at a time.
//!
//! ## Pipeline
//! - **Socket Channel:** non-blocking UDP endpoint, owned by one play session.
//! - **Frame Drain:** reads every queued datagram, keeps only the newest.
//! - **Parser:** `"p1,p2,p3,p4,fsr"` → five floats, all-or-nothing.
//! - **Mapper:** ADC counts → degrees (wrist inverted); FSR → gripper scale in [0.1, 1.0].
//! - **Actuator:** four joint drive targets + uniform cylinder scale written to the stage.
//!
//! The host calls [`behavior::PuppetBehavior`]'s lifecycle callbacks and hands it a
//! [`component_b::scene::Stage`] at construction.

pub mod component_a;
pub mod component_b;
pub mod utils;
pub mod behavior;
pub mod config;
pub mod error;

pub use behavior::{FrameOutcome, LifecycleState, PuppetBehavior};
pub use config::BehaviorConfig;
pub use error::BehaviorError;
