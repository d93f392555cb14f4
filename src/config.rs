//! config.rs
//! Behavior configuration: listening endpoint, frame pacing hints, scene targets.
//! - defaults are compile-time constants matching the deployed rig
//! - `from_env()` externalises the deployment-specific values (address, prim, CSV log)

use std::{
    env,
    net::SocketAddr,
    path::PathBuf,
    time::Duration,
};

use crate::component_b::actuator::SceneTargets;
use crate::error::ConfigError;

pub const DEFAULT_PORT: u16 = 8881;
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 20;     // advisory; host drives the cadence
pub const DEFAULT_RECV_BUFFER_LEN: usize = 1024;    // bytes per datagram read
pub const DEFAULT_MAX_DRAIN_READS: usize = 4096;    // per-frame bound under a datagram flood
pub const DEFAULT_PRIM_PATH: &str = "/DigiTwin";

pub const ENV_BIND_ADDR: &str = "PUPPET_UDP_ADDR";
pub const ENV_PRIM_PATH: &str = "PUPPET_PRIM_PATH";
pub const ENV_FRAME_LOG: &str = "PUPPET_FRAME_LOG";

#[derive(Debug, Clone)]
pub struct BehaviorConfig {
    pub bind_addr: SocketAddr,
    pub sample_interval: Duration,
    pub recv_buffer_len: usize,
    pub max_drain_reads: usize,
    /// Prim the behavior is attached to; its rotation is reset on teardown.
    pub prim_path: String,
    pub targets: SceneTargets,
    /// Per-frame CSV record; disabled when `None`.
    pub frame_log: Option<PathBuf>,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            sample_interval: Duration::from_millis(DEFAULT_SAMPLE_INTERVAL_MS),
            recv_buffer_len: DEFAULT_RECV_BUFFER_LEN,
            max_drain_reads: DEFAULT_MAX_DRAIN_READS,
            prim_path: DEFAULT_PRIM_PATH.to_string(),
            targets: SceneTargets::default(),
            frame_log: None,
        }
    }
}

impl BehaviorConfig {
    /// Defaults overridden by `PUPPET_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(raw) = lookup(ENV_BIND_ADDR) {
            cfg.bind_addr = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: ENV_BIND_ADDR,
                value: raw.clone(),
            })?;
        }

        if let Some(raw) = lookup(ENV_PRIM_PATH) {
            let path = raw.trim();
            if !path.starts_with('/') {
                return Err(ConfigError::Invalid { key: ENV_PRIM_PATH, value: raw });
            }
            cfg.prim_path = path.to_string();
        }

        if let Some(raw) = lookup(ENV_FRAME_LOG) {
            if !raw.trim().is_empty() {
                cfg.frame_log = Some(PathBuf::from(raw.trim()));
            }
        }

        Ok(cfg)
    }

    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    pub fn with_frame_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.frame_log = Some(path.into());
        self
    }
}
