//! Error types for the telemetry → scene pipeline.
//!
//! Only `BehaviorError` ever reaches the host (from `on_play`); everything else is
//! handled inside the frame that produced it.

use std::{io, net::SocketAddr};
use thiserror::Error;

/// Socket channel faults.
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("failed to bind UDP endpoint {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("failed to configure UDP socket: {0}")]
    Configure(#[source] io::Error),

    #[error("channel is closed")]
    Closed,

    #[error("receive failed: {0}")]
    Recv(#[source] io::Error),
}

/// Payload decoding faults. Any of these skips the whole frame.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("payload is not valid text: {0}")]
    Decode(String),

    #[error("expected {expected} fields, got {actual}")]
    FieldCount { expected: usize, actual: usize },

    #[error("field {index} is not numeric: {token:?}")]
    NotNumeric { index: usize, token: String },

    #[error("field {index} is not finite: {token:?}")]
    NonFinite { index: usize, token: String },
}

/// Stage access faults.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("no prim at path {0}")]
    MissingPrim(String),

    #[error("prim {path} rejected attribute {attr}")]
    Rejected { path: String, attr: String },
}

/// Malformed externalised configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{key}: invalid value {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Errors surfaced to the host through lifecycle callbacks.
#[derive(Error, Debug)]
pub enum BehaviorError {
    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
