pub mod metrics;
pub mod recorder;
pub mod export;
