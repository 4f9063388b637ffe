//! Tracing initialization
//!
//! Plain `tracing-subscriber` setup: an `EnvFilter` plus a text or JSON fmt layer.

mod init_basic;

pub use init_basic::{init_telemetry, shutdown_telemetry, LogFormat, TelemetryConfig};
