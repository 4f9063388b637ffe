//! Reelbox Infrastructure Library
//!
//! Shared plumbing for Reelbox services:
//! - Middleware (request ID)
//! - Tracing subscriber initialization
//! - HTTP error response body

#[cfg(feature = "middleware")]
pub mod middleware;

#[cfg(feature = "observability-basic")]
pub mod telemetry;

pub mod error;

// Re-export commonly used types
#[cfg(feature = "middleware")]
pub use middleware::{request_id_middleware, RequestId, REQUEST_ID_HEADER};

#[cfg(feature = "observability-basic")]
pub use telemetry::{init_telemetry, shutdown_telemetry, LogFormat, TelemetryConfig};

pub use error::ErrorResponse;
