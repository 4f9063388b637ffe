//! HTTP error response body
//!
//! The `IntoResponse` implementation for `AppError` lives in the binary crate
//! (reelbox-api) because of the orphan rule; this is only the wire shape.

use serde::Serialize;

/// Standard error response format for HTTP APIs
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}
