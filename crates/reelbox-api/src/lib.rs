//! Reelbox API Library
//!
//! HTTP surface for video uploads and metadata: the upload orchestrator,
//! handlers, the authorization gate and application setup.

mod handlers;
mod utils;

pub mod auth;
pub mod error;
pub mod services;
pub mod setup;
pub mod state;

// Re-exports
pub use error::{HttpAppError, ValidatedJson};
pub use services::{PublishOutcome, UploadOrchestrator, UploadOutcome, UploadRequest, UploadStage};
pub use state::{AppState, AuditLimits};
