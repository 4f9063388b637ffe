//! Video upload orchestration
//!
//! `UploadOrchestrator` walks one upload through validation, object storage,
//! metadata insert, policy update and event publish. Only the first three
//! steps can fail the request.

mod orchestrator;
mod types;

pub use orchestrator::UploadOrchestrator;
pub use types::{PublishOutcome, UploadOutcome, UploadRequest, UploadStage};
