//! Business services behind the HTTP handlers.

pub mod upload;

pub use upload::{
    PublishOutcome, UploadOrchestrator, UploadOutcome, UploadRequest, UploadStage,
};
