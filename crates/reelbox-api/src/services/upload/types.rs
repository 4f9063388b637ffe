//! Types used by the upload orchestrator

use std::fmt;

use reelbox_events::MessageId;
use reelbox_storage::ByteReader;
use uuid::Uuid;

/// Where an upload run stopped. The order is the order of the steps.
///
/// A run starts from a received `UploadRequest`; the first stage it records is `Validated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UploadStage {
    Validated,
    Stored,
    MetadataInserted,
    PolicyApplied,
    EventPublished,
    /// Row and object exist, but the policy update or the publish did not happen.
    PartialFailure,
}

impl UploadStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStage::Validated => "validated",
            UploadStage::Stored => "stored",
            UploadStage::MetadataInserted => "metadata_inserted",
            UploadStage::PolicyApplied => "policy_applied",
            UploadStage::EventPublished => "event_published",
            UploadStage::PartialFailure => "partial_failure",
        }
    }
}

impl fmt::Display for UploadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Published(MessageId),
    Failed(String),
}

impl PublishOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, PublishOutcome::Published(_))
    }
}

/// One caller upload, with the file already spooled server-side.
pub struct UploadRequest {
    pub owner_id: String,
    pub filename: String,
    pub content_type: String,
    pub visibility: String,
    pub download_allowed: bool,
    pub content: ByteReader,
    /// Bytes counted while spooling, not a client-declared length.
    pub size: u64,
}

impl fmt::Debug for UploadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadRequest")
            .field("owner_id", &self.owner_id)
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("visibility", &self.visibility)
            .field("download_allowed", &self.download_allowed)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub video_id: Uuid,
    pub storage_path: String,
    pub file_size: u64,
    pub final_stage: UploadStage,
    pub policy_applied: bool,
    pub event: PublishOutcome,
}
