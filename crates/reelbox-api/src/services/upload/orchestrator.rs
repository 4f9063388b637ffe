use std::sync::Arc;
use std::time::Duration;

use reelbox_core::models::{NewVideoMetadata, VideoProcessingEvent};
use reelbox_core::validation::validate_owner_id;
use reelbox_core::AppError;
use reelbox_db::{MetadataStore, VideoMetadataUpdate};
use reelbox_events::{EventPublisher, PublishError};
use reelbox_storage::BlobUploader;
use uuid::Uuid;

use super::types::{PublishOutcome, UploadOutcome, UploadRequest, UploadStage};

/// Runs one upload: validate, store the object, insert the row, apply policy, publish.
///
/// Steps up to the insert fail the run. The policy update and the publish are
/// best-effort and only show up in the outcome and the logs.
#[derive(Clone)]
pub struct UploadOrchestrator {
    store: Arc<dyn MetadataStore>,
    uploader: BlobUploader,
    publisher: Arc<dyn EventPublisher>,
    publish_timeout: Duration,
}

impl UploadOrchestrator {
    pub fn new(
        store: Arc<dyn MetadataStore>,
        uploader: BlobUploader,
        publisher: Arc<dyn EventPublisher>,
        publish_timeout: Duration,
    ) -> Self {
        Self {
            store,
            uploader,
            publisher,
            publish_timeout,
        }
    }

    pub fn uploader(&self) -> &BlobUploader {
        &self.uploader
    }

    #[tracing::instrument(
        skip(self, request),
        fields(owner_id = %request.owner_id, file_size = request.size)
    )]
    pub async fn run(&self, request: UploadRequest) -> Result<UploadOutcome, AppError> {
        let UploadRequest {
            owner_id,
            filename,
            content_type,
            visibility,
            download_allowed,
            content,
            size,
        } = request;

        // Validation has no side effects, so a failure here needs no cleanup.
        validate_owner_id(&owner_id)?;
        let filename = self.uploader.check_filename(&filename)?;
        self.uploader.check_size(size)?;

        let video_id = Uuid::new_v4();
        tracing::debug!(video_id = %video_id, stage = %UploadStage::Validated, "Upload validated");

        let stored = self
            .uploader
            .upload(&owner_id, video_id, &filename, &content_type, content, size)
            .await
            .map_err(|e| {
                tracing::error!(
                    video_id = %video_id,
                    owner_id = %owner_id,
                    stage = %UploadStage::Validated,
                    error = %e,
                    "Object upload failed; nothing was recorded"
                );
                AppError::from(e)
            })?;

        let file_size_bytes = i64::try_from(stored.size_bytes)
            .map_err(|_| AppError::PayloadTooLarge("File size out of range".to_string()))?;

        let row = NewVideoMetadata {
            video_id,
            original_filename: filename,
            storage_path: stored.key.clone(),
            file_size_bytes,
            owner_user_id: owner_id.clone(),
        };

        if let Err(e) = self.store.insert(&row).await {
            // The object stays in storage without a row; reconciliation picks it up.
            tracing::error!(
                video_id = %video_id,
                storage_key = %stored.key,
                stage = %UploadStage::Stored,
                error = %e,
                "Metadata insert failed after object upload"
            );
            return Err(e.into());
        }

        let policy = VideoMetadataUpdate::policy(visibility, download_allowed);
        let policy_applied = match self.store.update(video_id, &policy).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    video_id = %video_id,
                    storage_key = %stored.key,
                    stage = %UploadStage::MetadataInserted,
                    error = %e,
                    "Policy update failed; row keeps default visibility"
                );
                false
            }
        };

        let event = VideoProcessingEvent::new(video_id, stored.key.clone(), owner_id);
        let event_outcome = self.publish(&event, &stored.key).await;

        let final_stage = if policy_applied && event_outcome.is_published() {
            UploadStage::EventPublished
        } else {
            UploadStage::PartialFailure
        };

        tracing::info!(
            video_id = %video_id,
            storage_key = %stored.key,
            file_size = stored.size_bytes,
            stage = %final_stage,
            "Upload accepted"
        );

        Ok(UploadOutcome {
            video_id,
            storage_path: stored.key,
            file_size: stored.size_bytes,
            final_stage,
            policy_applied,
            event: event_outcome,
        })
    }

    async fn publish(&self, event: &VideoProcessingEvent, storage_key: &str) -> PublishOutcome {
        let result = tokio::time::timeout(self.publish_timeout, self.publisher.publish(event))
            .await
            .unwrap_or(Err(PublishError::Timeout(self.publish_timeout)));

        match result {
            Ok(message_id) => {
                tracing::info!(
                    video_id = %event.video_id,
                    message_id = %message_id,
                    backend = self.publisher.backend_name(),
                    "Processing event published"
                );
                PublishOutcome::Published(message_id)
            }
            Err(e) => {
                tracing::warn!(
                    video_id = %event.video_id,
                    storage_key = %storage_key,
                    stage = %UploadStage::PolicyApplied,
                    backend = self.publisher.backend_name(),
                    error = %e,
                    "Processing event not published; needs re-publish"
                );
                PublishOutcome::Failed(e.to_string())
            }
        }
    }
}
