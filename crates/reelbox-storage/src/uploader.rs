//! Upload gate and streaming writer for original video files.
//!
//! `BlobUploader` owns the policy checks (extension, size, owner id, filename)
//! and the key layout, and hands the bytes to whichever `Storage` backend is
//! configured.

use std::sync::Arc;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use reelbox_core::constants::{DEFAULT_MAX_VIDEO_SIZE_BYTES, DEFAULT_VIDEO_EXTENSIONS};
use reelbox_core::validation::{
    sanitize_filename, validate_extension, validate_owner_id, validate_size, ValidationError,
};
use reelbox_core::{AppError, Config};
use thiserror::Error;
use tokio::io::AsyncReadExt;
use uuid::Uuid;

use crate::keys::video_object_key;
use crate::traits::{ByteReader, ObjectMetadata, Storage, StorageError, StoredObject};

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("File size {size} bytes exceeds maximum of {max} bytes")]
    TooLarge { size: u64, max: u64 },

    #[error("File type .{extension} not allowed. Allowed: {allowed}")]
    BadExtension { extension: String, allowed: String },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Invalid owner id: {0}")]
    InvalidOwnerId(String),

    #[error("Storage backend failure: {0}")]
    BackendFailure(#[from] StorageError),
}

impl From<ValidationError> for UploadError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::TooLarge { size, max } => UploadError::TooLarge { size, max },
            ValidationError::BadExtension { extension, allowed } => {
                UploadError::BadExtension { extension, allowed }
            }
            ValidationError::InvalidFilename(msg) => UploadError::InvalidFilename(msg),
            ValidationError::InvalidOwnerId(msg) => UploadError::InvalidOwnerId(msg),
            ValidationError::InvalidLimit(msg) => UploadError::InvalidFilename(msg),
        }
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::TooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            UploadError::BadExtension { .. }
            | UploadError::InvalidFilename(_)
            | UploadError::InvalidOwnerId(_) => AppError::InvalidInput(err.to_string()),
            UploadError::BackendFailure(StorageError::Timeout(_)) => {
                AppError::BackendUnavailable(err.to_string())
            }
            UploadError::BackendFailure(e) => AppError::Storage(e.to_string()),
        }
    }
}

/// Which files are accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    pub allowed_extensions: Vec<String>,
    pub max_size_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            allowed_extensions: DEFAULT_VIDEO_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_size_bytes: DEFAULT_MAX_VIDEO_SIZE_BYTES,
        }
    }
}

impl UploadPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            allowed_extensions: config.video_allowed_extensions().to_vec(),
            max_size_bytes: config.max_video_size_bytes(),
        }
    }
}

#[derive(Clone)]
pub struct BlobUploader {
    storage: Arc<dyn Storage>,
    policy: UploadPolicy,
    timeout: Duration,
}

impl BlobUploader {
    pub fn new(storage: Arc<dyn Storage>, policy: UploadPolicy, timeout: Duration) -> Self {
        Self {
            storage,
            policy,
            timeout,
        }
    }

    pub fn from_config(storage: Arc<dyn Storage>, config: &Config) -> Self {
        Self::new(
            storage,
            UploadPolicy::from_config(config),
            Duration::from_secs(config.storage_timeout_seconds()),
        )
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Sanitise the filename and check its extension. Returns the name used in the key.
    ///
    /// Runs before any byte of the body is read.
    pub fn check_filename(&self, filename: &str) -> Result<String, UploadError> {
        let sanitized = sanitize_filename(filename)?;
        validate_extension(&sanitized, &self.policy.allowed_extensions)?;
        Ok(sanitized)
    }

    pub fn check_size(&self, size: u64) -> Result<(), UploadError> {
        validate_size(size, self.policy.max_size_bytes)?;
        Ok(())
    }

    /// Validate, then stream `content` to `uploads/{owner_id}/{video_id}/{filename}`.
    ///
    /// Never reads more than one byte past the size limit; an object that turns
    /// out larger than declared is removed again and reported as `TooLarge`.
    #[tracing::instrument(
        skip(self, content),
        fields(storage.backend = %self.storage.backend_type())
    )]
    pub async fn upload(
        &self,
        owner_id: &str,
        video_id: Uuid,
        filename: &str,
        content_type: &str,
        content: ByteReader,
        declared_size: u64,
    ) -> Result<StoredObject, UploadError> {
        validate_owner_id(owner_id)?;
        let filename = self.check_filename(filename)?;
        self.check_size(declared_size)?;

        let key = video_object_key(owner_id, video_id, &filename);

        let mut metadata = ObjectMetadata::new();
        metadata.insert("original_filename".to_string(), filename.clone());
        metadata.insert(
            "upload_time".to_string(),
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        );
        metadata.insert("uploader_id".to_string(), owner_id.to_string());

        let limit = self.policy.max_size_bytes;
        let bounded: ByteReader = Box::pin(content.take(limit.saturating_add(1)));

        let stored = tokio::time::timeout(
            self.timeout,
            self.storage
                .put_stream(&key, content_type, Some(declared_size), &metadata, bounded),
        )
        .await
        .map_err(|_| StorageError::Timeout(self.timeout))??;

        if stored.size_bytes > limit {
            if let Err(e) = self.storage.delete(&key).await {
                tracing::error!(
                    storage_key = %key,
                    error = %e,
                    "Failed to remove oversized upload"
                );
            }
            return Err(UploadError::TooLarge {
                size: stored.size_bytes,
                max: limit,
            });
        }

        if stored.size_bytes != declared_size {
            tracing::warn!(
                storage_key = %key,
                declared_size,
                stored_size = stored.size_bytes,
                "Stored size differs from declared size"
            );
        }

        Ok(stored)
    }
}
