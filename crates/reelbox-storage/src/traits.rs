//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use std::collections::BTreeMap;
use std::pin::Pin;
use std::time::Duration;

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Storage operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Descriptive key/value pairs stored alongside an object.
pub type ObjectMetadata = BTreeMap<String, String>;

/// Boxed reader handed to streaming uploads.
pub type ByteReader = Pin<Box<dyn AsyncRead + Send + Unpin>>;

/// Where an object ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
    pub size_bytes: u64,
}

/// Storage abstraction trait
///
/// Backends receive fully derived keys (see `keys`) and never choose a key themselves.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write `data` under `key` with a content type and descriptive metadata.
    async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
        metadata: &ObjectMetadata,
    ) -> StorageResult<StoredObject>;

    /// Write the reader's content under `key` without buffering it whole.
    ///
    /// A failed stream must not leave a readable object behind.
    async fn put_stream(
        &self,
        key: &str,
        content_type: &str,
        content_length: Option<u64>,
        metadata: &ObjectMetadata,
        reader: ByteReader,
    ) -> StorageResult<StoredObject>;

    /// Download a file by its storage key
    async fn download(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Check if a file exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Delete a file by its storage key. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Public URL for a key.
    fn url_for(&self, key: &str) -> String;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
