//! Reelbox Storage Library
//!
//! Object storage abstraction, the local filesystem and S3 backends, and the
//! `BlobUploader` that gates and streams video uploads.
//!
//! # Storage key format
//!
//! Every uploaded video lives at `uploads/{owner_id}/{video_id}/{filename}`.
//! Keys must not contain `..` or a leading `/`. Key generation is centralized in
//! the `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;
pub mod uploader;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use reelbox_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ByteReader, ObjectMetadata, Storage, StorageError, StorageResult, StoredObject};
pub use uploader::{BlobUploader, UploadError, UploadPolicy};
