use crate::keys::validate_key;
use crate::traits::{ByteReader, ObjectMetadata, Storage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

const SIDECAR_SUFFIX: &str = ".metadata.json";
const PARTIAL_SUFFIX: &str = ".partial";

/// Content type and metadata kept next to each object, since a plain file has nowhere else to put them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalObjectInfo {
    pub content_type: String,
    pub size_bytes: u64,
    pub metadata: ObjectMetadata,
}

/// Removes an unfinished upload when dropped, unless `keep` was called.
///
/// A `put_stream` future cancelled by a timeout or an aborted request never
/// reaches its own cleanup code, so the files go on drop instead.
struct PartialUpload {
    paths: Vec<PathBuf>,
}

impl PartialUpload {
    fn new(partial: PathBuf) -> Self {
        Self {
            paths: vec![partial],
        }
    }

    fn track(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    fn keep(mut self) {
        self.paths.clear();
    }
}

impl Drop for PartialUpload {
    fn drop(&mut self) {
        for path in self.paths.drain(..) {
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), "Removed unfinished upload");
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to remove unfinished upload"
                    );
                }
            }
        }
    }
}

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/reelbox/videos")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:8080/videos")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Convert storage key to filesystem path, refusing anything that lands outside `base_path`.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        validate_key(storage_key)?;

        let path = self.base_path.join(storage_key);

        let base_canonical = self.base_path.canonicalize().map_err(|e| {
            StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
        })?;

        // Only existing paths can be canonicalized; new keys are covered by validate_key.
        if let Ok(canonical) = path.canonicalize() {
            if canonical.strip_prefix(&base_canonical).is_err() {
                return Err(StorageError::InvalidKey(
                    "Storage key resolves outside storage directory".to_string(),
                ));
            }
        }

        Ok(path)
    }

    fn sidecar_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_os_string();
        name.push(SIDECAR_SUFFIX);
        PathBuf::from(name)
    }

    fn partial_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_os_string();
        name.push(PARTIAL_SUFFIX);
        PathBuf::from(name)
    }

    /// Generate public URL for file
    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Read the sidecar written next to an object, if any.
    pub async fn read_object_info(&self, storage_key: &str) -> StorageResult<Option<LocalObjectInfo>> {
        let path = self.key_to_path(storage_key)?;
        let sidecar = Self::sidecar_path(&path);

        match fs::read(&sidecar).await {
            Ok(raw) => serde_json::from_slice(&raw).map(Some).map_err(|e| {
                StorageError::BackendError(format!(
                    "Corrupt metadata sidecar {}: {}",
                    sidecar.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_sidecar(&self, path: &Path, info: &LocalObjectInfo) -> StorageResult<()> {
        let raw = serde_json::to_vec_pretty(info).map_err(|e| {
            StorageError::UploadFailed(format!("Failed to encode object metadata: {}", e))
        })?;
        fs::write(Self::sidecar_path(path), raw).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to write metadata for {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Copy the reader into `partial`, returning bytes written.
    async fn spool(partial: &Path, mut reader: ByteReader) -> StorageResult<u64> {
        let mut file = fs::File::create(partial).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", partial.display(), e))
        })?;

        let written = tokio::io::copy(&mut reader, &mut file).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", partial.display(), e))
        })?;

        file.flush().await?;
        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", partial.display(), e))
        })?;

        Ok(written)
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
        metadata: &ObjectMetadata,
    ) -> StorageResult<StoredObject> {
        let size = data.len() as u64;
        let reader: ByteReader = Box::pin(std::io::Cursor::new(data));
        self.put_stream(key, content_type, Some(size), metadata, reader)
            .await
    }

    async fn put_stream(
        &self,
        key: &str,
        content_type: &str,
        _content_length: Option<u64>,
        metadata: &ObjectMetadata,
        reader: ByteReader,
    ) -> StorageResult<StoredObject> {
        let path = self.key_to_path(key)?;
        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();
        let partial = Self::partial_path(&path);
        let mut guard = PartialUpload::new(partial.clone());

        let written = Self::spool(&partial, reader).await?;

        let info = LocalObjectInfo {
            content_type: content_type.to_string(),
            size_bytes: written,
            metadata: metadata.clone(),
        };
        guard.track(Self::sidecar_path(&path));
        self.write_sidecar(&path, &info).await?;

        fs::rename(&partial, &path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to finalize file {}: {}", path.display(), e))
        })?;
        guard.keep();

        let url = self.generate_url(key);

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = written,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(StoredObject {
            key: key.to_string(),
            url,
            size_bytes: written,
        })
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(storage_key)?;

        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(storage_key.to_string()))
            }
            Err(e) => Err(StorageError::DownloadFailed(format!(
                "Failed to read file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;

        for target in [path.clone(), Self::sidecar_path(&path)] {
            match fs::remove_file(&target).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(StorageError::DeleteFailed(format!(
                        "Failed to delete file {}: {}",
                        target.display(),
                        e
                    )))
                }
            }
        }

        tracing::info!(key = %storage_key, "Local storage delete successful");
        Ok(())
    }

    fn url_for(&self, key: &str) -> String {
        self.generate_url(key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tempfile::tempdir;
    use tokio::io::{AsyncRead, ReadBuf};

    /// Yields a few bytes, then fails mid-stream.
    struct BrokenReader {
        sent: bool,
    }

    impl AsyncRead for BrokenReader {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            if self.sent {
                Poll::Ready(Err(io::Error::new(io::ErrorKind::ConnectionReset, "client went away")))
            } else {
                self.sent = true;
                buf.put_slice(b"partial");
                Poll::Ready(Ok(()))
            }
        }
    }

    /// Yields a few bytes, then never makes progress again.
    struct StalledReader {
        sent: bool,
    }

    impl AsyncRead for StalledReader {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            if self.sent {
                Poll::Pending
            } else {
                self.sent = true;
                buf.put_slice(b"first chunk");
                Poll::Ready(Ok(()))
            }
        }
    }

    fn metadata() -> ObjectMetadata {
        let mut metadata = ObjectMetadata::new();
        metadata.insert("original_filename".to_string(), "clip.mp4".to_string());
        metadata.insert("uploader_id".to_string(), "u1".to_string());
        metadata
    }

    #[tokio::test]
    async fn test_local_storage_put_download_delete() {
        let temp_dir = tempdir().unwrap();
        let storage = LocalStorage::new(temp_dir.path(), "http://localhost:8080/videos".to_string())
            .await
            .unwrap();

        let key = "uploads/u1/abc/clip.mp4";
        let stored = storage
            .put(key, Bytes::from_static(b"video bytes"), "video/mp4", &metadata())
            .await
            .unwrap();

        assert_eq!(stored.key, key);
        assert_eq!(stored.size_bytes, 11);
        assert_eq!(stored.url, "http://localhost:8080/videos/uploads/u1/abc/clip.mp4");
        assert!(storage.exists(key).await.unwrap());
        assert_eq!(storage.download(key).await.unwrap(), b"video bytes");

        let info = storage.read_object_info(key).await.unwrap().unwrap();
        assert_eq!(info.content_type, "video/mp4");
        assert_eq!(info.size_bytes, 11);
        assert_eq!(info.metadata.get("uploader_id").map(String::as_str), Some("u1"));

        storage.delete(key).await.unwrap();
        assert!(!storage.exists(key).await.unwrap());
        assert!(storage.read_object_info(key).await.unwrap().is_none());
        assert!(matches!(
            storage.download(key).await,
            Err(StorageError::NotFound(_))
        ));

        // Deleting twice is fine.
        storage.delete(key).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_stream_leaves_nothing_behind() {
        let temp_dir = tempdir().unwrap();
        let storage = LocalStorage::new(temp_dir.path(), "http://localhost".to_string())
            .await
            .unwrap();

        let key = "uploads/u1/abc/broken.mp4";
        let reader: ByteReader = Box::pin(BrokenReader { sent: false });
        let result = storage
            .put_stream(key, "video/mp4", None, &metadata(), reader)
            .await;

        assert!(matches!(result, Err(StorageError::UploadFailed(_))));
        assert!(!storage.exists(key).await.unwrap());

        let dir = temp_dir.path().join("uploads/u1/abc");
        let mut entries = fs::read_dir(&dir).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cancelled_stream_leaves_nothing_behind() {
        let temp_dir = tempdir().unwrap();
        let storage = LocalStorage::new(temp_dir.path(), "http://localhost".to_string())
            .await
            .unwrap();

        let key = "uploads/u1/abc/clip.mp4";
        let reader: ByteReader = Box::pin(StalledReader { sent: false });
        let result = tokio::time::timeout(
            std::time::Duration::from_millis(100),
            storage.put_stream(key, "video/mp4", None, &metadata(), reader),
        )
        .await;
        assert!(result.is_err());

        let dir = temp_dir.path().join("uploads/u1/abc");
        let mut entries = fs::read_dir(&dir).await.unwrap();
        let mut leftovers = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            leftovers.push(entry.file_name());
        }
        assert!(leftovers.is_empty(), "left behind: {:?}", leftovers);
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let temp_dir = tempdir().unwrap();
        let storage = LocalStorage::new(temp_dir.path(), "http://localhost".to_string())
            .await
            .unwrap();

        let result = storage
            .put("../../../etc/passwd", Bytes::from_static(b"x"), "text/plain", &ObjectMetadata::new())
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.download("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }
}
