use crate::keys::validate_key;
use crate::traits::{ByteReader, ObjectMetadata, Storage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, AttributeValue, Attributes, ObjectStore, ObjectStoreExt, PutMultipartOptions,
    PutOptions, PutPayload, WriteMultipart,
};
use std::borrow::Cow;
use tokio::io::AsyncReadExt;

/// Streams up to this size go out as a single PUT.
const SINGLE_PUT_LIMIT: u64 = 64 * 1024 * 1024;
/// S3 caps a single PUT at 5GB, so anything larger goes through multipart in these chunks.
const MULTIPART_CHUNK_SIZE: usize = 16 * 1024 * 1024;
const MULTIPART_MAX_CONCURRENCY: usize = 4;
const READ_BUFFER_SIZE: usize = 1024 * 1024;

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        // Credentials come from the environment; bucket and region are explicit.
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
        })
    }

    /// Generate public URL for S3 object
    ///
    /// For AWS S3, uses the standard format: https://{bucket}.s3.{region}.amazonaws.com/{key}
    /// For S3-compatible providers, uses path-style: {endpoint}/{bucket}/{key}
    fn object_url(bucket: &str, region: &str, endpoint_url: Option<&str>, key: &str) -> String {
        match endpoint_url {
            Some(endpoint) => format!("{}/{}/{}", endpoint.trim_end_matches('/'), bucket, key),
            None => format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key),
        }
    }

    fn object_attributes(content_type: &str, metadata: &ObjectMetadata) -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert(
            Attribute::ContentType,
            AttributeValue::from(content_type.to_string()),
        );
        for (name, value) in metadata {
            attributes.insert(
                Attribute::Metadata(Cow::Owned(name.clone())),
                AttributeValue::from(value.clone()),
            );
        }
        attributes
    }

    async fn put_single(
        &self,
        location: &Path,
        data: Bytes,
        attributes: Attributes,
    ) -> StorageResult<u64> {
        let size = data.len() as u64;
        let opts = PutOptions {
            attributes,
            ..Default::default()
        };

        self.store
            .put_opts(location, PutPayload::from(data), opts)
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        Ok(size)
    }

    async fn put_multipart(
        &self,
        location: &Path,
        head: Vec<u8>,
        reader: &mut ByteReader,
        attributes: Attributes,
    ) -> StorageResult<u64> {
        let opts = PutMultipartOptions {
            attributes,
            ..Default::default()
        };
        let upload = self
            .store
            .put_multipart_opts(location, opts)
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        let mut writer = WriteMultipart::new_with_chunk_size(upload, MULTIPART_CHUNK_SIZE);
        writer.write(&head);

        match Self::pump(reader, &mut writer).await {
            Ok(rest) => {
                writer
                    .finish()
                    .await
                    .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
                Ok(head.len() as u64 + rest)
            }
            Err(e) => {
                if let Err(abort_err) = writer.abort().await {
                    tracing::warn!(
                        bucket = %self.bucket,
                        location = %location,
                        error = %abort_err,
                        "Failed to abort multipart upload"
                    );
                }
                Err(e)
            }
        }
    }

    async fn pump(reader: &mut ByteReader, writer: &mut WriteMultipart) -> StorageResult<u64> {
        let mut buf = vec![0u8; READ_BUFFER_SIZE];
        let mut total = 0u64;
        loop {
            let n = reader
                .read(&mut buf)
                .await
                .map_err(|e| StorageError::UploadFailed(format!("Failed to read upload: {}", e)))?;
            if n == 0 {
                return Ok(total);
            }
            writer
                .wait_for_capacity(MULTIPART_MAX_CONCURRENCY)
                .await
                .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
            writer.write(&buf[..n]);
            total += n as u64;
        }
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
        metadata: &ObjectMetadata,
    ) -> StorageResult<StoredObject> {
        validate_key(key)?;
        let location = Path::from(key.to_string());
        let start = std::time::Instant::now();

        let size = self
            .put_single(&location, data, Self::object_attributes(content_type, metadata))
            .await
            .inspect_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(StoredObject {
            key: key.to_string(),
            url: self.url_for(key),
            size_bytes: size,
        })
    }

    async fn put_stream(
        &self,
        key: &str,
        content_type: &str,
        content_length: Option<u64>,
        metadata: &ObjectMetadata,
        mut reader: ByteReader,
    ) -> StorageResult<StoredObject> {
        validate_key(key)?;
        let location = Path::from(key.to_string());
        let attributes = Self::object_attributes(content_type, metadata);
        let start = std::time::Instant::now();

        // Small objects are buffered and sent in one request; the rest go multipart.
        let mut head = Vec::new();
        (&mut reader)
            .take(SINGLE_PUT_LIMIT)
            .read_to_end(&mut head)
            .await
            .map_err(|e| StorageError::UploadFailed(format!("Failed to read upload: {}", e)))?;

        let result = if (head.len() as u64) < SINGLE_PUT_LIMIT {
            self.put_single(&location, Bytes::from(head), attributes).await
        } else {
            self.put_multipart(&location, head, &mut reader, attributes)
                .await
        };

        let size = result.inspect_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                expected_bytes = ?content_length,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 streaming upload failed"
            );
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 streaming upload successful"
        );

        Ok(StoredObject {
            key: key.to_string(),
            url: self.url_for(key),
            size_bytes: size,
        })
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        let location = Path::from(storage_key.to_string());

        let result = self.store.get(&location).await.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(storage_key.to_string()),
            other => StorageError::DownloadFailed(other.to_string()),
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        Ok(bytes.to_vec())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let location = Path::from(storage_key.to_string());

        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let location = Path::from(storage_key.to_string());

        match self.store.delete(&location).await {
            Ok(()) | Err(ObjectStoreError::NotFound { .. }) => {}
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %storage_key,
                    "S3 delete failed"
                );
                return Err(StorageError::DeleteFailed(e.to_string()));
            }
        }

        tracing::info!(bucket = %self.bucket, key = %storage_key, "S3 delete successful");
        Ok(())
    }

    fn url_for(&self, key: &str) -> String {
        Self::object_url(&self.bucket, &self.region, self.endpoint_url.as_deref(), key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_url_aws_and_custom_endpoint() {
        assert_eq!(
            S3Storage::object_url("videos", "us-east-1", None, "uploads/u1/x/clip.mp4"),
            "https://videos.s3.us-east-1.amazonaws.com/uploads/u1/x/clip.mp4"
        );
        assert_eq!(
            S3Storage::object_url(
                "videos",
                "us-east-1",
                Some("http://localhost:9000/"),
                "uploads/u1/x/clip.mp4"
            ),
            "http://localhost:9000/videos/uploads/u1/x/clip.mp4"
        );
    }

    #[test]
    fn test_attributes_carry_content_type_and_metadata() {
        let mut metadata = ObjectMetadata::new();
        metadata.insert("original_filename".to_string(), "clip.mp4".to_string());
        metadata.insert("uploader_id".to_string(), "u1".to_string());

        let attributes = S3Storage::object_attributes("video/mp4", &metadata);
        assert_eq!(attributes.len(), 3);
        assert!(attributes.get(&Attribute::ContentType).is_some());
        assert!(attributes
            .get(&Attribute::Metadata(Cow::Borrowed("uploader_id")))
            .is_some());
    }
}
