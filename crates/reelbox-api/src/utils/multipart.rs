//! Multipart parsing for `POST /upload`.
//!
//! The file part is checked by name before its body is read, then spooled to
//! an anonymous temp file while the bytes are counted. The count, not any
//! client-declared length, is what the size limit applies to.

use std::io::SeekFrom;

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use reelbox_core::constants::{ANONYMOUS_OWNER_ID, DEFAULT_VISIBILITY};
use reelbox_core::AppError;
use reelbox_storage::BlobUploader;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A file part written to a temp file, rewound to the start.
#[derive(Debug)]
pub struct SpooledFile {
    pub file: tokio::fs::File,
    pub filename: String,
    pub content_type: String,
    pub size: u64,
}

#[derive(Debug)]
pub struct UploadForm {
    pub file: SpooledFile,
    pub owner_id: String,
    pub visibility: String,
    pub download_allowed: bool,
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("Request body too large: {}", err.body_text()))
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", err.body_text()))
    }
}

/// Blank form values count as absent.
fn text_or(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Read the upload form. Exactly one `file` part is accepted.
pub async fn read_upload_form(
    mut multipart: Multipart,
    uploader: &BlobUploader,
) -> Result<UploadForm, AppError> {
    let mut file: Option<SpooledFile> = None;
    let mut user_id: Option<String> = None;
    let mut visibility: Option<String> = None;
    let mut allow_download: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                if file.is_some() {
                    return Err(AppError::InvalidInput(
                        "Multiple file fields are not allowed; send exactly one field named 'file'"
                            .to_string(),
                    ));
                }
                file = Some(spool_file(field, uploader).await?);
            }
            "user_id" => user_id = Some(field.text().await.map_err(multipart_error)?),
            "visibility" => visibility = Some(field.text().await.map_err(multipart_error)?),
            "allow_download" => {
                allow_download = Some(field.text().await.map_err(multipart_error)?)
            }
            other => {
                tracing::debug!(field = %other, "Ignoring unknown multipart field");
            }
        }
    }

    let file = file.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))?;

    Ok(UploadForm {
        file,
        owner_id: text_or(user_id, ANONYMOUS_OWNER_ID),
        visibility: text_or(visibility, DEFAULT_VISIBILITY),
        download_allowed: allow_download
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false),
    })
}

/// Anonymous temp file, created on the blocking pool.
async fn spool_target() -> Result<tokio::fs::File, AppError> {
    let file = tokio::task::spawn_blocking(tempfile::tempfile)
        .await
        .map_err(|e| AppError::Internal(format!("Temp file task failed: {}", e)))??;
    Ok(tokio::fs::File::from_std(file))
}

async fn spool_file(mut field: Field<'_>, uploader: &BlobUploader) -> Result<SpooledFile, AppError> {
    let filename = field.file_name().unwrap_or_default().to_string();
    if filename.trim().is_empty() {
        return Err(AppError::InvalidInput("Empty filename".to_string()));
    }
    // Rejects a disallowed extension before a single body byte is read.
    uploader.check_filename(&filename)?;

    let content_type = field
        .content_type()
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

    let mut file = spool_target().await?;
    let mut size: u64 = 0;

    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        size += chunk.len() as u64;
        uploader.check_size(size)?;
        file.write_all(&chunk).await?;
    }

    file.flush().await?;
    file.seek(SeekFrom::Start(0)).await?;

    tracing::debug!(filename = %filename, file_size = size, "Upload spooled");

    Ok(SpooledFile {
        file,
        filename,
        content_type,
        size,
    })
}
