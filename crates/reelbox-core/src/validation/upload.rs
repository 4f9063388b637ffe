//! Upload gate checks.
//!
//! The extension check looks at the filename only. It is a UX and quota gate
//! that keeps obviously wrong files out; it does not inspect content and must
//! not be relied on as a security control.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::AppError;

pub const MAX_FILENAME_LENGTH: usize = 255;
pub const MAX_OWNER_ID_LENGTH: usize = 128;

static OWNER_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_.@-]{1,128}$").expect("owner id pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("File type .{extension} not allowed. Allowed: {allowed}")]
    BadExtension { extension: String, allowed: String },

    #[error("File size {size} bytes exceeds maximum of {max} bytes")]
    TooLarge { size: u64, max: u64 },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Invalid owner id: {0}")]
    InvalidOwnerId(String),

    #[error("Invalid limit: {0}")]
    InvalidLimit(String),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::TooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            ValidationError::InvalidLimit(_) => AppError::BadRequest(err.to_string()),
            _ => AppError::InvalidInput(err.to_string()),
        }
    }
}

/// Lowercased extension without the dot, or an empty string when there is none.
pub fn extension_of(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_lowercase(),
        _ => String::new(),
    }
}

pub fn validate_extension(filename: &str, allowed: &[String]) -> Result<String, ValidationError> {
    let extension = extension_of(filename);
    if extension.is_empty() || !allowed.iter().any(|a| a.eq_ignore_ascii_case(&extension)) {
        return Err(ValidationError::BadExtension {
            extension,
            allowed: allowed.join(", "),
        });
    }
    Ok(extension)
}

pub fn validate_size(size: u64, max: u64) -> Result<(), ValidationError> {
    if size > max {
        return Err(ValidationError::TooLarge { size, max });
    }
    Ok(())
}

/// Strip any path component and replace characters that are unsafe in an object key.
pub fn sanitize_filename(filename: &str) -> Result<String, ValidationError> {
    let filename_only = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .trim();

    if filename_only.is_empty() {
        return Err(ValidationError::InvalidFilename(
            "filename is empty".to_string(),
        ));
    }
    // A single segment is left after the split, so only `.` and `..` themselves can escape.
    if filename_only == "." || filename_only == ".." {
        return Err(ValidationError::InvalidFilename(
            "filename contains invalid path traversal".to_string(),
        ));
    }
    if filename_only.chars().count() > MAX_FILENAME_LENGTH {
        return Err(ValidationError::InvalidFilename(format!(
            "filename too long (max {} characters)",
            MAX_FILENAME_LENGTH
        )));
    }

    let sanitized: String = filename_only
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    Ok(sanitized)
}

/// Owner ids become a key segment, so they are held to a strict charset.
pub fn validate_owner_id(owner_id: &str) -> Result<(), ValidationError> {
    if !OWNER_ID_RE.is_match(owner_id) || owner_id.contains("..") {
        return Err(ValidationError::InvalidOwnerId(format!(
            "must match [A-Za-z0-9_.@-] and be at most {} characters",
            MAX_OWNER_ID_LENGTH
        )));
    }
    Ok(())
}

/// Resolve a caller-supplied read limit: default when absent, clamp to `max`,
/// reject anything below one.
pub fn resolve_audit_limit(
    requested: Option<i64>,
    default: i64,
    max: i64,
) -> Result<i64, ValidationError> {
    match requested {
        None => Ok(default.min(max)),
        Some(limit) if limit < 1 => Err(ValidationError::InvalidLimit(format!(
            "limit must be at least 1, got {}",
            limit
        ))),
        Some(limit) => Ok(limit.min(max)),
    }
}
