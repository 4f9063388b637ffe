//! Validation modules

pub mod upload;

pub use upload::{
    extension_of, resolve_audit_limit, sanitize_filename, validate_extension,
    validate_owner_id, validate_size, ValidationError, MAX_FILENAME_LENGTH, MAX_OWNER_ID_LENGTH,
};
