//! Reelbox Core Library
//!
//! This crate provides the domain models, error types, configuration, and upload
//! validation rules shared by every Reelbox component.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::{BaseConfig, Config, EventBackend, UploadServiceConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
