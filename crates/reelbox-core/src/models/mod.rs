//! Data models for the application
//!
//! Rows of the metadata and audit tables, and the event handed to the
//! transcoding pipeline.

mod audit;
mod event;
mod video;

// Re-export all models for convenient imports
pub use audit::*;
pub use event::*;
pub use video::*;
