mod audit;
mod metadata;

pub use audit::AuditLogRepository;
pub use metadata::VideoMetadataRepository;
