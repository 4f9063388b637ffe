//! Reelbox database layer
//!
//! Bounded connection pool, the dynamic SET/WHERE composer and the
//! Postgres-backed metadata store.

pub mod db;
pub mod error;
pub mod pool;

pub use db::composer::{
    compose_set, ComposedClause, FilterBuilder, FilterColumn, SqlValue, UpdateField,
    VideoMetadataUpdate, ALLOWED_UPDATE_FIELDS,
};
pub use db::store::{AuditLogQuery, MetadataStore, SearchQuery};
pub use db::transaction::TransactionGuard;
pub use db::video::{AuditLogRepository, VideoMetadataRepository};
pub use error::StoreError;
pub use pool::{PoolError, PoolManager, PoolSettings};
