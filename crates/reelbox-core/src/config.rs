//! Configuration module
//!
//! This module provides configuration structures for the upload service,
//! including database pool, storage, event channel, and upload limits.

use std::env;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_AUDIT_LOG_LIMIT, DEFAULT_EVENT_TOPIC, DEFAULT_VIDEO_EXTENSIONS, MAX_AUDIT_LOG_LIMIT,
};
use crate::storage_types::StorageBackend;

// Common constants
const SERVER_PORT: u16 = 8080;
const MIN_CONNECTIONS: u32 = 1;
const MAX_CONNECTIONS: u32 = 20;
const ACQUIRE_TIMEOUT_SECS: u64 = 30;
const STORAGE_TIMEOUT_SECS: u64 = 1800;
const PUBLISH_TIMEOUT_SECS: u64 = 10;
const HTTP_CONCURRENCY_LIMIT: usize = 1_000;
const MAX_VIDEO_SIZE_MB: u64 = 5120;

/// Downstream channel that carries video processing events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventBackend {
    /// `video_events` outbox row plus `pg_notify`, in one transaction.
    Postgres,
    Sqs,
}

impl FromStr for EventBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(EventBackend::Postgres),
            "sqs" => Ok(EventBackend::Sqs),
            _ => Err(anyhow::anyhow!("Invalid event backend: {}", s)),
        }
    }
}

/// Base configuration shared by every entry point
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_min_connections: u32,
    pub db_max_connections: u32,
    pub db_acquire_timeout_seconds: u64,
    /// In-flight request cap for the HTTP server.
    pub http_concurrency_limit: usize,
    pub environment: String,
}

/// Upload service configuration
#[derive(Clone, Debug)]
pub struct UploadServiceConfig {
    pub base: BaseConfig,
    pub database_url: String,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, GCS interop, etc.)
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub storage_timeout_seconds: u64,
    // Upload policy
    pub max_video_size_bytes: u64,
    pub video_allowed_extensions: Vec<String>,
    // Event channel
    pub event_backend: EventBackend,
    pub event_topic: String,
    pub sqs_queue_url: Option<String>,
    pub publish_timeout_seconds: u64,
    // Audit log reads
    pub audit_log_default_limit: i64,
    pub audit_log_max_limit: i64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<UploadServiceConfig>);

impl Config {
    fn as_upload(&self) -> &UploadServiceConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.as_upload().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = UploadServiceConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_upload().validate()
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.as_upload().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_upload().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_upload().base.environment
    }

    pub fn database_url(&self) -> &str {
        &self.as_upload().database_url
    }

    pub fn db_min_connections(&self) -> u32 {
        self.as_upload().base.db_min_connections
    }

    pub fn db_max_connections(&self) -> u32 {
        self.as_upload().base.db_max_connections
    }

    pub fn db_acquire_timeout_seconds(&self) -> u64 {
        self.as_upload().base.db_acquire_timeout_seconds
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.as_upload().base.http_concurrency_limit
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.as_upload().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.as_upload().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.as_upload().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.as_upload().s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.as_upload().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.as_upload().local_storage_base_url.as_deref()
    }

    pub fn storage_timeout_seconds(&self) -> u64 {
        self.as_upload().storage_timeout_seconds
    }

    pub fn max_video_size_bytes(&self) -> u64 {
        self.as_upload().max_video_size_bytes
    }

    pub fn video_allowed_extensions(&self) -> &[String] {
        &self.as_upload().video_allowed_extensions
    }

    pub fn event_backend(&self) -> EventBackend {
        self.as_upload().event_backend
    }

    pub fn event_topic(&self) -> &str {
        &self.as_upload().event_topic
    }

    pub fn sqs_queue_url(&self) -> Option<&str> {
        self.as_upload().sqs_queue_url.as_deref()
    }

    pub fn publish_timeout_seconds(&self) -> u64 {
        self.as_upload().publish_timeout_seconds
    }

    pub fn audit_log_default_limit(&self) -> i64 {
        self.as_upload().audit_log_default_limit
    }

    pub fn audit_log_max_limit(&self) -> i64 {
        self.as_upload().audit_log_max_limit
    }
}

fn is_production_env(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_start_matches('.').to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl UploadServiceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_env(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            db_min_connections: env_or("DB_MIN_CONNECTIONS", MIN_CONNECTIONS),
            db_max_connections: env_or("DB_MAX_CONNECTIONS", MAX_CONNECTIONS),
            db_acquire_timeout_seconds: env_or("DB_ACQUIRE_TIMEOUT_SECONDS", ACQUIRE_TIMEOUT_SECS),
            http_concurrency_limit: env_or("HTTP_CONCURRENCY_LIMIT", HTTP_CONCURRENCY_LIMIT),
            environment,
        };

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(raw) => raw.parse::<StorageBackend>()?,
            Err(_) => StorageBackend::S3,
        };

        let event_backend = match env::var("EVENT_BACKEND") {
            Ok(raw) => raw.parse::<EventBackend>()?,
            Err(_) => EventBackend::Postgres,
        };

        let video_allowed_extensions = env::var("VIDEO_ALLOWED_EXTENSIONS")
            .map(|raw| parse_list(&raw))
            .unwrap_or_else(|_| {
                DEFAULT_VIDEO_EXTENSIONS
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            });

        let config = UploadServiceConfig {
            base,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            storage_backend,
            s3_bucket: env::var("BUCKET_NAME").or_else(|_| env::var("S3_BUCKET")).ok(),
            s3_region: env::var("S3_REGION").or_else(|_| env::var("AWS_REGION")).ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            storage_timeout_seconds: env_or("STORAGE_TIMEOUT_SECONDS", STORAGE_TIMEOUT_SECS),
            max_video_size_bytes: env_or("MAX_VIDEO_SIZE_MB", MAX_VIDEO_SIZE_MB)
                .saturating_mul(1024 * 1024),
            video_allowed_extensions,
            event_backend,
            event_topic: env::var("EVENT_TOPIC").unwrap_or_else(|_| DEFAULT_EVENT_TOPIC.to_string()),
            sqs_queue_url: env::var("SQS_QUEUE_URL").ok(),
            publish_timeout_seconds: env_or("PUBLISH_TIMEOUT_SECONDS", PUBLISH_TIMEOUT_SECS),
            audit_log_default_limit: env_or("AUDIT_LOG_DEFAULT_LIMIT", DEFAULT_AUDIT_LOG_LIMIT),
            audit_log_max_limit: env_or("AUDIT_LOG_MAX_LIMIT", MAX_AUDIT_LOG_LIMIT),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.base.db_max_connections == 0 {
            return Err(anyhow::anyhow!("DB_MAX_CONNECTIONS must be at least 1"));
        }
        if self.base.db_min_connections > self.base.db_max_connections {
            return Err(anyhow::anyhow!(
                "DB_MIN_CONNECTIONS ({}) cannot exceed DB_MAX_CONNECTIONS ({})",
                self.base.db_min_connections,
                self.base.db_max_connections
            ));
        }

        if self.base.http_concurrency_limit == 0 {
            return Err(anyhow::anyhow!("HTTP_CONCURRENCY_LIMIT must be at least 1"));
        }

        if self.max_video_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_VIDEO_SIZE_MB must be greater than 0"));
        }
        if self.video_allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!(
                "VIDEO_ALLOWED_EXTENSIONS must name at least one extension"
            ));
        }

        if self.audit_log_max_limit < 1 {
            return Err(anyhow::anyhow!("AUDIT_LOG_MAX_LIMIT must be at least 1"));
        }
        if self.audit_log_default_limit < 1
            || self.audit_log_default_limit > self.audit_log_max_limit
        {
            return Err(anyhow::anyhow!(
                "AUDIT_LOG_DEFAULT_LIMIT must be between 1 and AUDIT_LOG_MAX_LIMIT"
            ));
        }

        // Validate storage backend configuration
        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "BUCKET_NAME or S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        if self.event_backend == EventBackend::Sqs && self.sqs_queue_url.is_none() {
            return Err(anyhow::anyhow!(
                "SQS_QUEUE_URL must be set when EVENT_BACKEND=sqs"
            ));
        }
        if self.event_topic.trim().is_empty() {
            return Err(anyhow::anyhow!("EVENT_TOPIC cannot be empty"));
        }

        Ok(())
    }
}
