//! Application setup and initialization
//!
//! Wiring lives here so `main` stays a few lines and tests can build the
//! same router around in-memory fakes.

pub mod database;
pub mod events;
pub mod routes;
pub mod server;
pub mod storage;

use crate::state::{AppState, AuditLimits};
use anyhow::{Context, Result};
use reelbox_core::Config;
use reelbox_db::VideoMetadataRepository;
use reelbox_infra::{init_telemetry, TelemetryConfig};
use reelbox_storage::BlobUploader;
use std::sync::Arc;
use std::time::Duration;

pub const SERVICE_NAME: &str = "reelbox-api";

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    let telemetry = TelemetryConfig::from_env(SERVICE_NAME, config.environment());
    init_telemetry(&telemetry)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        storage_backend = %config.storage_backend(),
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;
    let storage = storage::setup_storage(&config).await?;
    let publisher = events::setup_publisher(&config, pool.clone()).await?;

    let state = Arc::new(AppState::new(
        Arc::new(VideoMetadataRepository::new(pool.clone())),
        BlobUploader::from_config(storage, &config),
        publisher,
        pool,
        Duration::from_secs(config.publish_timeout_seconds()),
        AuditLimits::from_config(&config),
    ));

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
