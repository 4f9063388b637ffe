use std::env;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_DIRECTIVES: &str = "reelbox=info,tower_http=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_lowercase()) {
            Some(s) if s == "json" => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub environment: String,
    /// Filter directives; `RUST_LOG` wins over `LOG_LEVEL`.
    pub directives: String,
    pub format: LogFormat,
}

impl TelemetryConfig {
    pub fn from_env(service_name: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            environment: environment.into(),
            directives: resolve_directives(
                env::var("RUST_LOG").ok().as_deref(),
                env::var("LOG_LEVEL").ok().as_deref(),
            ),
            format: LogFormat::parse(env::var("LOG_FORMAT").ok().as_deref()),
        }
    }
}

/// A bare level such as `debug` from `LOG_LEVEL` is scoped to our crates and tower_http.
fn resolve_directives(rust_log: Option<&str>, log_level: Option<&str>) -> String {
    if let Some(directives) = rust_log.map(str::trim).filter(|s| !s.is_empty()) {
        return directives.to_string();
    }
    match log_level.map(|s| s.trim().to_lowercase()) {
        Some(level) if !level.is_empty() => format!("reelbox={0},tower_http={0}", level),
        _ => DEFAULT_DIRECTIVES.to_string(),
    }
}

/// Initialize tracing. Fails if a global subscriber is already installed.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_new(&config.directives)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init()?,
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).try_init()?,
    }

    tracing::info!(
        service = %config.service_name,
        environment = %config.environment,
        format = ?config.format,
        "Tracing initialized"
    );
    Ok(())
}

/// The fmt layer writes synchronously, so there is nothing buffered to flush.
pub async fn shutdown_telemetry() {
    tracing::debug!("Telemetry shutdown");
}
