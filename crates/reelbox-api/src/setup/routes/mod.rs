//! Route configuration and setup.
//!
//! `/health` and `/live` are public; everything else sits behind the
//! authorization gate.

mod health;

use crate::auth::require_authorization;
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use reelbox_core::Config;
use reelbox_infra::request_id_middleware;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Room for multipart boundaries and the small text fields next to the file.
const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let body_limit = usize::try_from(
        config
            .max_video_size_bytes()
            .saturating_add(MULTIPART_OVERHEAD_BYTES),
    )
    .unwrap_or(usize::MAX);

    let http_concurrency_limit = config.http_concurrency_limit().max(1);
    tracing::info!(
        http_concurrency_limit,
        body_limit_bytes = body_limit,
        "HTTP limits configured"
    );

    let app = public_routes()
        .merge(protected_routes())
        .fallback(handlers::not_found)
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::PUT, Method::OPTIONS];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::liveness_check))
}

fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/upload",
            post(handlers::upload::upload_video).layer(DefaultBodyLimit::disable()),
        )
        .route(
            "/metadata/{video_id}",
            get(handlers::metadata::get_metadata).put(handlers::metadata::update_metadata),
        )
        .route(
            "/videos/{owner_id}",
            get(handlers::videos::list_owner_videos),
        )
        .route("/search", get(handlers::search::search_videos))
        .route("/audit-log", get(handlers::audit::get_audit_log))
        .route_layer(axum::middleware::from_fn(require_authorization))
}
