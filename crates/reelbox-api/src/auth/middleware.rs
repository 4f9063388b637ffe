use axum::{
    extract::Request,
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use reelbox_core::AppError;

use crate::error::HttpAppError;

/// Reject requests without a non-blank `Authorization` header with 401.
pub async fn require_authorization(request: Request, next: Next) -> Response {
    let present = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|h| !h.trim().is_empty());

    if !present {
        tracing::debug!(
            method = %request.method(),
            path = %request.uri().path(),
            "Rejected request without Authorization header"
        );
        return HttpAppError(AppError::Unauthorized(
            "Missing Authorization header".to_string(),
        ))
        .into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, middleware, routing::get, Router};
    use axum_test::TestServer;

    fn app() -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn(require_authorization))
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let server = TestServer::new(app()).unwrap();
        let response = server.get("/").await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Missing Authorization header");
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn blank_header_is_unauthorized() {
        let server = TestServer::new(app()).unwrap();
        let response = server.get("/").add_header("Authorization", "   ").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn any_credential_passes() {
        let server = TestServer::new(app()).unwrap();
        let response = server
            .get("/")
            .add_header("Authorization", "Bearer token")
            .await;
        response.assert_status_ok();
        assert_eq!(response.text(), "ok");
    }
}
