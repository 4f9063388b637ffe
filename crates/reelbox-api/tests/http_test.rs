//! HTTP surface tests against the real router wired with fakes.
//!
//! Run with: `cargo test -p reelbox-api --test http_test`

mod helpers;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum_test::multipart::{MultipartForm, Part};
use chrono::{Duration as ChronoDuration, Utc};
use helpers::{
    setup_test_app, setup_test_app_with_limit, FailingPublisher, RecordingPublisher, TestApp,
    TEST_TOKEN,
};
use reelbox_core::models::{AuditLogEntry, VideoMetadata};
use reelbox_storage::Storage;
use serde_json::{json, Value};
use uuid::Uuid;

fn video_form(filename: &str, data: Vec<u8>) -> MultipartForm {
    MultipartForm::new()
        .add_text("user_id", "u1")
        .add_text("visibility", "public")
        .add_text("allow_download", "TRUE")
        .add_part("file", Part::bytes(data).file_name(filename).mime_type("video/mp4"))
}

async fn upload(app: &TestApp, form: MultipartForm) -> axum_test::TestResponse {
    app.client()
        .post("/upload")
        .add_header("Authorization", TEST_TOKEN)
        .multipart(form)
        .await
}

fn seeded_row(owner: &str, visibility: &str, filename: &str, age_minutes: i64) -> VideoMetadata {
    let at = Utc::now() - ChronoDuration::minutes(age_minutes);
    let video_id = Uuid::new_v4();
    VideoMetadata {
        video_id,
        original_filename: filename.to_string(),
        gcs_original_path: format!("uploads/{}/{}/{}", owner, video_id, filename),
        file_size_bytes: 1,
        owner_user_id: owner.to_string(),
        status: "uploaded".to_string(),
        transcoding_status: None,
        visibility: visibility.to_string(),
        download_allowed: false,
        upload_timestamp: at,
        updated_at: at,
    }
}

#[tokio::test]
async fn upload_returns_202_and_records_the_video() {
    let publisher = Arc::new(RecordingPublisher::default());
    let app = setup_test_app(publisher.clone()).await;

    let data = vec![42u8; 10 * 1024];
    let response = upload(&app, video_form("clip.mp4", data.clone())).await;

    assert_eq!(response.status_code(), 202);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(
        body["message"],
        "Video uploaded successfully. Processing started."
    );
    assert_eq!(body["policy_applied"], true);
    assert_eq!(body["event_published"], true);

    let video_id: Uuid = body["video_id"].as_str().unwrap().parse().unwrap();
    let gcs_path = body["gcs_path"].as_str().unwrap();
    assert_eq!(gcs_path, format!("uploads/u1/{}/clip.mp4", video_id));
    assert_eq!(app.storage.download(gcs_path).await.unwrap(), data);

    let response = app
        .client()
        .get(&format!("/metadata/{}", video_id))
        .add_header("Authorization", TEST_TOKEN)
        .await;
    assert_eq!(response.status_code(), 200);
    let row: Value = response.json();
    assert_eq!(row["status"], "uploaded");
    assert_eq!(row["visibility"], "public");
    assert_eq!(row["download_allowed"], true);
    assert_eq!(row["file_size_bytes"], data.len());

    assert_eq!(publisher.events().len(), 1);
}

#[tokio::test]
async fn upload_defaults_to_anonymous_private() {
    let app = setup_test_app(Arc::new(RecordingPublisher::default())).await;

    let form = MultipartForm::new()
        .add_part("file", Part::bytes(vec![1u8; 8]).file_name("clip.mov"));
    let response = upload(&app, form).await;

    assert_eq!(response.status_code(), 202);
    let body: Value = response.json();
    let video_id: Uuid = body["video_id"].as_str().unwrap().parse().unwrap();
    let row = app.store.row(video_id).unwrap();
    assert_eq!(row.owner_user_id, "anonymous");
    assert_eq!(row.visibility, "private");
    assert!(!row.download_allowed);
}

#[tokio::test]
async fn upload_with_failed_publish_is_still_accepted() {
    let app = setup_test_app(Arc::new(FailingPublisher)).await;

    let response = upload(&app, video_form("clip.mp4", vec![1u8; 32])).await;

    assert_eq!(response.status_code(), 202);
    let body: Value = response.json();
    assert_eq!(body["event_published"], false);
    assert_eq!(app.store.len(), 1);
}

#[tokio::test]
async fn upload_rejects_disallowed_extension_without_side_effects() {
    let app = setup_test_app(Arc::new(RecordingPublisher::default())).await;

    let response = upload(&app, video_form("clip.exe", vec![1u8; 32])).await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("not allowed"));
    assert_eq!(app.store.len(), 0);
    assert_eq!(app.stored_files(), 0);
}

#[tokio::test]
async fn upload_rejects_oversize_file() {
    let app = setup_test_app_with_limit(Arc::new(RecordingPublisher::default()), 1024).await;

    let response = upload(&app, video_form("clip.mp4", vec![0u8; 4096])).await;

    assert_eq!(response.status_code(), 413);
    assert_eq!(app.store.len(), 0);
    assert_eq!(app.stored_files(), 0);
}

#[tokio::test]
async fn upload_without_file_is_rejected() {
    let app = setup_test_app(Arc::new(RecordingPublisher::default())).await;

    let form = MultipartForm::new().add_text("user_id", "u1");
    let response = upload(&app, form).await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "No file provided");
}

#[tokio::test]
async fn upload_with_empty_filename_is_rejected() {
    let app = setup_test_app(Arc::new(RecordingPublisher::default())).await;

    let form = MultipartForm::new().add_part("file", Part::bytes(vec![1u8; 8]).file_name(""));
    let response = upload(&app, form).await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(app.store.len(), 0);
}

#[tokio::test]
async fn protected_routes_require_authorization() {
    let app = setup_test_app(Arc::new(RecordingPublisher::default())).await;

    let response = app
        .client()
        .post("/upload")
        .multipart(video_form("clip.mp4", vec![1u8; 8]))
        .await;
    assert_eq!(response.status_code(), 401);
    let body: Value = response.json();
    assert_eq!(body["error"], "Missing Authorization header");

    let response = app.client().get("/search").add_query_param("q", "clip").await;
    assert_eq!(response.status_code(), 401);
    assert_eq!(app.store.len(), 0);
}

#[tokio::test]
async fn metadata_update_applies_allowed_fields() {
    let app = setup_test_app(Arc::new(RecordingPublisher::default())).await;
    let row = seeded_row("u1", "private", "clip.mp4", 5);
    let video_id = row.video_id;
    app.store.seed(row);

    let response = app
        .client()
        .put(&format!("/metadata/{}", video_id))
        .add_header("Authorization", TEST_TOKEN)
        .json(&json!({
            "visibility": "public",
            "transcoding_status": "queued",
            "owner_user_id": "attacker",
        }))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["video_id"], video_id.to_string());

    let row = app.store.row(video_id).unwrap();
    assert_eq!(row.visibility, "public");
    assert_eq!(row.transcoding_status.as_deref(), Some("queued"));
    assert_eq!(row.owner_user_id, "u1");
}

#[tokio::test]
async fn metadata_update_with_only_unknown_fields_is_noop() {
    let app = setup_test_app(Arc::new(RecordingPublisher::default())).await;
    let row = seeded_row("u1", "private", "clip.mp4", 5);
    let video_id = row.video_id;
    let updated_at = row.updated_at;
    app.store.seed(row);

    let response = app
        .client()
        .put(&format!("/metadata/{}", video_id))
        .add_header("Authorization", TEST_TOKEN)
        .json(&json!({ "owner_user_id": "someone", "file_size_bytes": 1 }))
        .await;

    assert_eq!(response.status_code(), 422);
    let body: Value = response.json();
    assert_eq!(body["error"], "No valid fields to update");
    assert_eq!(body["code"], "NO_FIELDS_TO_UPDATE");
    assert_eq!(app.store.row(video_id).unwrap().updated_at, updated_at);
}

#[tokio::test]
async fn metadata_errors_map_to_client_statuses() {
    let app = setup_test_app(Arc::new(RecordingPublisher::default())).await;

    let missing = Uuid::new_v4();
    let response = app
        .client()
        .get(&format!("/metadata/{}", missing))
        .add_header("Authorization", TEST_TOKEN)
        .await;
    assert_eq!(response.status_code(), 404);
    let body: Value = response.json();
    assert_eq!(body["error"], "Video not found");

    let response = app
        .client()
        .put(&format!("/metadata/{}", missing))
        .add_header("Authorization", TEST_TOKEN)
        .json(&json!({ "status": "processing" }))
        .await;
    assert_eq!(response.status_code(), 404);

    let response = app
        .client()
        .get("/metadata/not-a-uuid")
        .add_header("Authorization", TEST_TOKEN)
        .await;
    assert_eq!(response.status_code(), 400);

    let response = app
        .client()
        .put(&format!("/metadata/{}", missing))
        .add_header("Authorization", TEST_TOKEN)
        .json(&json!(["visibility", "public"]))
        .await;
    assert_eq!(response.status_code(), 400);

    let response = app
        .client()
        .put(&format!("/metadata/{}", missing))
        .add_header("Authorization", TEST_TOKEN)
        .json(&json!({ "download_allowed": "yes" }))
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn owner_listing_returns_matching_visibility_newest_first() {
    let app = setup_test_app(Arc::new(RecordingPublisher::default())).await;
    let older = seeded_row("u1", "public", "older.mp4", 10);
    let newer = seeded_row("u1", "public", "newer.mp4", 1);
    let hidden = seeded_row("u1", "private", "hidden.mp4", 5);
    let (older_id, newer_id) = (older.video_id, newer.video_id);
    app.store.seed(older);
    app.store.seed(newer);
    app.store.seed(hidden);

    let response = app
        .client()
        .get("/videos/u1")
        .add_query_param("visibility", "public")
        .add_header("Authorization", TEST_TOKEN)
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["count"], 2);
    assert_eq!(body["videos"][0]["video_id"], newer_id.to_string());
    assert_eq!(body["videos"][1]["video_id"], older_id.to_string());

    let response = app
        .client()
        .get("/videos/u1")
        .add_query_param("visibility", "private")
        .add_header("Authorization", TEST_TOKEN)
        .await;
    let body: Value = response.json();
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn search_requires_query_or_owner() {
    let app = setup_test_app(Arc::new(RecordingPublisher::default())).await;

    let response = app
        .client()
        .get("/search")
        .add_query_param("status", "uploaded")
        .add_header("Authorization", TEST_TOKEN)
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "Provide search query or owner_id");
    assert_eq!(app.store.search_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn search_returns_public_matches() {
    let app = setup_test_app(Arc::new(RecordingPublisher::default())).await;
    app.store.seed(seeded_row("u1", "public", "Holiday-Clip.mp4", 2));
    app.store.seed(seeded_row("u2", "private", "holiday-secret.mp4", 1));
    app.store.seed(seeded_row("u3", "public", "other.mp4", 3));

    let response = app
        .client()
        .get("/search")
        .add_query_param("q", "holiday")
        .add_header("Authorization", TEST_TOKEN)
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["count"], 1);
    assert_eq!(body["videos"][0]["original_filename"], "Holiday-Clip.mp4");
}

#[tokio::test]
async fn audit_log_limit_is_bounded() {
    let app = setup_test_app(Arc::new(RecordingPublisher::default())).await;
    let video_id = Uuid::new_v4();
    for i in 0..8 {
        app.store.seed_audit(AuditLogEntry {
            id: i,
            video_id: Some(video_id),
            user_id: Some("u1".to_string()),
            action: "view".to_string(),
            details: None,
            timestamp: Utc::now() - ChronoDuration::minutes(i),
        });
    }

    let response = app
        .client()
        .get("/audit-log")
        .add_query_param("video_id", video_id)
        .add_query_param("limit", 5)
        .add_header("Authorization", TEST_TOKEN)
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["count"], 5);
    let ids: Vec<i64> = body["audit_logs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4]);

    let response = app
        .client()
        .get("/audit-log")
        .add_query_param("limit", 100_000)
        .add_header("Authorization", TEST_TOKEN)
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>()["count"], 8);

    for bad in ["0", "-3", "ten"] {
        let response = app
            .client()
            .get("/audit-log")
            .add_query_param("limit", bad)
            .add_header("Authorization", TEST_TOKEN)
            .await;
        assert_eq!(response.status_code(), 400, "limit={}", bad);
    }
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let app = setup_test_app(Arc::new(RecordingPublisher::default())).await;

    let response = app
        .client()
        .get("/nope")
        .add_header("Authorization", TEST_TOKEN)
        .await;

    assert_eq!(response.status_code(), 404);
    let body: Value = response.json();
    assert_eq!(body["error"], "Endpoint not found");
}

#[tokio::test]
async fn health_reports_unreachable_database() {
    let app = setup_test_app(Arc::new(RecordingPublisher::default())).await;

    let response = app.client().get("/health").await;
    assert_eq!(response.status_code(), 503);
    let body: Value = response.json();
    assert_eq!(body["status"], "unhealthy");
    assert!(body["error"].is_string());

    let response = app.client().get("/live").await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>()["status"], "alive");
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = setup_test_app(Arc::new(RecordingPublisher::default())).await;

    let response = app
        .client()
        .get("/live")
        .add_header("x-request-id", "trace-abc")
        .await;

    assert_eq!(response.header("x-request-id"), "trace-abc");
}
