//! Integration tests for ksr-ui API endpoints
//!
//! Tests cover:
//! - Health endpoint
//! - Full kiosk cycle: open session → rate → comment → start over
//! - Rejected events leave the session unchanged
//! - Several sessions sharing one review table

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use ksr_common::{AmendTarget, CsvReviewStore, ReviewStore};
use ksr_ui::{build_router, AppState};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: app over a CSV table in a scratch directory
fn setup_app() -> (TempDir, Arc<CsvReviewStore>, Router) {
    let dir = tempfile::tempdir().expect("Should create temp dir");
    let store = Arc::new(CsvReviewStore::new(dir.path().join("reviews.csv")));
    let state = AppState::new(store.clone(), AmendTarget::Record);
    (dir, store, build_router(state))
}

/// Test helper: build a request with an optional JSON body
fn test_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Test helper: send a request, returning status and JSON body
async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(test_request(method, uri, body))
        .await
        .unwrap();
    let status = response.status();
    (status, extract_json(response.into_body()).await)
}

/// Test helper: open a session and return its id
async fn open_session(app: &Router) -> String {
    let (status, body) = send(app, "POST", "/api/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    body["session_id"].as_str().unwrap().to_string()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (_dir, _store, app) = setup_app();

    let (status, body) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

// =============================================================================
// Kiosk cycle
// =============================================================================

#[tokio::test]
async fn test_new_session_offers_rating_faces() {
    let (_dir, _store, app) = setup_app();

    let (status, body) = send(&app, "POST", "/api/sessions", None).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["phase"], "awaiting_rating");
    assert_eq!(body["controls"]["kind"], "rating_options");
    assert_eq!(body["controls"]["options"].as_array().unwrap().len(), 5);
    assert!(body.get("rating").is_none());
}

#[tokio::test]
async fn test_full_review_cycle() {
    let (_dir, store, app) = setup_app();
    let id = open_session(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/sessions/{}/rating", id),
        Some(json!({ "rating": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "awaiting_comment");
    assert_eq!(body["rating"]["label"], "Excellent");
    assert_eq!(body["controls"]["kind"], "comment_form");

    let records = store.load_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].comment, "");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/sessions/{}/comment", id),
        Some(json!({ "comment": "Loved it" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "done");
    assert_eq!(body["controls"]["kind"], "confirmation");

    let (status, body) = send(&app, "POST", &format!("/api/sessions/{}/reset", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "awaiting_rating");

    let records = store.load_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].rating.value(), 5);
    assert_eq!(records[0].comment, "Loved it");
}

#[tokio::test]
async fn test_skip_comment() {
    let (_dir, store, app) = setup_app();
    let id = open_session(&app).await;

    send(
        &app,
        "POST",
        &format!("/api/sessions/{}/rating", id),
        Some(json!({ "rating": 3 })),
    )
    .await;
    let (status, body) = send(&app, "POST", &format!("/api/sessions/{}/skip", id), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "done");
    assert_eq!(store.load_all().unwrap()[0].comment, "");
}

// =============================================================================
// Rejected events
// =============================================================================

#[tokio::test]
async fn test_invalid_rating_is_bad_request() {
    let (_dir, store, app) = setup_app();
    let id = open_session(&app).await;

    for rating in [0, 6] {
        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/sessions/{}/rating", id),
            Some(json!({ "rating": rating })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_RATING");
    }

    let (_, body) = send(&app, "GET", &format!("/api/sessions/{}", id), None).await;
    assert_eq!(body["phase"], "awaiting_rating");
    assert!(store.load_all().unwrap().is_empty());
}

#[tokio::test]
async fn test_second_rating_is_conflict() {
    let (_dir, store, app) = setup_app();
    let id = open_session(&app).await;
    let uri = format!("/api/sessions/{}/rating", id);

    let (status, _) = send(&app, "POST", &uri, Some(json!({ "rating": 4 }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "POST", &uri, Some(json!({ "rating": 2 }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "INVALID_TRANSITION");

    let (_, body) = send(&app, "GET", &format!("/api/sessions/{}", id), None).await;
    assert_eq!(body["phase"], "awaiting_comment");
    assert_eq!(store.load_all().unwrap().len(), 1);
}

#[tokio::test]
async fn test_skip_before_rating_is_conflict() {
    let (_dir, _store, app) = setup_app();
    let id = open_session(&app).await;

    let (status, body) = send(&app, "POST", &format!("/api/sessions/{}/skip", id), None).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "INVALID_TRANSITION");
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let (_dir, _store, app) = setup_app();
    let uri = format!("/api/sessions/{}", uuid::Uuid::new_v4());

    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "SESSION_NOT_FOUND");
}

#[tokio::test]
async fn test_end_session() {
    let (_dir, _store, app) = setup_app();
    let id = open_session(&app).await;
    let uri = format!("/api/sessions/{}", id);

    let response = app
        .clone()
        .oneshot(test_request("DELETE", &uri, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Shared table
// =============================================================================

#[tokio::test]
async fn test_interleaved_sessions_keep_their_comments() {
    let (_dir, store, app) = setup_app();
    let a = open_session(&app).await;
    let b = open_session(&app).await;

    send(
        &app,
        "POST",
        &format!("/api/sessions/{}/rating", a),
        Some(json!({ "rating": 2 })),
    )
    .await;
    send(
        &app,
        "POST",
        &format!("/api/sessions/{}/rating", b),
        Some(json!({ "rating": 5 })),
    )
    .await;
    send(
        &app,
        "POST",
        &format!("/api/sessions/{}/comment", a),
        Some(json!({ "comment": "Queue was long" })),
    )
    .await;

    let records = store.load_all().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].rating.value(), 2);
    assert_eq!(records[0].comment, "Queue was long");
    assert_eq!(records[1].comment, "");
}
