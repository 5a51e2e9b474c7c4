//! ksr-ui library - kiosk shell for Kiosk Store Reviews
//!
//! Thin local HTTP adapter over the submission controller. Each customer
//! interaction is a session; the shell dispatches rating and comment events
//! to the controller and renders the session's current view as JSON.

use std::sync::Arc;

use axum::{Json, Router};
use ksr_common::{AmendTarget, ReviewStore, SubmissionController};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod sessions;
pub mod view;

use sessions::SessionRegistry;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Maps session events onto the shared review store
    pub controller: SubmissionController,
    /// Live customer sessions
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(store: Arc<dyn ReviewStore>, amend_target: AmendTarget) -> Self {
        Self {
            controller: SubmissionController::new(store, amend_target),
            sessions: SessionRegistry::default(),
        }
    }
}

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let sessions = Router::new()
        .route("/api/sessions", post(api::create_session))
        .route(
            "/api/sessions/:id",
            get(api::get_session).delete(api::end_session),
        )
        .route("/api/sessions/:id/rating", post(api::submit_rating))
        .route("/api/sessions/:id/comment", post(api::attach_comment))
        .route("/api/sessions/:id/skip", post(api::skip_comment))
        .route("/api/sessions/:id/reset", post(api::reset_session));

    Router::new()
        .merge(sessions)
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
