//! Session endpoints
//!
//! Each kiosk action is one event dispatched to the submission controller.
//! The controller runs on the blocking pool because every store mutation
//! rewrites the review table synchronously. The session's state is only
//! replaced when the controller succeeds.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use ksr_common::{SessionState, SubmissionController};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::error::{ApiError, ApiResult};
use crate::view::SessionView;
use crate::AppState;

/// Body of POST /api/sessions/:id/rating
#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    pub rating: i64,
}

/// Body of POST /api/sessions/:id/comment
#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub comment: String,
}

/// Apply one controller operation to a session
async fn dispatch<F>(state: &AppState, id: Uuid, op: F) -> ApiResult<Json<SessionView>>
where
    F: FnOnce(&SubmissionController, &SessionState) -> ksr_common::Result<SessionState>
        + Send
        + 'static,
{
    let slot = state
        .sessions
        .get(id)
        .await
        .ok_or(ApiError::SessionNotFound(id))?;

    // Held across the controller call so events for one session never overlap
    let mut session = slot.lock().await;

    let controller = state.controller.clone();
    let current = session.state().clone();
    let next = tokio::task::spawn_blocking(move || op(&controller, &current))
        .await
        .map_err(|e| ApiError::Internal(format!("Task join error: {}", e)))??;

    debug!(session = %id, phase = %next.phase(), "Session advanced");
    session.advance(next);
    Ok(Json(SessionView::render(id, session.state())))
}

/// POST /api/sessions
///
/// Opens a session for the next customer.
pub async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionView>) {
    let (id, session) = state.sessions.create().await;
    info!(session = %id, "Session opened");
    (StatusCode::CREATED, Json(SessionView::render(id, &session)))
}

/// GET /api/sessions/:id
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SessionView>> {
    let slot = state
        .sessions
        .get(id)
        .await
        .ok_or(ApiError::SessionNotFound(id))?;
    let session = slot.lock().await;
    Ok(Json(SessionView::render(id, session.state())))
}

/// POST /api/sessions/:id/rating
pub async fn submit_rating(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RatingRequest>,
) -> ApiResult<Json<SessionView>> {
    dispatch(&state, id, move |controller, session| {
        controller.submit_rating(session, request.rating)
    })
    .await
}

/// POST /api/sessions/:id/comment
///
/// Blank comments finish the session like a skip.
pub async fn attach_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CommentRequest>,
) -> ApiResult<Json<SessionView>> {
    dispatch(&state, id, move |controller, session| {
        controller.attach_comment(session, &request.comment)
    })
    .await
}

/// POST /api/sessions/:id/skip
pub async fn skip_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SessionView>> {
    dispatch(&state, id, |controller, session| controller.skip_comment(session)).await
}

/// POST /api/sessions/:id/reset
///
/// "Start over": valid in any phase.
pub async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SessionView>> {
    dispatch(&state, id, |controller, session| Ok(controller.reset(session))).await
}

/// DELETE /api/sessions/:id
pub async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if state.sessions.remove(id).await {
        info!(session = %id, "Session closed");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::SessionNotFound(id))
    }
}
