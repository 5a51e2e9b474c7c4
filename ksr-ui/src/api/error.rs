//! API error type
//!
//! Maps review errors onto HTTP status codes with a JSON body of the form
//! `{"error": {"code": ..., "message": ...}}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ApiError {
    /// No live session with this id (404)
    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    /// Rejected or failed review operation
    #[error(transparent)]
    Review(#[from] ksr_common::Error),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use ksr_common::Error as Review;

        let (status, error_code) = match &self {
            ApiError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "SESSION_NOT_FOUND"),
            ApiError::Review(Review::InvalidRating(_)) => {
                (StatusCode::BAD_REQUEST, "INVALID_RATING")
            }
            ApiError::Review(Review::InvalidTransition { .. }) => {
                (StatusCode::CONFLICT, "INVALID_TRANSITION")
            }
            ApiError::Review(Review::CommentAlreadySet(_)) => {
                (StatusCode::CONFLICT, "COMMENT_ALREADY_SET")
            }
            ApiError::Review(Review::EmptyStore) => (StatusCode::CONFLICT, "EMPTY_STORE"),
            ApiError::Review(Review::UnknownRecord(_)) => {
                (StatusCode::CONFLICT, "UNKNOWN_RECORD")
            }
            ApiError::Review(Review::StorageIo(_) | Review::StorageFormat(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_FAILURE")
            }
            ApiError::Review(Review::Config(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR")
            }
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
