//! HTTP API handlers for ksr-ui

pub mod error;
pub mod session;

pub use error::{ApiError, ApiResult};
pub use session::{
    attach_comment, create_session, end_session, get_session, reset_session, skip_comment,
    submit_rating,
};
