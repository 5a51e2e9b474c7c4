//! Common error types for KSR

use thiserror::Error;

use crate::controller::Phase;
use crate::review::RecordId;

/// Common result type for KSR operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the review store and the submission controller
#[derive(Error, Debug)]
pub enum Error {
    /// Rating outside the 1..=5 scale
    #[error("Invalid rating: {0} (expected 1-5)")]
    InvalidRating(i64),

    /// State machine operation called in the wrong phase
    #[error("Invalid transition: cannot {operation} while {phase}")]
    InvalidTransition {
        operation: &'static str,
        phase: Phase,
    },

    /// Comment amendment attempted against a store with no records
    #[error("Review store is empty")]
    EmptyStore,

    /// Record id does not address a stored record
    #[error("Unknown review record: {0}")]
    UnknownRecord(RecordId),

    /// Record already carries a comment; comments are amended once
    #[error("Comment already set on review record {0}")]
    CommentAlreadySet(RecordId),

    /// Reading or writing the review table failed
    #[error("Storage I/O failure: {0}")]
    StorageIo(#[from] std::io::Error),

    /// Review table could not be parsed or encoded
    #[error("Storage format failure: {0}")]
    StorageFormat(#[from] csv::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True for failures of the underlying review table, as opposed to
    /// rejected operations.
    pub fn is_storage_failure(&self) -> bool {
        matches!(self, Error::StorageIo(_) | Error::StorageFormat(_))
    }
}
