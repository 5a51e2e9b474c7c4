//! # KSR Common Library
//!
//! Shared code for the Kiosk Store Reviews workspace:
//! - Review data model (ratings, records, record ids)
//! - Review store (append-only CSV table, in-memory variant)
//! - Submission controller (per-session review state machine)
//! - Configuration loading and root folder resolution
//! - Timestamp utilities

pub mod config;
pub mod controller;
pub mod error;
pub mod review;
pub mod store;
pub mod time;

pub use controller::{AmendTarget, Phase, SessionState, SubmissionController};
pub use error::{Error, Result};
pub use review::{Rating, RecordId, ReviewRecord};
pub use store::{CsvReviewStore, MemoryReviewStore, ReviewStore};
