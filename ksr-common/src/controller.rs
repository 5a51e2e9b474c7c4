//! Submission controller
//!
//! Drives one customer's review through its phases:
//!
//! ```text
//! AwaitingRating --submit_rating--> AwaitingComment --attach_comment--> Done
//!                                                   --skip_comment----> Done
//! (any) --reset--> AwaitingRating
//! ```
//!
//! The rating is appended to the store as soon as it is submitted; a comment
//! is always a later amendment of that record. Session state is an explicit
//! value: each operation borrows the current [`SessionState`] and returns the
//! next one, so a failed operation leaves the caller's state as it was.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::review::{Rating, RecordId};
use crate::store::ReviewStore;
use crate::{Error, Result};

/// Phase of a review session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    AwaitingRating,
    AwaitingComment,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::AwaitingRating => "awaiting a rating",
            Phase::AwaitingComment => "awaiting a comment",
            Phase::Done => "done",
        })
    }
}

/// Rating captured for the in-flight review and the record it produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PendingReview {
    pub rating: Rating,
    pub record: RecordId,
}

/// Per-session interaction state (never persisted)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionState {
    phase: Phase,
    pending: Option<PendingReview>,
}

impl SessionState {
    /// Fresh session waiting for a rating
    pub fn new() -> Self {
        Self {
            phase: Phase::AwaitingRating,
            pending: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Submitted rating and its record; `None` while awaiting a rating
    pub fn pending(&self) -> Option<PendingReview> {
        self.pending
    }

    pub fn pending_rating(&self) -> Option<Rating> {
        self.pending.map(|p| p.rating)
    }

    fn expect_phase(&self, expected: Phase, operation: &'static str) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(Error::InvalidTransition {
                operation,
                phase: self.phase,
            })
        }
    }

    fn done(&self) -> Self {
        Self {
            phase: Phase::Done,
            pending: self.pending,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Which record a follow-up comment is written to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmendTarget {
    /// The record appended by the session's own rating
    #[default]
    Record,
    /// Whatever record is physically last in the store (legacy behaviour;
    /// misattributes comments when sessions interleave)
    Last,
}

/// Maps rating and comment events onto review store calls
#[derive(Clone)]
pub struct SubmissionController {
    store: Arc<dyn ReviewStore>,
    amend_target: AmendTarget,
}

impl fmt::Debug for SubmissionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmissionController")
            .field("amend_target", &self.amend_target)
            .finish_non_exhaustive()
    }
}

impl SubmissionController {
    pub fn new(store: Arc<dyn ReviewStore>, amend_target: AmendTarget) -> Self {
        Self {
            store,
            amend_target,
        }
    }

    pub fn store(&self) -> &Arc<dyn ReviewStore> {
        &self.store
    }

    pub fn amend_target(&self) -> AmendTarget {
        self.amend_target
    }

    /// Record a rating; persisted before the session moves on
    pub fn submit_rating(&self, state: &SessionState, rating: i64) -> Result<SessionState> {
        state.expect_phase(Phase::AwaitingRating, "submit a rating")?;
        let rating = Rating::new(rating)?;

        let record = self.store.append(rating, "")?;
        info!(%record, %rating, label = rating.label(), "Rating submitted");

        Ok(SessionState {
            phase: Phase::AwaitingComment,
            pending: Some(PendingReview { rating, record }),
        })
    }

    /// Attach a follow-up comment; blank text is treated as a skip
    pub fn attach_comment(&self, state: &SessionState, text: &str) -> Result<SessionState> {
        state.expect_phase(Phase::AwaitingComment, "attach a comment")?;

        let text = text.trim();
        if text.is_empty() {
            debug!("Blank comment, skipping amendment");
            return Ok(state.done());
        }

        match (self.amend_target, state.pending) {
            (AmendTarget::Record, Some(pending)) => {
                self.store.amend_comment(pending.record, text)?;
            }
            (AmendTarget::Record, None) => {
                // Only reachable through a hand-built state
                warn!("Session awaiting a comment has no pending record, amending last record");
                self.store.amend_last_comment(text)?;
            }
            (AmendTarget::Last, pending) => {
                let amended = self.store.amend_last_comment(text)?;
                if let Some(p) = pending.filter(|p| p.record != amended) {
                    warn!(
                        session_record = %p.record,
                        amended_record = %amended,
                        "Comment attached to a later review than the session's own"
                    );
                }
            }
        }
        info!(chars = text.chars().count(), "Comment attached");

        Ok(state.done())
    }

    /// Finish the comment phase without a comment
    pub fn skip_comment(&self, state: &SessionState) -> Result<SessionState> {
        state.expect_phase(Phase::AwaitingComment, "skip the comment")?;
        debug!("Comment skipped");
        Ok(state.done())
    }

    /// Start over for the next customer; valid in any phase
    pub fn reset(&self, state: &SessionState) -> SessionState {
        if state.phase != Phase::Done {
            debug!(phase = %state.phase, "Hard reset before review finished");
        }
        SessionState::new()
    }
}
