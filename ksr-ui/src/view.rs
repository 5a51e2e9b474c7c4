//! Kiosk view model
//!
//! The shell never decides anything itself: it renders whatever the current
//! [`SessionState`] allows. Each phase exposes only the controls consistent
//! with it.

use ksr_common::{Phase, Rating, SessionState};
use serde::Serialize;
use uuid::Uuid;

/// One face on the rating scale
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RatingOption {
    pub value: u8,
    pub label: &'static str,
    pub emoji: &'static str,
}

impl From<Rating> for RatingOption {
    fn from(rating: Rating) -> Self {
        Self {
            value: rating.value(),
            label: rating.label(),
            emoji: rating.emoji(),
        }
    }
}

/// Controls the kiosk may show in the current phase
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Controls {
    /// Five rating faces
    RatingOptions { options: Vec<RatingOption> },
    /// Free-text comment with skip and submit actions
    CommentForm { placeholder: &'static str },
    /// Confirmation with a start-over action
    Confirmation { message: &'static str },
}

/// Rendered state of one session
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub phase: Phase,
    /// Submitted rating, absent while awaiting one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<RatingOption>,
    pub prompt: &'static str,
    pub controls: Controls,
}

impl SessionView {
    pub fn render(session_id: Uuid, state: &SessionState) -> Self {
        let (prompt, controls) = match state.phase() {
            Phase::AwaitingRating => (
                "How was your experience with us today?",
                Controls::RatingOptions {
                    options: Rating::all().map(RatingOption::from).collect(),
                },
            ),
            Phase::AwaitingComment => (
                "Thank you for your feedback! Want to leave a comment? (Optional)",
                Controls::CommentForm {
                    placeholder: "Tell us more about your experience...",
                },
            ),
            Phase::Done => (
                "Thank you!",
                Controls::Confirmation {
                    message: "Your feedback has been recorded.",
                },
            ),
        };

        Self {
            session_id,
            phase: state.phase(),
            rating: state.pending_rating().map(RatingOption::from),
            prompt,
            controls,
        }
    }
}
