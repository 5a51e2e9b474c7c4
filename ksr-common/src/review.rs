//! Review data model

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Customer satisfaction rating on the 1-5 face scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Validate a raw rating value
    pub fn new(value: i64) -> Result<Self> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(Error::InvalidRating(value))
        }
    }

    /// Every rating, worst to best
    pub fn all() -> impl Iterator<Item = Rating> {
        (Self::MIN..=Self::MAX).map(Rating)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Human-readable label shown next to the face
    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "Very Poor",
            2 => "Poor",
            3 => "Average",
            4 => "Good",
            _ => "Excellent",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self.0 {
            1 => "😞",
            2 => "😟",
            3 => "😐",
            4 => "😊",
            _ => "😄",
        }
    }
}

impl TryFrom<i64> for Rating {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        Rating::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> u8 {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of a record in storage order
///
/// The review table is append-only and never reordered, so a position keeps
/// addressing the same record for the lifetime of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub usize);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One customer's feedback event, one row of the review table
///
/// Field order is the on-disk column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    #[serde(with = "crate::time::table_format")]
    pub timestamp: NaiveDateTime,
    pub rating: Rating,
    #[serde(default)]
    pub comment: String,
}

impl ReviewRecord {
    /// New record stamped with the current local time
    pub fn new(rating: Rating, comment: &str) -> Self {
        Self {
            timestamp: crate::time::now(),
            rating,
            comment: comment.trim().to_string(),
        }
    }

    pub fn has_comment(&self) -> bool {
        !self.comment.is_empty()
    }
}
