//! Timestamp utilities
//!
//! Review timestamps are local wall-clock time with second precision,
//! stored in the review table as `YYYY-MM-DD HH:MM:SS`.

use chrono::{Local, NaiveDateTime, Timelike};

/// Column format of the review table timestamp
pub const TABLE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time truncated to whole seconds
pub fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Format a timestamp for the review table
pub fn format_table_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(TABLE_TIMESTAMP_FORMAT).to_string()
}

/// Parse a review table timestamp
pub fn parse_table_timestamp(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value.trim(), TABLE_TIMESTAMP_FORMAT)
}

/// Serde adapter for `NaiveDateTime` fields in the review table
pub mod table_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(timestamp: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_table_timestamp(timestamp))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_table_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}
