//! Timestamp encoding for SQLite text columns.
//!
//! Timestamps are stored as RFC 3339 UTC with microsecond precision and a `Z`
//! suffix. Every stored value has the same width, so lexical order in SQL
//! equals chronological order.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::db::error::DbError;

/// Encode a timestamp for storage.
pub fn to_db_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current time, encoded for storage.
pub fn now_db_timestamp() -> String {
    to_db_timestamp(Utc::now())
}

/// Decode a stored timestamp.
pub fn parse_db_timestamp(raw: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::InvalidData(format!("bad timestamp '{}': {}", raw, e)))
}
