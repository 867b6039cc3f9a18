//! Millisecond timestamps
//!
//! Documents store instants as integer milliseconds. Entities are truncated to
//! the same precision so a value read back from the store compares equal to
//! the one that was written.

use chrono::{DateTime, Utc};

/// Current time truncated to millisecond precision
pub fn now_millis() -> DateTime<Utc> {
    truncate_to_millis(Utc::now())
}

/// Drop sub-millisecond precision from an instant
pub fn truncate_to_millis(at: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(at.timestamp_millis()).unwrap_or(at)
}
