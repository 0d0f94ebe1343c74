//! Timestamp utilities
//!
//! All stored timestamps are RFC 3339 UTC strings with millisecond precision,
//! so ordering by the text column equals chronological ordering.

use chrono::{DateTime, SecondsFormat, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current UTC timestamp in the stored text form
pub fn now_rfc3339() -> String {
    to_stored(now())
}

/// Format a timestamp in the stored text form
pub fn to_stored(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Milliseconds since the Unix epoch (used in storage paths and session ids)
pub fn unix_millis() -> i64 {
    now().timestamp_millis()
}
