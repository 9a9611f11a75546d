use chrono::{DateTime, NaiveDateTime, Utc};

/// Storage format for every timestamp column.
///
/// Fixed width (microseconds, trailing `Z`) so that lexical order in SQL
/// matches chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Format a timestamp for storage
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp.
///
/// Accepts the storage format and, for hand-edited rows, any RFC 3339 value.
pub fn parse_timestamp(value: &str) -> crate::Result<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT) {
        return Ok(naive.and_utc());
    }

    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| crate::Error::InvalidTimestamp(value.to_string()))
}

/// Seconds between two timestamps, clamped at zero
pub fn seconds_between(start: &DateTime<Utc>, end: &DateTime<Utc>) -> f64 {
    let micros = (*end - *start).num_microseconds().unwrap_or(i64::MAX);
    (micros.max(0) as f64) / 1_000_000.0
}
