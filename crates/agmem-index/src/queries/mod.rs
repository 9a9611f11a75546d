pub mod events;
pub mod knowledge;
pub mod pattern;
pub mod project;
pub mod session;
pub mod stats;
pub mod summary;

use agmem_types::{Payload, parse_timestamp};
use chrono::{DateTime, Utc};
use rusqlite::Row;
use rusqlite::types::Type;

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

/// Read a timestamp column
pub(crate) fn ts(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_timestamp(&raw).map_err(|e| conversion_error(idx, e))
}

/// Read a nullable timestamp column
pub(crate) fn opt_ts(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    row.get::<_, Option<String>>(idx)?
        .map(|raw| parse_timestamp(&raw).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

/// Read a JSON object column
pub(crate) fn payload(row: &Row<'_>, idx: usize) -> rusqlite::Result<Payload> {
    let raw: String = row.get(idx)?;
    Payload::from_json(&raw).map_err(|e| conversion_error(idx, e))
}

/// Read a nullable JSON object column
pub(crate) fn opt_payload(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Payload>> {
    row.get::<_, Option<String>>(idx)?
        .map(|raw| Payload::from_json(&raw).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

/// Non-negative integer column
pub(crate) fn count(row: &Row<'_>, idx: usize) -> rusqlite::Result<u64> {
    let value: i64 = row.get(idx)?;
    Ok(value.max(0) as u64)
}

/// `LIMIT` operand; values past `i64::MAX` saturate instead of wrapping negative
pub(crate) fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}
