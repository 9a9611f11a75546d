use std::fmt;

/// Result type for agmem-index operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the index layer
#[derive(Debug)]
pub enum Error {
    /// Database operation failed
    Database(rusqlite::Error),

    /// IO operation failed
    Io(std::io::Error),

    /// Payload column could not be encoded or decoded
    Serde(serde_json::Error),

    /// Query-specific error (invalid input, unknown project, etc.)
    Query(String),

    /// `end` was called with an id that was never started
    SessionNotFound(String),

    /// A schema migration could not be applied
    Migration { version: i32, message: String },
}

impl Error {
    /// True for lock contention that a retry may resolve
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Error::Database(rusqlite::Error::SqliteFailure(err, _))
                if matches!(
                    err.code,
                    rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
                )
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Database(err) => {
                let msg = err.to_string();
                // Detect schema mismatch errors and provide actionable hint
                if msg.contains("no such column") || msg.contains("no such table") {
                    write!(
                        f,
                        "Database schema mismatch: {}. Re-run the command to auto-migrate, or check that the store was not created by a newer agmem.",
                        msg
                    )
                } else {
                    write!(f, "Database error: {}", err)
                }
            }
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Serde(err) => write!(f, "Payload error: {}", err),
            Error::Query(msg) => write!(f, "Query error: {}", msg),
            Error::SessionNotFound(id) => write!(f, "Session not found: {}", id),
            Error::Migration { version, message } => {
                write!(f, "Migration to schema v{} failed: {}", version, message)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Database(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Serde(err) => Some(err),
            Error::Query(_) | Error::SessionNotFound(_) | Error::Migration { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serde(err)
    }
}
