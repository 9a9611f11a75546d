use std::fmt;

/// Result type for agmem-types operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the types layer
#[derive(Debug)]
pub enum Error {
    /// Timestamp string is not in the storage format
    InvalidTimestamp(String),

    /// Session identifier has the wrong width or alphabet
    InvalidSessionId(String),

    /// Payload is not a JSON object
    InvalidPayload(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidTimestamp(value) => write!(f, "Invalid timestamp: {}", value),
            Error::InvalidSessionId(value) => write!(
                f,
                "Invalid session id '{}': expected {} lowercase hex characters",
                value,
                crate::SessionId::WIDTH
            ),
            Error::InvalidPayload(msg) => write!(f, "Invalid payload: {}", msg),
        }
    }
}

impl std::error::Error for Error {}
