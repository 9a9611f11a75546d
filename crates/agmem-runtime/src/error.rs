use std::fmt;

/// Result type for agmem-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the runtime layer
#[derive(Debug)]
pub enum Error {
    /// Database/index layer error
    Index(agmem_index::Error),

    /// Path resolution or other core helper failed
    Core(agmem_core::Error),

    /// IO operation failed
    Io(std::io::Error),

    /// Configuration error
    Config(String),

    /// Caller supplied an unusable argument
    InvalidInput(String),
}

impl Error {
    /// True when the error names a session id that was never started
    pub fn is_session_not_found(&self) -> bool {
        matches!(self, Error::Index(agmem_index::Error::SessionNotFound(_)))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Index(err) => write!(f, "{}", err),
            Error::Core(err) => write!(f, "{}", err),
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Index(err) => Some(err),
            Error::Core(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Config(_) | Error::InvalidInput(_) => None,
        }
    }
}

impl From<agmem_index::Error> for Error {
    fn from(err: agmem_index::Error) -> Self {
        Error::Index(err)
    }
}

impl From<agmem_core::Error> for Error {
    fn from(err: agmem_core::Error) -> Self {
        Error::Core(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}
