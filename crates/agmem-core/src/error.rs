use std::fmt;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures while locating the data directory
#[derive(Debug)]
pub enum Error {
    /// No explicit path, no `AGMEM_PATH`, and neither a system data dir nor HOME
    NoDataDir,
    /// The path cannot be used as a data directory
    InvalidDataDir { path: PathBuf, reason: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NoDataDir => write!(
                f,
                "Could not determine data directory: pass --data-dir or set AGMEM_PATH"
            ),
            Error::InvalidDataDir { path, reason } => {
                write!(f, "Invalid data directory {}: {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for Error {}
