use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Pick the data directory.
///
/// Order: `explicit` (the `--data-dir` flag), `$AGMEM_PATH`, the system
/// data dir joined with `agmem`, then `~/.agmem`. Tildes are expanded.
/// Only the binary calls this; library code is handed the result.
pub fn resolve_workspace_path(explicit: Option<&str>) -> Result<PathBuf> {
    let from_env = std::env::var("AGMEM_PATH").ok();

    let path = match explicit.or(from_env.as_deref()) {
        Some(raw) if raw.trim().is_empty() => {
            return Err(Error::InvalidDataDir {
                path: PathBuf::from(raw),
                reason: "path is empty".to_string(),
            });
        }
        Some(raw) => expand_tilde(raw),
        None => dirs::data_dir()
            .map(|dir| dir.join("agmem"))
            .or_else(|| dirs::home_dir().map(|home| home.join(".agmem")))
            .ok_or(Error::NoDataDir)?,
    };

    if path.is_file() {
        return Err(Error::InvalidDataDir {
            path,
            reason: "a file exists at this path".to_string(),
        });
    }

    Ok(path)
}

/// Expand tilde (~) in paths to the user's home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return home;
    }

    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}

/// Normalize a path for comparison (resolve to absolute, canonicalize if possible)
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        }
    })
}
