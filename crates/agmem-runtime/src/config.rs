use crate::{Error, Result};
use agmem_index::{OpenOptions, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_DB_FILE: &str = "memory.db";
/// Upper bound for `stale_after_hours` (100 years)
pub const MAX_STALE_AFTER_HOURS: u64 = 24 * 366 * 100;

/// Settings read from `<data_dir>/config.toml`; every field is optional in the file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Store file; `<data_dir>/memory.db` when unset
    pub db_path: Option<PathBuf>,
    /// SQL script executed once when the store is created
    pub schema_file: Option<PathBuf>,
    pub git_timeout_ms: u64,
    pub busy_timeout_ms: u64,
    pub busy_retries: u32,
    pub busy_backoff_ms: u64,
    /// Open sessions older than this are reported as abandoned
    pub stale_after_hours: u64,
    pub context_limit: usize,
    pub knowledge_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: None,
            schema_file: None,
            git_timeout_ms: 2000,
            busy_timeout_ms: 5000,
            busy_retries: 5,
            busy_backoff_ms: 50,
            stale_after_hours: 24,
            context_limit: 10,
            knowledge_limit: 10,
        }
    }
}

impl Config {
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn default_path(data_dir: &Path) -> PathBuf {
        data_dir.join(CONFIG_FILE)
    }

    fn validate(&self) -> Result<()> {
        if self.context_limit == 0 || self.knowledge_limit == 0 {
            return Err(Error::Config(
                "context_limit and knowledge_limit must be at least 1".to_string(),
            ));
        }
        if self.stale_after_hours == 0 || self.stale_after_hours > MAX_STALE_AFTER_HOURS {
            return Err(Error::Config(format!(
                "stale_after_hours must be between 1 and {}, got {}",
                MAX_STALE_AFTER_HOURS, self.stale_after_hours
            )));
        }
        Ok(())
    }

    /// Store location; relative `db_path` values resolve against `data_dir`
    pub fn db_path(&self, data_dir: &Path) -> PathBuf {
        match &self.db_path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => data_dir.join(path),
            None => data_dir.join(DEFAULT_DB_FILE),
        }
    }

    pub fn git_timeout(&self) -> Duration {
        Duration::from_millis(self.git_timeout_ms)
    }

    /// Staleness window; values past the representable range saturate
    pub fn stale_after(&self) -> chrono::Duration {
        i64::try_from(self.stale_after_hours)
            .ok()
            .and_then(chrono::Duration::try_hours)
            .unwrap_or(chrono::Duration::MAX)
    }

    /// Store open options, reading `schema_file` if one is configured
    pub fn open_options(&self, data_dir: &Path) -> Result<OpenOptions> {
        let extra_schema = match &self.schema_file {
            Some(path) => {
                let path = if path.is_absolute() {
                    path.clone()
                } else {
                    data_dir.join(path)
                };
                if path.exists() {
                    Some(std::fs::read_to_string(&path)?)
                } else {
                    tracing::warn!(path = %path.display(), "schema file not found, skipping");
                    None
                }
            }
            None => None,
        };

        Ok(OpenOptions {
            busy_timeout: Duration::from_millis(self.busy_timeout_ms),
            retry: RetryPolicy {
                max_retries: self.busy_retries,
                backoff: Duration::from_millis(self.busy_backoff_ms),
            },
            extra_schema,
        })
    }
}
