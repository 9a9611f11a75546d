use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-repository rollup keyed by git root path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub project_path: String,
    pub project_name: String,
    pub session_count: u64,
    pub total_time_seconds: f64,
    /// Lookup key only; the session may have been removed by external retention
    pub last_session_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn average_session_seconds(&self) -> f64 {
        if self.session_count == 0 {
            0.0
        } else {
            self.total_time_seconds / self.session_count as f64
        }
    }
}

/// Display name for a project: the final path component
pub fn project_name_from_path(project_path: &str) -> String {
    Path::new(project_path)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| project_path.to_string())
}
