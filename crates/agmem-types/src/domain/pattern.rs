use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Observed pattern attached to a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectPattern {
    pub id: i64,
    pub project_path: String,
    pub pattern_type: String,
    pub pattern: String,
    pub confidence: f64,
    pub occurrences: u64,
    pub last_seen: DateTime<Utc>,
}
