use agmem_types::{FileActionKind, GitContext, Payload, SessionId};
use chrono::{DateTime, Utc};

/// Session row written by `start`
#[derive(Debug, Clone)]
pub struct NewSession {
    pub session_id: SessionId,
    pub cli_tool: String,
    pub start_time: DateTime<Utc>,
    pub working_dir: String,
    pub git: GitContext,
}

/// Context note to append
#[derive(Debug, Clone)]
pub struct NewContextNote {
    pub session_id: String,
    pub context_type: String,
    pub data: Payload,
    pub timestamp: DateTime<Utc>,
}

/// File action to append
#[derive(Debug, Clone)]
pub struct NewFileAction {
    pub session_id: String,
    pub file_path: String,
    pub action: FileActionKind,
    pub language: Option<String>,
    pub lines_added: u64,
    pub lines_removed: u64,
    pub timestamp: DateTime<Utc>,
}

/// Command record to append
#[derive(Debug, Clone)]
pub struct NewCommand {
    pub session_id: String,
    pub command: String,
    pub exit_code: i32,
    pub output_summary: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Pattern observation for an existing project
#[derive(Debug, Clone)]
pub struct NewPattern {
    pub project_path: String,
    pub pattern_type: String,
    pub pattern: String,
    pub confidence: f64,
    pub seen_at: DateTime<Utc>,
}
