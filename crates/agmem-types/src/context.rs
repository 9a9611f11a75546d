use serde::{Deserialize, Serialize};

use crate::{KnowledgeEntry, ProjectPattern, Session};

/// Inputs to a context lookup, echoed back in the bundle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextQuery {
    pub cwd: String,
    pub branch: Option<String>,
    #[serde(default)]
    pub file_patterns: Vec<String>,
    pub limit: usize,
}

/// Context bundle handed to a new session.
///
/// The three groups are retrieved independently and never merged:
/// - `recent_sessions`: exact `working_dir == cwd`, newest first
/// - `project_patterns`: patterns of the git root last seen for `cwd`
/// - `relevant_knowledge`: global, most frequent first; not scoped to
///   `cwd`, branch or file patterns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextBundle {
    pub query: ContextQuery,
    pub project_path: Option<String>,
    pub recent_sessions: Vec<Session>,
    pub project_patterns: Vec<ProjectPattern>,
    pub relevant_knowledge: Vec<KnowledgeEntry>,
}
