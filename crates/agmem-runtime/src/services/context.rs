use agmem_index::Database;
use agmem_types::{ContextBundle, ContextQuery};

use crate::{Config, Result};

/// Read-only view of prior history for a new invocation
pub struct ContextRetriever<'a> {
    db: &'a Database,
    knowledge_limit: usize,
}

impl<'a> ContextRetriever<'a> {
    pub fn new(db: &'a Database, config: &Config) -> Self {
        Self {
            db,
            knowledge_limit: config.knowledge_limit,
        }
    }

    /// Assemble the three groups independently.
    ///
    /// Sessions match `cwd` exactly. Patterns belong to the git root of the
    /// latest session in `cwd`. Knowledge is global and ignores `branch` and
    /// `file_patterns`, which are only echoed back in `query`.
    pub fn get_relevant_context(&self, query: ContextQuery) -> Result<ContextBundle> {
        let recent_sessions = self.db.sessions_for_dir(&query.cwd, query.limit)?;

        let project_path = self.db.latest_git_repo_for_dir(&query.cwd)?;
        let project_patterns = match &project_path {
            Some(path) => self.db.patterns_for_project(path)?,
            None => Vec::new(),
        };

        let relevant_knowledge = self.db.list_knowledge(None, self.knowledge_limit)?;

        tracing::debug!(
            cwd = %query.cwd,
            sessions = recent_sessions.len(),
            patterns = project_patterns.len(),
            knowledge = relevant_knowledge.len(),
            "context assembled"
        );

        Ok(ContextBundle {
            query,
            project_path,
            recent_sessions,
            project_patterns,
            relevant_knowledge,
        })
    }
}
