use agmem_index::{Database, NewPattern};
use agmem_types::ProjectPattern;
use chrono::Utc;

use crate::{Error, Result};

/// Write path for per-project patterns surfaced in the context bundle
pub struct PatternStore<'a> {
    db: &'a Database,
}

impl<'a> PatternStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Upsert keyed by (project, type, pattern). The project must already exist.
    pub fn record(
        &self,
        project_path: &str,
        pattern_type: &str,
        pattern: &str,
        confidence: f64,
    ) -> Result<()> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(Error::InvalidInput(format!(
                "confidence must be within 0..=1, got {}",
                confidence
            )));
        }

        self.db.record_pattern(&NewPattern {
            project_path: project_path.to_string(),
            pattern_type: pattern_type.to_string(),
            pattern: pattern.to_string(),
            confidence,
            seen_at: Utc::now(),
        })?;
        Ok(())
    }

    pub fn for_project(&self, project_path: &str) -> Result<Vec<ProjectPattern>> {
        Ok(self.db.patterns_for_project(project_path)?)
    }
}
