use agmem_index::Database;
use agmem_types::{KnowledgeEntry, NewKnowledge};
use chrono::{DateTime, Utc};

use crate::{Error, Result};

/// Default cap for `list` when the caller gives none
pub const DEFAULT_LIST_LIMIT: usize = 100;

/// Deduplicated, frequency-ranked knowledge entries
pub struct KnowledgeBase<'a> {
    db: &'a Database,
}

impl<'a> KnowledgeBase<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn add(&self, entry: NewKnowledge) -> Result<KnowledgeEntry> {
        self.add_at(entry, Utc::now())
    }

    /// First submission of a title creates the entry; later ones bump its
    /// frequency, refresh `last_used` and add the session to its sources
    pub fn add_at(&self, entry: NewKnowledge, at: DateTime<Utc>) -> Result<KnowledgeEntry> {
        if entry.title.trim().is_empty() {
            return Err(Error::InvalidInput("knowledge title must not be empty".to_string()));
        }
        if entry.category.trim().is_empty() {
            return Err(Error::InvalidInput(
                "knowledge category must not be empty".to_string(),
            ));
        }

        let stored = self.db.upsert_knowledge(&entry, &at)?;
        tracing::debug!(title = %stored.title, frequency = stored.frequency, "knowledge recorded");
        Ok(stored)
    }

    pub fn get(&self, title: &str) -> Result<Option<KnowledgeEntry>> {
        Ok(self.db.get_knowledge(title)?)
    }

    pub fn list(&self, category: Option<&str>, limit: Option<usize>) -> Result<Vec<KnowledgeEntry>> {
        Ok(self
            .db
            .list_knowledge(category, limit.unwrap_or(DEFAULT_LIST_LIMIT))?)
    }
}
