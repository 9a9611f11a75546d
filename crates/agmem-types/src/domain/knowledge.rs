use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Payload;

/// Deduplicated fact or pattern, unique by title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub id: i64,
    pub category: String,
    pub title: String,
    pub description: String,
    pub context: Option<Payload>,
    /// Non-decreasing; one per submission
    pub frequency: u64,
    pub last_used: DateTime<Utc>,
    /// Session that first submitted the entry
    pub origin_session: Option<String>,
    /// Every distinct session that submitted the entry, in first-seen order
    pub source_sessions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Input to a knowledge submission
#[derive(Debug, Clone, Default)]
pub struct NewKnowledge {
    pub category: String,
    pub title: String,
    pub description: String,
    pub context: Option<Payload>,
    pub source_session: Option<String>,
}
