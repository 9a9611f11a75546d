use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Totals for one CLI tool
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolTotals {
    pub sessions: u64,
    pub total_time: f64,
    /// Never ended and past the staleness window
    pub abandoned: u64,
}

/// Sessions started on one UTC day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyActivity {
    pub date: String,
    pub sessions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopProject {
    pub path: String,
    pub name: String,
    pub sessions: u64,
    pub time: f64,
}

/// Aggregate statistics printed by `agmem stats`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub by_tool: BTreeMap<String, ToolTotals>,
    pub recent_activity: Vec<DailyActivity>,
    pub top_projects: Vec<TopProject>,
}

/// One (day, tool) bucket of the activity timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineBucket {
    pub date: String,
    pub cli_tool: String,
    pub sessions: u64,
    pub total_time: f64,
}

/// Modification counts for one file path across all sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileActivity {
    pub file_path: String,
    pub language: Option<String>,
    pub modifications: u64,
    pub total_added: u64,
    pub total_removed: u64,
}

/// Search result over knowledge entries and context notes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchHit {
    Knowledge {
        title: String,
        description: String,
        category: String,
        frequency: u64,
    },
    Context {
        session_id: String,
        context_type: String,
        context_data: crate::Payload,
    },
}
