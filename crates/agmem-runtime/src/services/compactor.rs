use agmem_index::Database;
use agmem_types::{Session, SummaryData, WeekKey, WeeklySummary};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};

use crate::{Error, Result};

/// Rolls one ISO week of a tool's sessions into per-directory summaries
pub struct SummaryCompactor<'a> {
    db: &'a Database,
}

#[derive(Default)]
struct Rollup {
    sessions: u64,
    total_time: f64,
    branches: BTreeSet<String>,
}

impl<'a> SummaryCompactor<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn compact(&self, year: i32, week: u32, cli_tool: &str) -> Result<Vec<WeeklySummary>> {
        self.compact_at(year, week, cli_tool, Utc::now())
    }

    /// Recompute and overwrite the week's rows. Only ended sessions count,
    /// so a second run without new activity stores identical values.
    pub fn compact_at(
        &self,
        year: i32,
        week: u32,
        cli_tool: &str,
        at: DateTime<Utc>,
    ) -> Result<Vec<WeeklySummary>> {
        let key = WeekKey::new(year, week)
            .ok_or_else(|| Error::InvalidInput(format!("no ISO week {} in {}", week, year)))?;
        let (from, to) = key
            .bounds()
            .ok_or_else(|| Error::InvalidInput(format!("week {}-W{:02} out of range", year, week)))?;

        let sessions = self.db.ended_sessions_between(cli_tool, &from, &to)?;
        let summaries = summarize(key, cli_tool, &sessions);

        self.db.store_weekly_summaries(&summaries, &at)?;
        tracing::info!(
            year,
            week,
            tool = cli_tool,
            sessions = sessions.len(),
            projects = summaries.len(),
            "weekly summary compacted"
        );

        Ok(summaries)
    }

    pub fn stored(&self, year: i32, week: u32, cli_tool: &str) -> Result<Vec<WeeklySummary>> {
        Ok(self.db.weekly_summaries(year, week, cli_tool)?)
    }
}

/// Group by working directory; `sessions` must come in a stable order
fn summarize(key: WeekKey, cli_tool: &str, sessions: &[Session]) -> Vec<WeeklySummary> {
    let mut rollups: BTreeMap<&str, Rollup> = BTreeMap::new();

    for session in sessions {
        let rollup = rollups.entry(session.working_dir.as_str()).or_default();
        rollup.sessions += 1;
        rollup.total_time += session.duration_seconds.unwrap_or(0.0);
        if let Some(branch) = &session.git_branch {
            rollup.branches.insert(branch.clone());
        }
    }

    rollups
        .into_iter()
        .map(|(project_path, rollup)| WeeklySummary {
            year: key.year,
            week_number: key.week,
            cli_tool: cli_tool.to_string(),
            project_path: project_path.to_string(),
            session_count: rollup.sessions,
            total_time_seconds: rollup.total_time,
            summary_data: SummaryData {
                branches_worked_on: rollup.branches.into_iter().collect(),
                unique_sessions: rollup.sessions,
                average_session_time: rollup.total_time / rollup.sessions as f64,
            },
        })
        .collect()
}
