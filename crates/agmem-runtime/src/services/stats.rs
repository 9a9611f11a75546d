use agmem_index::{Database, Error as IndexError};
use agmem_types::{
    FileActivity, Project, SearchHit, Session, SessionEvents, SessionState, Stats, TimelineBucket,
};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::{Config, Result};

const TOP_PROJECTS: usize = 10;
const ACTIVITY_DAYS: i64 = 7;
const SEARCH_LIMIT: usize = 10;

/// A session with its derived lifecycle state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    #[serde(flatten)]
    pub session: Session,
    pub state: SessionState,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSummary {
    #[serde(flatten)]
    pub project: Project,
    pub average_session_seconds: f64,
}

/// `session show` payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionDetail {
    #[serde(flatten)]
    pub view: SessionView,
    pub events: SessionEvents,
}

/// Read-only aggregates for `stats` and the dashboard queries
pub struct StatsService<'a> {
    db: &'a Database,
    stale_after: Duration,
}

impl<'a> StatsService<'a> {
    pub fn new(db: &'a Database, config: &Config) -> Self {
        Self {
            db,
            stale_after: config.stale_after(),
        }
    }

    /// Start of a window ending at `now`; windows reaching past the epoch start there
    fn window_start(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
        now.checked_sub_signed(window)
            .map_or(DateTime::<Utc>::UNIX_EPOCH, |start| start.max(DateTime::<Utc>::UNIX_EPOCH))
    }

    fn view(&self, session: Session, now: DateTime<Utc>) -> SessionView {
        let state = session.state(now, self.stale_after);
        SessionView { session, state }
    }

    pub fn stats(&self) -> Result<Stats> {
        self.stats_at(Utc::now())
    }

    /// Per-tool totals, sessions per day over the last week, busiest projects
    pub fn stats_at(&self, now: DateTime<Utc>) -> Result<Stats> {
        Ok(Stats {
            by_tool: self
                .db
                .tool_totals(&Self::window_start(now, self.stale_after))?,
            recent_activity: self
                .db
                .daily_activity(&Self::window_start(now, Duration::days(ACTIVITY_DAYS)))?,
            top_projects: self.db.top_projects(TOP_PROJECTS)?,
        })
    }

    pub fn recent_sessions(&self, limit: usize) -> Result<Vec<SessionView>> {
        let now = Utc::now();
        Ok(self
            .db
            .recent_sessions(limit)?
            .into_iter()
            .map(|session| self.view(session, now))
            .collect())
    }

    /// Sessions that were never ended and are past the staleness window
    pub fn stale_sessions_at(&self, now: DateTime<Utc>) -> Result<Vec<SessionView>> {
        let stale = self
            .db
            .open_sessions_before(&Self::window_start(now, self.stale_after))?;
        if !stale.is_empty() {
            tracing::warn!(count = stale.len(), "abandoned sessions found");
        }
        Ok(stale
            .into_iter()
            .map(|session| self.view(session, now))
            .collect())
    }

    pub fn stale_sessions(&self) -> Result<Vec<SessionView>> {
        self.stale_sessions_at(Utc::now())
    }

    pub fn session_detail(&self, session_id: &str) -> Result<SessionDetail> {
        let session = self
            .db
            .get_session(session_id)?
            .ok_or_else(|| IndexError::SessionNotFound(session_id.to_string()))?;

        Ok(SessionDetail {
            view: self.view(session, Utc::now()),
            events: self.db.session_events(session_id)?,
        })
    }

    pub fn projects(&self) -> Result<Vec<ProjectSummary>> {
        Ok(self
            .db
            .list_projects(None)?
            .into_iter()
            .map(|project| ProjectSummary {
                average_session_seconds: project.average_session_seconds(),
                project,
            })
            .collect())
    }

    /// Day × tool buckets for the last `days` days, newest first
    pub fn timeline(&self, days: u32) -> Result<Vec<TimelineBucket>> {
        self.timeline_at(Utc::now(), days)
    }

    pub fn timeline_at(&self, now: DateTime<Utc>, days: u32) -> Result<Vec<TimelineBucket>> {
        let window = Duration::try_days(i64::from(days)).unwrap_or(Duration::MAX);
        Ok(self.db.timeline(&Self::window_start(now, window))?)
    }

    pub fn top_files(&self, limit: usize) -> Result<Vec<FileActivity>> {
        Ok(self.db.top_files(limit)?)
    }

    pub fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        Ok(self.db.search(query, SEARCH_LIMIT)?)
    }
}
