use agmem_types::{
    DailyActivity, FileActivity, KnowledgeEntry, NewKnowledge, Project,
    ProjectPattern, SearchHit, Session, SessionEvents, TimelineBucket, TopProject, ToolTotals,
    WeeklySummary, seconds_between,
};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::queries::{events, knowledge, pattern, project, session, stats, summary};
use crate::records::{NewCommand, NewContextNote, NewFileAction, NewPattern, NewSession};
use crate::{Error, Result, RetryPolicy, schema};

/// How a store is opened
#[derive(Debug, Clone)]
pub struct OpenOptions {
    /// SQLite waits this long for a lock before reporting `SQLITE_BUSY`
    pub busy_timeout: Duration,
    pub retry: RetryPolicy,
    /// Extra DDL run once when the store is created
    pub extra_schema: Option<String>,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_millis(5000),
            retry: RetryPolicy::default(),
            extra_schema: None,
        }
    }
}

/// Result of ending a session
#[derive(Debug, Clone)]
pub enum EndOutcome {
    /// The session was in progress and is now closed
    Ended(Session),
    /// The session had already been ended; nothing changed
    AlreadyEnded(Session),
}

impl EndOutcome {
    pub fn session(&self) -> &Session {
        match self {
            EndOutcome::Ended(session) | EndOutcome::AlreadyEnded(session) => session,
        }
    }
}

pub struct Database {
    conn: Connection,
    retry: RetryPolicy,
}

impl Database {
    pub fn open(db_path: &Path) -> Result<Self> {
        Self::open_with(db_path, &OpenOptions::default())
    }

    pub fn open_with(db_path: &Path, options: &OpenOptions) -> Result<Self> {
        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        conn.busy_timeout(options.busy_timeout)?;

        options
            .retry
            .run("pragmas", || schema::apply_pragmas(&conn))?;
        options.retry.run("init_schema", || {
            schema::init_schema(&conn, options.extra_schema.as_deref())
        })?;

        tracing::debug!(path = %db_path.display(), "opened store");

        Ok(Self {
            conn,
            retry: options.retry,
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::apply_pragmas(&conn)?;
        schema::init_schema(&conn, None)?;
        Ok(Self {
            conn,
            retry: RetryPolicy::none(),
        })
    }

    pub fn schema_version(&self) -> Result<i32> {
        schema::current_version(&self.conn)
    }

    /// Run `op` in one IMMEDIATE transaction, re-running it on lock contention
    fn write<T, F>(&self, label: &str, mut op: F) -> Result<T>
    where
        F: FnMut(&Connection) -> Result<T>,
    {
        self.retry.run(label, || {
            let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
            let value = op(&tx)?;
            tx.commit()?;
            Ok(value)
        })
    }

    // ------------------------------------------------------------------
    // Sessions
    // ------------------------------------------------------------------

    /// Insert the session and, inside a git checkout, count it against the project
    pub fn start_session(&self, new: &NewSession) -> Result<()> {
        self.write("start_session", |conn| {
            session::insert(conn, new)?;
            if let Some(repo) = &new.git.repo_root {
                project::record_session_start(conn, repo, new.session_id.as_str(), &new.start_time)?;
            }
            Ok(())
        })
    }

    /// Close a session. Ending twice leaves the first end untouched.
    pub fn end_session(
        &self,
        session_id: &str,
        exit_code: i32,
        at: &DateTime<Utc>,
    ) -> Result<EndOutcome> {
        self.write("end_session", |conn| {
            let existing = session::require(conn, session_id)?;
            if existing.is_ended() {
                return Ok(EndOutcome::AlreadyEnded(existing));
            }

            // Clock skew between processes must not produce end < start
            let end_time = (*at).max(existing.start_time);
            let duration = seconds_between(&existing.start_time, &end_time);

            session::finish(conn, session_id, &end_time, exit_code, duration)?;
            if let Some(repo) = &existing.git_repo {
                project::add_active_time(conn, repo, duration, &end_time)?;
            }

            let ended = session::require(conn, session_id)?;
            Ok(EndOutcome::Ended(ended))
        })
    }

    pub fn get_session(&self, session_id: &str) -> Result<Option<Session>> {
        session::get_by_id(&self.conn, session_id)
    }

    pub fn sessions_for_dir(&self, working_dir: &str, limit: usize) -> Result<Vec<Session>> {
        session::list_for_dir(&self.conn, working_dir, limit)
    }

    pub fn recent_sessions(&self, limit: usize) -> Result<Vec<Session>> {
        session::list_recent(&self.conn, limit)
    }

    pub fn open_sessions_before(&self, started_before: &DateTime<Utc>) -> Result<Vec<Session>> {
        session::list_open_before(&self.conn, started_before)
    }

    pub fn ended_sessions_between(
        &self,
        cli_tool: &str,
        from: &DateTime<Utc>,
        to: &DateTime<Utc>,
    ) -> Result<Vec<Session>> {
        session::list_ended_between(&self.conn, cli_tool, from, to)
    }

    pub fn latest_git_repo_for_dir(&self, working_dir: &str) -> Result<Option<String>> {
        session::latest_git_repo_for_dir(&self.conn, working_dir)
    }

    // ------------------------------------------------------------------
    // Session events
    // ------------------------------------------------------------------

    pub fn append_context(&self, note: &NewContextNote) -> Result<i64> {
        self.write("append_context", |conn| {
            session::require(conn, &note.session_id)?;
            events::append_context(conn, note)
        })
    }

    pub fn append_file_action(&self, action: &NewFileAction) -> Result<i64> {
        self.write("append_file_action", |conn| {
            session::require(conn, &action.session_id)?;
            events::append_file_action(conn, action)
        })
    }

    pub fn append_command(&self, command: &NewCommand) -> Result<i64> {
        self.write("append_command", |conn| {
            session::require(conn, &command.session_id)?;
            events::append_command(conn, command)
        })
    }

    pub fn session_events(&self, session_id: &str) -> Result<SessionEvents> {
        Ok(SessionEvents {
            context: events::context_for_session(&self.conn, session_id)?,
            files: events::files_for_session(&self.conn, session_id)?,
            commands: events::commands_for_session(&self.conn, session_id)?,
        })
    }

    // ------------------------------------------------------------------
    // Projects and patterns
    // ------------------------------------------------------------------

    pub fn get_project(&self, project_path: &str) -> Result<Option<Project>> {
        project::get(&self.conn, project_path)
    }

    pub fn list_projects(&self, limit: Option<usize>) -> Result<Vec<Project>> {
        project::list(&self.conn, limit)
    }

    pub fn record_pattern(&self, new: &NewPattern) -> Result<()> {
        self.write("record_pattern", |conn| pattern::record(conn, new))
    }

    pub fn patterns_for_project(&self, project_path: &str) -> Result<Vec<ProjectPattern>> {
        pattern::for_project(&self.conn, project_path)
    }

    // ------------------------------------------------------------------
    // Knowledge
    // ------------------------------------------------------------------

    /// Insert or bump an entry and return it as stored after the write
    pub fn upsert_knowledge(
        &self,
        entry: &NewKnowledge,
        at: &DateTime<Utc>,
    ) -> Result<KnowledgeEntry> {
        self.write("upsert_knowledge", |conn| {
            let id = knowledge::upsert(conn, entry, at)?;
            knowledge::get_by_id(conn, id)?
                .ok_or_else(|| Error::Query(format!("knowledge entry {} vanished", id)))
        })
    }

    pub fn get_knowledge(&self, title: &str) -> Result<Option<KnowledgeEntry>> {
        knowledge::get_by_title(&self.conn, title)
    }

    /// Ranked by frequency, then recency
    pub fn list_knowledge(
        &self,
        category: Option<&str>,
        limit: usize,
    ) -> Result<Vec<KnowledgeEntry>> {
        knowledge::list(&self.conn, category, limit)
    }

    // ------------------------------------------------------------------
    // Weekly summaries
    // ------------------------------------------------------------------

    /// Store all rows for one week in a single transaction
    pub fn store_weekly_summaries(
        &self,
        summaries: &[WeeklySummary],
        at: &DateTime<Utc>,
    ) -> Result<()> {
        self.write("store_weekly_summaries", |conn| {
            for row in summaries {
                summary::upsert(conn, row, at)?;
            }
            Ok(())
        })
    }

    pub fn weekly_summaries(
        &self,
        year: i32,
        week_number: u32,
        cli_tool: &str,
    ) -> Result<Vec<WeeklySummary>> {
        summary::list(&self.conn, year, week_number, cli_tool)
    }

    // ------------------------------------------------------------------
    // Aggregates
    // ------------------------------------------------------------------

    pub fn tool_totals(&self, stale_before: &DateTime<Utc>) -> Result<BTreeMap<String, ToolTotals>> {
        stats::tool_totals(&self.conn, stale_before)
    }

    pub fn daily_activity(&self, since: &DateTime<Utc>) -> Result<Vec<DailyActivity>> {
        stats::daily_activity(&self.conn, since)
    }

    pub fn top_projects(&self, limit: usize) -> Result<Vec<TopProject>> {
        stats::top_projects(&self.conn, limit)
    }

    pub fn timeline(&self, since: &DateTime<Utc>) -> Result<Vec<TimelineBucket>> {
        stats::timeline(&self.conn, since)
    }

    pub fn top_files(&self, limit: usize) -> Result<Vec<FileActivity>> {
        stats::top_files(&self.conn, limit)
    }

    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        stats::search(&self.conn, query, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agmem_types::{FileActionKind, GitContext, Payload, SessionId, parse_timestamp};

    fn at(raw: &str) -> DateTime<Utc> {
        parse_timestamp(raw).unwrap()
    }

    fn new_session(id: &str, start: &str, dir: &str, repo: Option<&str>) -> NewSession {
        NewSession {
            session_id: SessionId::parse(id).unwrap(),
            cli_tool: "claude".to_string(),
            start_time: at(start),
            working_dir: dir.to_string(),
            git: GitContext {
                repo_root: repo.map(str::to_string),
                branch: repo.map(|_| "main".to_string()),
                commit: None,
            },
        }
    }

    #[test]
    fn test_open_in_memory_is_current() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.schema_version().unwrap(), schema::SCHEMA_VERSION);
    }

    #[test]
    fn test_open_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("memory.db");

        let db = Database::open(&path).unwrap();
        drop(db);

        assert!(path.exists());
    }

    #[test]
    fn test_start_and_end_session() {
        let db = Database::open_in_memory().unwrap();
        db.start_session(&new_session(
            "00000000000000a1",
            "2025-06-02T10:00:00Z",
            "/work/app",
            Some("/work/app"),
        ))
        .unwrap();

        let outcome = db
            .end_session("00000000000000a1", 0, &at("2025-06-02T10:30:00Z"))
            .unwrap();

        let EndOutcome::Ended(session) = outcome else {
            panic!("expected Ended");
        };
        assert_eq!(session.exit_code, Some(0));
        assert_eq!(session.duration_seconds, Some(1800.0));

        let project = db.get_project("/work/app").unwrap().unwrap();
        assert_eq!(project.session_count, 1);
        assert_eq!(project.total_time_seconds, 1800.0);
        assert_eq!(project.project_name, "app");
    }

    #[test]
    fn test_end_twice_keeps_first_end() {
        let db = Database::open_in_memory().unwrap();
        db.start_session(&new_session(
            "00000000000000a2",
            "2025-06-02T10:00:00Z",
            "/work/app",
            Some("/work/app"),
        ))
        .unwrap();

        db.end_session("00000000000000a2", 0, &at("2025-06-02T10:10:00Z"))
            .unwrap();
        let second = db
            .end_session("00000000000000a2", 3, &at("2025-06-02T11:00:00Z"))
            .unwrap();

        assert!(matches!(second, EndOutcome::AlreadyEnded(_)));
        assert_eq!(second.session().exit_code, Some(0));
        assert_eq!(second.session().duration_seconds, Some(600.0));

        let project = db.get_project("/work/app").unwrap().unwrap();
        assert_eq!(project.total_time_seconds, 600.0);
    }

    #[test]
    fn test_end_unknown_session() {
        let db = Database::open_in_memory().unwrap();
        let err = db
            .end_session("ffffffffffffffff", 0, &at("2025-06-02T10:00:00Z"))
            .unwrap_err();
        assert!(matches!(err, Error::SessionNotFound(id) if id == "ffffffffffffffff"));
    }

    #[test]
    fn test_end_before_start_clamps_to_zero() {
        let db = Database::open_in_memory().unwrap();
        db.start_session(&new_session(
            "00000000000000a3",
            "2025-06-02T10:00:00Z",
            "/tmp/scratch",
            None,
        ))
        .unwrap();

        let outcome = db
            .end_session("00000000000000a3", 1, &at("2025-06-02T09:59:00Z"))
            .unwrap();

        assert_eq!(outcome.session().duration_seconds, Some(0.0));
        assert_eq!(outcome.session().end_time, Some(at("2025-06-02T10:00:00Z")));
    }

    #[test]
    fn test_session_outside_git_has_no_project() {
        let db = Database::open_in_memory().unwrap();
        db.start_session(&new_session(
            "00000000000000a4",
            "2025-06-02T10:00:00Z",
            "/tmp/scratch",
            None,
        ))
        .unwrap();

        assert!(db.list_projects(None).unwrap().is_empty());
    }

    #[test]
    fn test_events_require_known_session() {
        let db = Database::open_in_memory().unwrap();
        let note = NewContextNote {
            session_id: "0000000000000000".to_string(),
            context_type: "task".to_string(),
            data: Payload::new().with("description", "x"),
            timestamp: at("2025-06-02T10:00:00Z"),
        };

        let err = db.append_context(&note).unwrap_err();
        assert!(matches!(err, Error::SessionNotFound(_)));
    }

    #[test]
    fn test_session_events_in_insert_order() {
        let db = Database::open_in_memory().unwrap();
        db.start_session(&new_session(
            "00000000000000a5",
            "2025-06-02T10:00:00Z",
            "/work/app",
            None,
        ))
        .unwrap();

        db.append_file_action(&NewFileAction {
            session_id: "00000000000000a5".to_string(),
            file_path: "src/main.rs".to_string(),
            action: FileActionKind::Edit,
            language: Some("rust".to_string()),
            lines_added: 10,
            lines_removed: 2,
            timestamp: at("2025-06-02T10:01:00Z"),
        })
        .unwrap();
        db.append_command(&NewCommand {
            session_id: "00000000000000a5".to_string(),
            command: "cargo test".to_string(),
            exit_code: 101,
            output_summary: Some("1 failed".to_string()),
            timestamp: at("2025-06-02T10:02:00Z"),
        })
        .unwrap();
        for step in ["first", "second"] {
            db.append_context(&NewContextNote {
                session_id: "00000000000000a5".to_string(),
                context_type: "decision".to_string(),
                data: Payload::new().with("decision", step),
                timestamp: at("2025-06-02T10:03:00Z"),
            })
            .unwrap();
        }

        let events = db.session_events("00000000000000a5").unwrap();
        assert_eq!(events.files.len(), 1);
        assert_eq!(events.files[0].action, FileActionKind::Edit);
        assert_eq!(events.commands[0].exit_code, 101);
        assert_eq!(events.context.len(), 2);
        assert_eq!(
            events.context[0].data.get("decision"),
            Some(&serde_json::json!("first"))
        );
    }

    #[test]
    fn test_knowledge_frequency_and_sources() {
        let db = Database::open_in_memory().unwrap();
        let entry = |session: Option<&str>| NewKnowledge {
            category: "solution".to_string(),
            title: "Fix flaky WAL test".to_string(),
            description: "Set busy_timeout before pragmas".to_string(),
            context: None,
            source_session: session.map(str::to_string),
        };

        db.upsert_knowledge(&entry(Some("s1")), &at("2025-06-02T10:00:00Z"))
            .unwrap();
        db.upsert_knowledge(&entry(Some("s2")), &at("2025-06-03T10:00:00Z"))
            .unwrap();
        let stored = db
            .upsert_knowledge(&entry(Some("s1")), &at("2025-06-04T10:00:00Z"))
            .unwrap();

        assert_eq!(stored.frequency, 3);
        assert_eq!(stored.last_used, at("2025-06-04T10:00:00Z"));
        assert_eq!(stored.origin_session.as_deref(), Some("s1"));
        assert_eq!(stored.source_sessions, vec!["s1", "s2"]);
    }

    #[test]
    fn test_knowledge_last_used_is_latest_call() {
        let db = Database::open_in_memory().unwrap();
        let entry = |session: Option<&str>| NewKnowledge {
            category: "solution".to_string(),
            title: "Pin the toolchain".to_string(),
            description: "rust-toolchain.toml".to_string(),
            context: None,
            source_session: session.map(str::to_string),
        };

        db.upsert_knowledge(&entry(None), &at("2025-06-05T10:00:00Z"))
            .unwrap();
        // Clock went backwards between the two submissions
        let stored = db
            .upsert_knowledge(&entry(Some("s2")), &at("2025-06-04T10:00:00Z"))
            .unwrap();

        assert_eq!(stored.frequency, 2);
        assert_eq!(stored.last_used, at("2025-06-04T10:00:00Z"));
        assert_eq!(stored.origin_session.as_deref(), Some("s2"));
        assert_eq!(stored.source_sessions, vec!["s2"]);

        let stored = db
            .upsert_knowledge(&entry(Some("s3")), &at("2025-06-06T10:00:00Z"))
            .unwrap();
        assert_eq!(stored.origin_session.as_deref(), Some("s2"));
        assert_eq!(stored.source_sessions, vec!["s2", "s3"]);
    }

    #[test]
    fn test_huge_limits_return_everything() {
        let db = Database::open_in_memory().unwrap();
        for (id, start) in [
            ("00000000000000a1", "2025-06-02T10:00:00Z"),
            ("00000000000000a2", "2025-06-02T11:00:00Z"),
        ] {
            db.start_session(&new_session(id, start, "/work/app", Some("/work/app")))
                .unwrap();
        }

        assert_eq!(db.sessions_for_dir("/work/app", usize::MAX).unwrap().len(), 2);
        assert_eq!(db.recent_sessions(usize::MAX).unwrap().len(), 2);
        assert_eq!(db.top_projects(usize::MAX).unwrap().len(), 1);
        assert_eq!(db.list_projects(Some(usize::MAX)).unwrap().len(), 1);
        assert!(db.list_knowledge(None, usize::MAX).unwrap().is_empty());
        assert!(db.top_files(usize::MAX).unwrap().is_empty());
    }

    #[test]
    fn test_pattern_for_unknown_project() {
        let db = Database::open_in_memory().unwrap();
        let err = db
            .record_pattern(&NewPattern {
                project_path: "/nowhere".to_string(),
                pattern_type: "build".to_string(),
                pattern: "cargo build".to_string(),
                confidence: 0.8,
                seen_at: at("2025-06-02T10:00:00Z"),
            })
            .unwrap_err();
        assert!(matches!(err, Error::Query(_)));
    }

    #[test]
    fn test_tool_totals_counts_abandoned() {
        let db = Database::open_in_memory().unwrap();
        db.start_session(&new_session(
            "00000000000000b1",
            "2025-06-01T08:00:00Z",
            "/a",
            None,
        ))
        .unwrap();
        db.start_session(&new_session(
            "00000000000000b2",
            "2025-06-02T09:00:00Z",
            "/a",
            None,
        ))
        .unwrap();
        db.end_session("00000000000000b2", 0, &at("2025-06-02T09:01:00Z"))
            .unwrap();

        let totals = db.tool_totals(&at("2025-06-02T00:00:00Z")).unwrap();
        let claude = &totals["claude"];
        assert_eq!(claude.sessions, 2);
        assert_eq!(claude.total_time, 60.0);
        assert_eq!(claude.abandoned, 1);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_knowledge(
            &NewKnowledge {
                category: "pattern".to_string(),
                title: "Use WAL mode".to_string(),
                description: "Readers never block the writer".to_string(),
                ..Default::default()
            },
            &at("2025-06-02T10:00:00Z"),
        )
        .unwrap();

        let hits = db.search("wal", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert!(matches!(&hits[0], SearchHit::Knowledge { title, .. } if title == "Use WAL mode"));
    }

    #[test]
    fn test_search_folds_non_ascii_case() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_knowledge(
            &NewKnowledge {
                category: "i18n".to_string(),
                title: "Ärger mit Umlauten".to_string(),
                description: "Normalize before comparing".to_string(),
                ..Default::default()
            },
            &at("2025-06-02T10:00:00Z"),
        )
        .unwrap();
        db.start_session(&new_session("0123456789abcdef", "2025-06-02T10:00:00Z", "/tmp", None))
            .unwrap();
        db.append_context(&NewContextNote {
            session_id: "0123456789abcdef".to_string(),
            context_type: "decision".to_string(),
            data: Payload::new().with("decision", "Keep the ÉCRAN layout"),
            timestamp: at("2025-06-02T10:05:00Z"),
        })
        .unwrap();

        let hits = db.search("ärger", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert!(matches!(&hits[0], SearchHit::Knowledge { title, .. } if title == "Ärger mit Umlauten"));

        let hits = db.search("écran", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert!(matches!(&hits[0], SearchHit::Context { context_type, .. } if context_type == "decision"));
    }

    #[test]
    fn test_search_limit_applies_per_group() {
        let db = Database::open_in_memory().unwrap();
        for n in 0..3 {
            db.upsert_knowledge(
                &NewKnowledge {
                    category: "pattern".to_string(),
                    title: format!("retry note {}", n),
                    description: "busy".to_string(),
                    ..Default::default()
                },
                &at("2025-06-02T10:00:00Z"),
            )
            .unwrap();
        }

        assert_eq!(db.search("retry", 2).unwrap().len(), 2);
        assert!(db.search("retry", 0).unwrap().is_empty());
    }
}
