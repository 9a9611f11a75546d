use agmem_core::{GitProbe, generate_session_id};
use agmem_index::{Database, EndOutcome, NewCommand, NewContextNote, NewFileAction, NewSession};
use agmem_types::{FileActionKind, Payload, SessionId};
use chrono::{DateTime, Utc};
use std::path::Path;

use crate::{Error, Result};

/// Session lifecycle and append-only event logging
pub struct SessionRecorder<'a> {
    db: &'a Database,
    git: &'a dyn GitProbe,
}

/// One file touched during a session
#[derive(Debug, Clone)]
pub struct FileChange {
    pub file_path: String,
    pub action: FileActionKind,
    pub language: Option<String>,
    pub lines_added: u64,
    pub lines_removed: u64,
}

impl<'a> SessionRecorder<'a> {
    pub fn new(db: &'a Database, git: &'a dyn GitProbe) -> Self {
        Self { db, git }
    }

    pub fn start(&self, tool: &str, cwd: &Path) -> Result<SessionId> {
        self.start_at(tool, cwd, Utc::now(), std::process::id())
    }

    /// Record a new session for `tool` launched in `cwd`.
    ///
    /// Git metadata is best-effort; only a storage failure makes this fail.
    pub fn start_at(
        &self,
        tool: &str,
        cwd: &Path,
        at: DateTime<Utc>,
        pid: u32,
    ) -> Result<SessionId> {
        let tool = tool.trim();
        if tool.is_empty() {
            return Err(Error::InvalidInput("tool name must not be empty".to_string()));
        }

        let git = self.git.probe(cwd);
        if git.repo_root.is_none() {
            tracing::debug!(cwd = %cwd.display(), "no git repository, project not tracked");
        }

        let session_id = generate_session_id(tool, &at, pid);
        self.db.start_session(&NewSession {
            session_id: session_id.clone(),
            cli_tool: tool.to_string(),
            start_time: at,
            working_dir: cwd.display().to_string(),
            git,
        })?;

        tracing::info!(session = %session_id, tool, "session started");
        Ok(session_id)
    }

    pub fn end(&self, session_id: &str, exit_code: i32) -> Result<EndOutcome> {
        self.end_at(session_id, exit_code, Utc::now())
    }

    /// Close a session. Unknown ids fail; ending twice is a no-op.
    pub fn end_at(&self, session_id: &str, exit_code: i32, at: DateTime<Utc>) -> Result<EndOutcome> {
        let outcome = self.db.end_session(session_id, exit_code, &at)?;

        match &outcome {
            EndOutcome::Ended(session) => tracing::info!(
                session = session_id,
                duration = session.duration_seconds,
                "session ended"
            ),
            EndOutcome::AlreadyEnded(_) => {
                tracing::warn!(session = session_id, "session already ended, ignoring")
            }
        }

        Ok(outcome)
    }

    pub fn log_context(&self, session_id: &str, context_type: &str, data: Payload) -> Result<i64> {
        if context_type.trim().is_empty() {
            return Err(Error::InvalidInput("context type must not be empty".to_string()));
        }

        let id = self.db.append_context(&NewContextNote {
            session_id: session_id.to_string(),
            context_type: context_type.to_string(),
            data,
            timestamp: Utc::now(),
        })?;
        Ok(id)
    }

    pub fn log_file_action(&self, session_id: &str, change: FileChange) -> Result<i64> {
        let id = self.db.append_file_action(&NewFileAction {
            session_id: session_id.to_string(),
            file_path: change.file_path,
            action: change.action,
            language: change.language,
            lines_added: change.lines_added,
            lines_removed: change.lines_removed,
            timestamp: Utc::now(),
        })?;
        Ok(id)
    }

    pub fn log_command(
        &self,
        session_id: &str,
        command: &str,
        exit_code: i32,
        output_summary: Option<String>,
    ) -> Result<i64> {
        let id = self.db.append_command(&NewCommand {
            session_id: session_id.to_string(),
            command: command.to_string(),
            exit_code,
            output_summary,
            timestamp: Utc::now(),
        })?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agmem_core::{NoGit, StaticGit};
    use agmem_types::{GitContext, parse_timestamp};

    fn at(raw: &str) -> DateTime<Utc> {
        parse_timestamp(raw).unwrap()
    }

    fn checkout() -> StaticGit {
        StaticGit(GitContext {
            repo_root: Some("/work/app".to_string()),
            branch: Some("main".to_string()),
            commit: Some("abc123".to_string()),
        })
    }

    #[test]
    fn test_start_inside_checkout_captures_git() {
        let db = Database::open_in_memory().unwrap();
        let git = checkout();
        let recorder = SessionRecorder::new(&db, &git);

        let id = recorder
            .start_at("claude", Path::new("/work/app/src"), at("2025-06-02T10:00:00Z"), 42)
            .unwrap();

        let session = db.get_session(id.as_str()).unwrap().unwrap();
        assert_eq!(session.cli_tool, "claude");
        assert_eq!(session.working_dir, "/work/app/src");
        assert_eq!(session.git_branch.as_deref(), Some("main"));
        assert_eq!(session.git_commit.as_deref(), Some("abc123"));
        assert_eq!(session.end_time, None);

        let project = db.get_project("/work/app").unwrap().unwrap();
        assert_eq!(project.session_count, 1);
        assert_eq!(project.last_session_id.as_deref(), Some(id.as_str()));
    }

    #[test]
    fn test_start_outside_checkout_leaves_git_null() {
        let db = Database::open_in_memory().unwrap();
        let recorder = SessionRecorder::new(&db, &NoGit);

        let id = recorder
            .start_at("claude", Path::new("/tmp"), at("2025-06-02T10:00:00Z"), 42)
            .unwrap();

        let session = db.get_session(id.as_str()).unwrap().unwrap();
        assert_eq!(session.git_repo, None);
        assert_eq!(session.git_branch, None);
        assert_eq!(session.git_commit, None);
        assert!(db.list_projects(None).unwrap().is_empty());
    }

    #[test]
    fn test_ids_differ_by_pid() {
        let db = Database::open_in_memory().unwrap();
        let recorder = SessionRecorder::new(&db, &NoGit);
        let now = at("2025-06-02T10:00:00Z");

        let a = recorder.start_at("claude", Path::new("/tmp"), now, 1).unwrap();
        let b = recorder.start_at("claude", Path::new("/tmp"), now, 2).unwrap();

        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), SessionId::WIDTH);
    }

    #[test]
    fn test_empty_tool_rejected() {
        let db = Database::open_in_memory().unwrap();
        let recorder = SessionRecorder::new(&db, &NoGit);

        let err = recorder.start(" ", Path::new("/tmp")).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_end_computes_duration_and_project_time() {
        let db = Database::open_in_memory().unwrap();
        let git = checkout();
        let recorder = SessionRecorder::new(&db, &git);

        let id = recorder
            .start_at("claude", Path::new("/work/app"), at("2025-06-02T10:00:00.250000Z"), 7)
            .unwrap();
        let outcome = recorder
            .end_at(id.as_str(), 2, at("2025-06-02T10:05:00.750000Z"))
            .unwrap();

        let session = outcome.session();
        assert_eq!(session.exit_code, Some(2));
        assert_eq!(session.duration_seconds, Some(300.5));

        let project = db.get_project("/work/app").unwrap().unwrap();
        assert_eq!(project.total_time_seconds, 300.5);
    }

    #[test]
    fn test_end_unknown_session_is_reported() {
        let db = Database::open_in_memory().unwrap();
        let recorder = SessionRecorder::new(&db, &NoGit);

        let err = recorder.end("0123456789abcdef", 0).unwrap_err();
        assert!(err.is_session_not_found());
    }

    #[test]
    fn test_log_events() {
        let db = Database::open_in_memory().unwrap();
        let recorder = SessionRecorder::new(&db, &NoGit);
        let id = recorder.start("codex", Path::new("/tmp")).unwrap();

        recorder
            .log_context(
                id.as_str(),
                "task",
                Payload::new().with("description", "add retry").with("status", "done"),
            )
            .unwrap();
        recorder
            .log_file_action(
                id.as_str(),
                FileChange {
                    file_path: "src/db.rs".to_string(),
                    action: FileActionKind::Edit,
                    language: Some("rust".to_string()),
                    lines_added: 12,
                    lines_removed: 3,
                },
            )
            .unwrap();
        recorder
            .log_command(id.as_str(), "cargo test", 0, None)
            .unwrap();

        let events = db.session_events(id.as_str()).unwrap();
        assert_eq!(events.context.len(), 1);
        assert_eq!(events.context[0].context_type, "task");
        assert_eq!(events.files[0].lines_added, 12);
        assert_eq!(events.commands[0].command, "cargo test");
    }
}
