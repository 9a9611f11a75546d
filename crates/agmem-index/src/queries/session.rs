use agmem_types::{Session, SessionId, format_timestamp};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::{opt_ts, sql_limit, ts};
use crate::{Error, Result, records::NewSession};

const COLUMNS: &str = "session_id, cli_tool, start_time, end_time, exit_code, working_dir, \
                       git_repo, git_branch, git_commit, duration_seconds";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Session> {
    let raw_id: String = row.get(0)?;
    let session_id = SessionId::parse(&raw_id).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Session {
        session_id,
        cli_tool: row.get(1)?,
        start_time: ts(row, 2)?,
        end_time: opt_ts(row, 3)?,
        exit_code: row.get(4)?,
        working_dir: row.get(5)?,
        git_repo: row.get(6)?,
        git_branch: row.get(7)?,
        git_commit: row.get(8)?,
        duration_seconds: row.get(9)?,
    })
}

pub fn insert(conn: &Connection, session: &NewSession) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO sessions (session_id, cli_tool, start_time, working_dir, git_repo, git_branch, git_commit)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
        params![
            session.session_id.as_str(),
            &session.cli_tool,
            format_timestamp(&session.start_time),
            &session.working_dir,
            &session.git.repo_root,
            &session.git.branch,
            &session.git.commit
        ],
    )?;

    Ok(())
}

/// Set end time, exit code and duration. Only touches sessions still in progress;
/// returns whether a row changed.
pub fn finish(
    conn: &Connection,
    session_id: &str,
    end_time: &DateTime<Utc>,
    exit_code: i32,
    duration_seconds: f64,
) -> Result<bool> {
    let changed = conn.execute(
        r#"
        UPDATE sessions
        SET end_time = ?2, exit_code = ?3, duration_seconds = ?4
        WHERE session_id = ?1 AND end_time IS NULL
        "#,
        params![
            session_id,
            format_timestamp(end_time),
            exit_code,
            duration_seconds
        ],
    )?;

    Ok(changed == 1)
}

pub fn get_by_id(conn: &Connection, session_id: &str) -> Result<Option<Session>> {
    let session = conn
        .query_row(
            &format!("SELECT {} FROM sessions WHERE session_id = ?1", COLUMNS),
            [session_id],
            from_row,
        )
        .optional()?;

    Ok(session)
}

pub fn require(conn: &Connection, session_id: &str) -> Result<Session> {
    get_by_id(conn, session_id)?.ok_or_else(|| Error::SessionNotFound(session_id.to_string()))
}

/// Sessions whose working directory equals `working_dir` exactly, newest first
pub fn list_for_dir(conn: &Connection, working_dir: &str, limit: usize) -> Result<Vec<Session>> {
    let mut stmt = conn.prepare(&format!(
        r#"
        SELECT {}
        FROM sessions
        WHERE working_dir = ?1
        ORDER BY start_time DESC, rowid DESC
        LIMIT ?2
        "#,
        COLUMNS
    ))?;

    let sessions = stmt
        .query_map(params![working_dir, sql_limit(limit)], from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(sessions)
}

/// Newest sessions across all directories
pub fn list_recent(conn: &Connection, limit: usize) -> Result<Vec<Session>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM recent_sessions ORDER BY start_time DESC LIMIT ?1",
        COLUMNS
    ))?;

    let sessions = stmt
        .query_map([sql_limit(limit)], from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(sessions)
}

/// Sessions without an end time that started before `started_before`
pub fn list_open_before(
    conn: &Connection,
    started_before: &DateTime<Utc>,
) -> Result<Vec<Session>> {
    let mut stmt = conn.prepare(&format!(
        r#"
        SELECT {}
        FROM sessions
        WHERE end_time IS NULL AND start_time < ?1
        ORDER BY start_time DESC
        "#,
        COLUMNS
    ))?;

    let sessions = stmt
        .query_map([format_timestamp(started_before)], from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(sessions)
}

/// Ended sessions of `cli_tool` that started in `[from, to)`, oldest first
pub fn list_ended_between(
    conn: &Connection,
    cli_tool: &str,
    from: &DateTime<Utc>,
    to: &DateTime<Utc>,
) -> Result<Vec<Session>> {
    let mut stmt = conn.prepare(&format!(
        r#"
        SELECT {}
        FROM sessions
        WHERE cli_tool = ?1
          AND start_time >= ?2
          AND start_time < ?3
          AND end_time IS NOT NULL
        ORDER BY start_time, session_id
        "#,
        COLUMNS
    ))?;

    let sessions = stmt
        .query_map(
            params![cli_tool, format_timestamp(from), format_timestamp(to)],
            from_row,
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(sessions)
}

/// Git root of the most recent session recorded for `working_dir`
pub fn latest_git_repo_for_dir(conn: &Connection, working_dir: &str) -> Result<Option<String>> {
    let repo: Option<Option<String>> = conn
        .query_row(
            r#"
            SELECT git_repo
            FROM sessions
            WHERE working_dir = ?1
            ORDER BY start_time DESC, rowid DESC
            LIMIT 1
            "#,
            [working_dir],
            |row| row.get(0),
        )
        .optional()?;

    Ok(repo.flatten())
}
