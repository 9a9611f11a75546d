use agmem_types::{Project, format_timestamp, project_name_from_path};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::{count, sql_limit, ts};
use crate::Result;

const COLUMNS: &str =
    "id, project_path, project_name, session_count, total_time_seconds, last_session_id, updated_at";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        project_path: row.get(1)?,
        project_name: row.get(2)?,
        session_count: count(row, 3)?,
        total_time_seconds: row.get(4)?,
        last_session_id: row.get(5)?,
        updated_at: ts(row, 6)?,
    })
}

/// Count one more session for `project_path`, creating the project on first
/// sight. Single statement, so concurrent starts never lose an increment.
pub fn record_session_start(
    conn: &Connection,
    project_path: &str,
    session_id: &str,
    at: &DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO projects (project_path, project_name, session_count, total_time_seconds,
                              last_session_id, created_at, updated_at)
        VALUES (?1, ?2, 1, 0, ?3, ?4, ?4)
        ON CONFLICT(project_path) DO UPDATE SET
            session_count = session_count + 1,
            last_session_id = excluded.last_session_id,
            updated_at = excluded.updated_at
        "#,
        params![
            project_path,
            project_name_from_path(project_path),
            session_id,
            format_timestamp(at)
        ],
    )?;

    Ok(())
}

/// Add a finished session's duration to the project total
pub fn add_active_time(
    conn: &Connection,
    project_path: &str,
    seconds: f64,
    at: &DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        r#"
        UPDATE projects
        SET total_time_seconds = total_time_seconds + ?2,
            updated_at = ?3
        WHERE project_path = ?1
        "#,
        params![project_path, seconds, format_timestamp(at)],
    )?;

    Ok(())
}

pub fn get(conn: &Connection, project_path: &str) -> Result<Option<Project>> {
    let result = conn
        .query_row(
            &format!("SELECT {} FROM projects WHERE project_path = ?1", COLUMNS),
            [project_path],
            from_row,
        )
        .optional()?;

    Ok(result)
}

pub fn id_for_path(conn: &Connection, project_path: &str) -> Result<Option<i64>> {
    let id = conn
        .query_row(
            "SELECT id FROM projects WHERE project_path = ?1",
            [project_path],
            |row| row.get(0),
        )
        .optional()?;

    Ok(id)
}

/// All projects, most sessions first
pub fn list(conn: &Connection, limit: Option<usize>) -> Result<Vec<Project>> {
    let limit = limit.map(sql_limit).unwrap_or(-1);
    let mut stmt = conn.prepare(&format!(
        r#"
        SELECT {}
        FROM projects
        ORDER BY session_count DESC, project_path
        LIMIT ?1
        "#,
        COLUMNS
    ))?;

    let projects = stmt
        .query_map([limit], from_row)?
        .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;

    Ok(projects)
}
