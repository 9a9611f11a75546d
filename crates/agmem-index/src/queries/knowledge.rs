use agmem_types::{KnowledgeEntry, NewKnowledge, format_timestamp};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::{count, opt_payload, sql_limit, ts};
use crate::Result;

const COLUMNS: &str = "id, category, title, description, context, frequency, last_used, origin_session, created_at";

fn from_row(row: &Row<'_>) -> rusqlite::Result<KnowledgeEntry> {
    Ok(KnowledgeEntry {
        id: row.get(0)?,
        category: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        context: opt_payload(row, 4)?,
        frequency: count(row, 5)?,
        last_used: ts(row, 6)?,
        origin_session: row.get(7)?,
        source_sessions: Vec::new(),
        created_at: ts(row, 8)?,
    })
}

/// Insert a new entry with frequency 1, or bump frequency and set `last_used`
/// of the entry with the same title to `at`. Category, description and
/// context of the first submission are kept; `origin_session` is the first
/// session that submitted it. Returns the entry id.
pub fn upsert(conn: &Connection, entry: &NewKnowledge, at: &DateTime<Utc>) -> Result<i64> {
    let now = format_timestamp(at);
    let context = entry.context.as_ref().map(|c| c.to_json());

    let id: i64 = conn.query_row(
        r#"
        INSERT INTO knowledge_base (category, title, description, context, frequency,
                                    last_used, origin_session, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, 1, ?5, ?6, ?5, ?5)
        ON CONFLICT(title) DO UPDATE SET
            frequency = frequency + 1,
            last_used = excluded.last_used,
            origin_session = COALESCE(origin_session, excluded.origin_session),
            updated_at = excluded.updated_at
        RETURNING id
        "#,
        params![
            &entry.category,
            &entry.title,
            &entry.description,
            context,
            &now,
            &entry.source_session
        ],
        |row| row.get(0),
    )?;

    if let Some(session_id) = &entry.source_session {
        conn.execute(
            r#"
            INSERT OR IGNORE INTO knowledge_sources (knowledge_id, session_id, added_at)
            VALUES (?1, ?2, ?3)
            "#,
            params![id, session_id, &now],
        )?;
    }

    Ok(id)
}

fn sources(conn: &Connection, knowledge_id: i64) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT session_id
        FROM knowledge_sources
        WHERE knowledge_id = ?1
        ORDER BY rowid
        "#,
    )?;

    let ids = stmt
        .query_map([knowledge_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;

    Ok(ids)
}

fn with_sources(conn: &Connection, mut entries: Vec<KnowledgeEntry>) -> Result<Vec<KnowledgeEntry>> {
    for entry in &mut entries {
        entry.source_sessions = sources(conn, entry.id)?;
    }
    Ok(entries)
}

pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<KnowledgeEntry>> {
    let entry = conn
        .query_row(
            &format!("SELECT {} FROM knowledge_base WHERE id = ?1", COLUMNS),
            [id],
            from_row,
        )
        .optional()?;

    Ok(with_sources(conn, entry.into_iter().collect())?.pop())
}

pub fn get_by_title(conn: &Connection, title: &str) -> Result<Option<KnowledgeEntry>> {
    let entry = conn
        .query_row(
            &format!("SELECT {} FROM knowledge_base WHERE title = ?1", COLUMNS),
            [title],
            from_row,
        )
        .optional()?;

    Ok(with_sources(conn, entry.into_iter().collect())?.pop())
}

/// Most frequent first, ties broken by most recently used
pub fn list(conn: &Connection, category: Option<&str>, limit: usize) -> Result<Vec<KnowledgeEntry>> {
    let mut stmt = conn.prepare(&format!(
        r#"
        SELECT {}
        FROM knowledge_base
        WHERE (?1 IS NULL OR category = ?1)
        ORDER BY frequency DESC, last_used DESC, id
        LIMIT ?2
        "#,
        COLUMNS
    ))?;

    let entries = stmt
        .query_map(params![category, sql_limit(limit)], from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    with_sources(conn, entries)
}
