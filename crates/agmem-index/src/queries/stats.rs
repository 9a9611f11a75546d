use agmem_types::{
    DailyActivity, FileActivity, Payload, SearchHit, TimelineBucket, TopProject, ToolTotals,
    format_timestamp,
};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::collections::BTreeMap;

use super::{count, sql_limit};
use crate::Result;

/// Session count and total duration per tool; `abandoned` counts sessions
/// without end time that started before `stale_before`
pub fn tool_totals(
    conn: &Connection,
    stale_before: &DateTime<Utc>,
) -> Result<BTreeMap<String, ToolTotals>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT cli_tool,
               COUNT(*),
               COALESCE(SUM(duration_seconds), 0),
               SUM(CASE WHEN end_time IS NULL AND start_time < ?1 THEN 1 ELSE 0 END)
        FROM sessions
        GROUP BY cli_tool
        ORDER BY cli_tool
        "#,
    )?;

    let rows = stmt.query_map([format_timestamp(stale_before)], |row| {
        Ok((
            row.get::<_, String>(0)?,
            ToolTotals {
                sessions: count(row, 1)?,
                total_time: row.get(2)?,
                abandoned: count(row, 3)?,
            },
        ))
    })?;

    let mut totals = BTreeMap::new();
    for row in rows {
        let (tool, tool_totals) = row?;
        totals.insert(tool, tool_totals);
    }
    Ok(totals)
}

/// Sessions started per UTC day since `since`, oldest day first
pub fn daily_activity(conn: &Connection, since: &DateTime<Utc>) -> Result<Vec<DailyActivity>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT substr(start_time, 1, 10) AS day, COUNT(*)
        FROM sessions
        WHERE start_time >= ?1
        GROUP BY day
        ORDER BY day
        "#,
    )?;

    let days = stmt
        .query_map([format_timestamp(since)], |row| {
            Ok(DailyActivity {
                date: row.get(0)?,
                sessions: count(row, 1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(days)
}

pub fn top_projects(conn: &Connection, limit: usize) -> Result<Vec<TopProject>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT project_path, project_name, session_count, total_time_seconds
        FROM projects
        ORDER BY session_count DESC, project_path
        LIMIT ?1
        "#,
    )?;

    let projects = stmt
        .query_map([sql_limit(limit)], |row| {
            Ok(TopProject {
                path: row.get(0)?,
                name: row.get(1)?,
                sessions: count(row, 2)?,
                time: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(projects)
}

/// Day × tool buckets since `since`, newest day first
pub fn timeline(conn: &Connection, since: &DateTime<Utc>) -> Result<Vec<TimelineBucket>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT substr(start_time, 1, 10) AS day,
               cli_tool,
               COUNT(*),
               COALESCE(SUM(duration_seconds), 0)
        FROM sessions
        WHERE start_time >= ?1
        GROUP BY day, cli_tool
        ORDER BY day DESC, cli_tool
        "#,
    )?;

    let buckets = stmt
        .query_map([format_timestamp(since)], |row| {
            Ok(TimelineBucket {
                date: row.get(0)?,
                cli_tool: row.get(1)?,
                sessions: count(row, 2)?,
                total_time: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(buckets)
}

/// Most frequently touched files
pub fn top_files(conn: &Connection, limit: usize) -> Result<Vec<FileActivity>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT file_path,
               MAX(language),
               COUNT(*) AS modifications,
               COALESCE(SUM(lines_added), 0),
               COALESCE(SUM(lines_removed), 0)
        FROM session_files
        GROUP BY file_path
        ORDER BY modifications DESC, file_path
        LIMIT ?1
        "#,
    )?;

    let files = stmt
        .query_map([sql_limit(limit)], |row| {
            Ok(FileActivity {
                file_path: row.get(0)?,
                language: row.get(1)?,
                modifications: count(row, 2)?,
                total_added: count(row, 3)?,
                total_removed: count(row, 4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(files)
}

/// Case-insensitive substring search; up to `limit` hits from knowledge
/// titles/descriptions followed by up to `limit` from context payloads.
///
/// SQLite's `lower()` only folds ASCII, so rows are streamed in rank order
/// and matched with Unicode lowercasing here.
pub fn search(conn: &Connection, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
    let needle = query.to_lowercase();
    let matches = |text: &str| text.to_lowercase().contains(&needle);

    let mut stmt = conn.prepare(
        r#"
        SELECT title, description, category, frequency
        FROM knowledge_base
        ORDER BY frequency DESC, last_used DESC
        "#,
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            count(row, 3)?,
        ))
    })?;

    let mut hits = Vec::new();
    for row in rows {
        if hits.len() >= limit {
            break;
        }
        let (title, description, category, frequency) = row?;
        if matches(&title) || matches(&description) {
            hits.push(SearchHit::Knowledge {
                title,
                description,
                category,
                frequency,
            });
        }
    }

    let mut stmt = conn.prepare(
        r#"
        SELECT session_id, context_type, context_data
        FROM session_context
        ORDER BY id DESC
        "#,
    )?;
    let rows = stmt.query_map([], |row| {
        let raw: String = row.get(2)?;
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, raw))
    })?;

    let mut notes = 0;
    for row in rows {
        if notes >= limit {
            break;
        }
        let (session_id, context_type, raw) = row?;
        if !matches(&raw) {
            continue;
        }
        let context_data = Payload::from_json(&raw)
            .map_err(|e| crate::Error::Query(format!("context note of {}: {}", session_id, e)))?;
        hits.push(SearchHit::Context {
            session_id,
            context_type,
            context_data,
        });
        notes += 1;
    }

    Ok(hits)
}
