use agmem_types::{ProjectPattern, format_timestamp};
use rusqlite::{Connection, Row, params};

use super::{count, project, ts};
use crate::{Error, Result, records::NewPattern};

fn from_row(row: &Row<'_>) -> rusqlite::Result<ProjectPattern> {
    Ok(ProjectPattern {
        id: row.get(0)?,
        project_path: row.get(1)?,
        pattern_type: row.get(2)?,
        pattern: row.get(3)?,
        confidence: row.get(4)?,
        occurrences: count(row, 5)?,
        last_seen: ts(row, 6)?,
    })
}

/// Record an observation; repeats bump `occurrences` and take the new confidence
pub fn record(conn: &Connection, pattern: &NewPattern) -> Result<()> {
    let project_id = project::id_for_path(conn, &pattern.project_path)?.ok_or_else(|| {
        Error::Query(format!("unknown project: {}", pattern.project_path))
    })?;

    conn.execute(
        r#"
        INSERT INTO project_patterns (project_id, pattern_type, pattern, confidence,
                                      occurrences, first_seen, last_seen)
        VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)
        ON CONFLICT(project_id, pattern_type, pattern) DO UPDATE SET
            confidence = excluded.confidence,
            occurrences = occurrences + 1,
            last_seen = MAX(last_seen, excluded.last_seen)
        "#,
        params![
            project_id,
            &pattern.pattern_type,
            &pattern.pattern,
            pattern.confidence,
            format_timestamp(&pattern.seen_at)
        ],
    )?;

    Ok(())
}

/// Patterns of one project, highest confidence first
pub fn for_project(conn: &Connection, project_path: &str) -> Result<Vec<ProjectPattern>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT pp.id, p.project_path, pp.pattern_type, pp.pattern, pp.confidence,
               pp.occurrences, pp.last_seen
        FROM project_patterns pp
        JOIN projects p ON pp.project_id = p.id
        WHERE p.project_path = ?1
        ORDER BY pp.confidence DESC, pp.last_seen DESC, pp.id
        "#,
    )?;

    let patterns = stmt
        .query_map([project_path], from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(patterns)
}
