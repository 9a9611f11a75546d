use agmem_types::{SummaryData, WeeklySummary, format_timestamp};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row, params};

use super::count;
use crate::Result;

fn from_row(row: &Row<'_>) -> rusqlite::Result<WeeklySummary> {
    let raw: String = row.get(4)?;
    let summary_data: SummaryData = serde_json::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(WeeklySummary {
        year: row.get(0)?,
        week_number: row.get(1)?,
        cli_tool: row.get(2)?,
        project_path: row.get(3)?,
        summary_data,
        session_count: count(row, 5)?,
        total_time_seconds: row.get(6)?,
    })
}

/// Overwrite the aggregate fields with freshly computed values.
/// `created_at` is only set on insert so a recompute leaves the row unchanged.
pub fn upsert(conn: &Connection, summary: &WeeklySummary, at: &DateTime<Utc>) -> Result<()> {
    let summary_data = serde_json::to_string(&summary.summary_data)?;

    conn.execute(
        r#"
        INSERT INTO weekly_summaries (year, week_number, cli_tool, project_path, summary_data,
                                      session_count, total_time_seconds, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ON CONFLICT(year, week_number, cli_tool, project_path) DO UPDATE SET
            summary_data = excluded.summary_data,
            session_count = excluded.session_count,
            total_time_seconds = excluded.total_time_seconds
        "#,
        params![
            summary.year,
            summary.week_number,
            &summary.cli_tool,
            &summary.project_path,
            summary_data,
            summary.session_count as i64,
            summary.total_time_seconds,
            format_timestamp(at)
        ],
    )?;

    Ok(())
}

pub fn list(
    conn: &Connection,
    year: i32,
    week_number: u32,
    cli_tool: &str,
) -> Result<Vec<WeeklySummary>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT year, week_number, cli_tool, project_path, summary_data,
               session_count, total_time_seconds
        FROM weekly_summaries
        WHERE year = ?1 AND week_number = ?2 AND cli_tool = ?3
        ORDER BY project_path
        "#,
    )?;

    let summaries = stmt
        .query_map(params![year, week_number, cli_tool], from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(summaries)
}
