use agmem_types::{CommandRecord, ContextNote, FileAction, FileActionKind, format_timestamp};
use rusqlite::{Connection, Row, params};

use super::{count, payload, ts};
use crate::{
    Result,
    records::{NewCommand, NewContextNote, NewFileAction},
};

pub fn append_context(conn: &Connection, note: &NewContextNote) -> Result<i64> {
    conn.execute(
        r#"
        INSERT INTO session_context (session_id, context_type, context_data, timestamp)
        VALUES (?1, ?2, ?3, ?4)
        "#,
        params![
            &note.session_id,
            &note.context_type,
            note.data.to_json(),
            format_timestamp(&note.timestamp)
        ],
    )?;

    Ok(conn.last_insert_rowid())
}

pub fn append_file_action(conn: &Connection, action: &NewFileAction) -> Result<i64> {
    conn.execute(
        r#"
        INSERT INTO session_files (session_id, file_path, action, language, lines_added, lines_removed, timestamp)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
        params![
            &action.session_id,
            &action.file_path,
            action.action.as_str(),
            &action.language,
            action.lines_added as i64,
            action.lines_removed as i64,
            format_timestamp(&action.timestamp)
        ],
    )?;

    Ok(conn.last_insert_rowid())
}

pub fn append_command(conn: &Connection, command: &NewCommand) -> Result<i64> {
    conn.execute(
        r#"
        INSERT INTO session_commands (session_id, command, exit_code, output_summary, timestamp)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![
            &command.session_id,
            &command.command,
            command.exit_code,
            &command.output_summary,
            format_timestamp(&command.timestamp)
        ],
    )?;

    Ok(conn.last_insert_rowid())
}

fn context_from_row(row: &Row<'_>) -> rusqlite::Result<ContextNote> {
    Ok(ContextNote {
        id: row.get(0)?,
        session_id: row.get(1)?,
        context_type: row.get(2)?,
        data: payload(row, 3)?,
        timestamp: ts(row, 4)?,
    })
}

fn file_from_row(row: &Row<'_>) -> rusqlite::Result<FileAction> {
    let raw_action: String = row.get(3)?;
    let action = raw_action.parse::<FileActionKind>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e)),
        )
    })?;

    Ok(FileAction {
        id: row.get(0)?,
        session_id: row.get(1)?,
        file_path: row.get(2)?,
        action,
        language: row.get(4)?,
        lines_added: count(row, 5)?,
        lines_removed: count(row, 6)?,
        timestamp: ts(row, 7)?,
    })
}

fn command_from_row(row: &Row<'_>) -> rusqlite::Result<CommandRecord> {
    Ok(CommandRecord {
        id: row.get(0)?,
        session_id: row.get(1)?,
        command: row.get(2)?,
        exit_code: row.get(3)?,
        output_summary: row.get(4)?,
        timestamp: ts(row, 5)?,
    })
}

pub fn context_for_session(conn: &Connection, session_id: &str) -> Result<Vec<ContextNote>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, session_id, context_type, context_data, timestamp
        FROM session_context
        WHERE session_id = ?1
        ORDER BY id
        "#,
    )?;

    let notes = stmt
        .query_map([session_id], context_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(notes)
}

pub fn files_for_session(conn: &Connection, session_id: &str) -> Result<Vec<FileAction>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, session_id, file_path, action, language, lines_added, lines_removed, timestamp
        FROM session_files
        WHERE session_id = ?1
        ORDER BY id
        "#,
    )?;

    let files = stmt
        .query_map([session_id], file_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(files)
}

pub fn commands_for_session(conn: &Connection, session_id: &str) -> Result<Vec<CommandRecord>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, session_id, command, exit_code, output_summary, timestamp
        FROM session_commands
        WHERE session_id = ?1
        ORDER BY id
        "#,
    )?;

    let commands = stmt
        .query_map([session_id], command_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(commands)
}
