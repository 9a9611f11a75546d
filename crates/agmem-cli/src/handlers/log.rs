use agmem_runtime::{FileChange, Memory};
use agmem_types::{FileActionKind, Payload};
use anyhow::{Context, Result};
use serde_json::json;

use crate::output::print_json;

pub fn context(memory: &Memory, session_id: &str, context_type: &str, data: &str) -> Result<()> {
    let payload = Payload::from_json(data).context("context data must be a JSON object")?;
    let id = memory.recorder().log_context(session_id, context_type, payload)?;
    print_json(&json!({ "id": id }))
}

pub fn file(
    memory: &Memory,
    session_id: &str,
    file_path: String,
    action: FileActionKind,
    language: Option<String>,
    lines_added: u64,
    lines_removed: u64,
) -> Result<()> {
    let id = memory.recorder().log_file_action(
        session_id,
        FileChange {
            file_path,
            action,
            language,
            lines_added,
            lines_removed,
        },
    )?;
    print_json(&json!({ "id": id }))
}

pub fn command(
    memory: &Memory,
    session_id: &str,
    command: &str,
    exit_code: i32,
    summary: Option<String>,
) -> Result<()> {
    let id = memory
        .recorder()
        .log_command(session_id, command, exit_code, summary)?;
    print_json(&json!({ "id": id }))
}
