use super::current_dir;
use agmem_runtime::{EndOutcome, Memory};
use anyhow::Result;
use serde_json::json;

/// Prints only the id so wrappers can capture it with `$(agmem start ...)`
pub fn start(memory: &Memory, tool: &str) -> Result<()> {
    let cwd = current_dir()?;
    let session_id = memory.recorder().start(tool, &cwd)?;
    println!("{}", session_id);
    Ok(())
}

pub fn end(memory: &Memory, session_id: &str, exit_code: i32) -> Result<()> {
    let outcome = memory.recorder().end(session_id, exit_code)?;

    let status = match &outcome {
        EndOutcome::Ended(_) => "ended",
        EndOutcome::AlreadyEnded(_) => "already_ended",
    };
    let session = outcome.session();

    crate::output::print_json(&json!({
        "status": status,
        "session_id": session.session_id,
        "exit_code": session.exit_code,
        "duration_seconds": session.duration_seconds,
    }))
}
