use super::current_dir;
use agmem_core::normalize_path;
use agmem_runtime::Memory;
use agmem_types::ContextQuery;
use anyhow::Result;
use std::path::Path;

use crate::output::print_json;

pub fn handle(
    memory: &Memory,
    dir: Option<&str>,
    branch: Option<String>,
    file_patterns: Vec<String>,
    limit: Option<usize>,
) -> Result<()> {
    // Same form `start` records: the process cwd, symlinks resolved
    let cwd = match dir {
        Some(dir) => normalize_path(Path::new(dir)),
        None => current_dir()?,
    };

    let query = ContextQuery {
        cwd: cwd.display().to_string(),
        branch,
        file_patterns,
        limit: limit.unwrap_or(memory.config().context_limit),
    };

    let bundle = memory.context().get_relevant_context(query)?;
    print_json(&bundle)
}
