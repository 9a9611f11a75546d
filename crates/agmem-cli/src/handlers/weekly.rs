use agmem_runtime::Memory;
use anyhow::Result;
use serde_json::json;

use crate::output::print_json;

pub fn handle(memory: &Memory, year: i32, week: u32, tool: &str) -> Result<()> {
    let summaries = memory.compactor().compact(year, week, tool)?;

    print_json(&json!({
        "year": year,
        "week": week,
        "cli_tool": tool,
        "summaries": summaries,
    }))
}
