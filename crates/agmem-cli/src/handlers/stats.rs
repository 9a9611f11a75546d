use agmem_runtime::Memory;
use anyhow::Result;

use crate::output::print_json;

pub fn stats(memory: &Memory) -> Result<()> {
    print_json(&memory.stats().stats()?)
}

pub fn sessions(memory: &Memory, limit: usize, stale: bool) -> Result<()> {
    let service = memory.stats();
    let sessions = if stale {
        service.stale_sessions()?
    } else {
        service.recent_sessions(limit)?
    };
    print_json(&sessions)
}

pub fn session_show(memory: &Memory, session_id: &str) -> Result<()> {
    print_json(&memory.stats().session_detail(session_id)?)
}

pub fn projects(memory: &Memory) -> Result<()> {
    print_json(&memory.stats().projects()?)
}

pub fn timeline(memory: &Memory, days: u32) -> Result<()> {
    print_json(&memory.stats().timeline(days)?)
}

pub fn files(memory: &Memory, limit: usize) -> Result<()> {
    print_json(&memory.stats().top_files(limit)?)
}

pub fn search(memory: &Memory, query: &str) -> Result<()> {
    print_json(&memory.stats().search(query)?)
}
