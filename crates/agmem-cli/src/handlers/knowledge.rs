use agmem_runtime::Memory;
use agmem_types::{NewKnowledge, Payload};
use anyhow::{Context, Result};

use crate::output::print_json;

pub fn add(
    memory: &Memory,
    category: String,
    title: String,
    description: String,
    context: Option<&str>,
    source_session: Option<String>,
) -> Result<()> {
    let context = context
        .map(Payload::from_json)
        .transpose()
        .context("--context must be a JSON object")?;

    let entry = memory.knowledge().add(NewKnowledge {
        category,
        title,
        description,
        context,
        source_session,
    })?;
    print_json(&entry)
}

pub fn list(memory: &Memory, category: Option<&str>, limit: Option<usize>) -> Result<()> {
    let entries = memory.knowledge().list(category, limit)?;
    print_json(&entries)
}

/// Records the pattern and prints the project's patterns as they now stand
pub fn add_pattern(
    memory: &Memory,
    project_path: &str,
    pattern_type: &str,
    pattern: &str,
    confidence: f64,
) -> Result<()> {
    let patterns = memory.patterns();
    patterns.record(project_path, pattern_type, pattern, confidence)?;
    print_json(&patterns.for_project(project_path)?)
}
