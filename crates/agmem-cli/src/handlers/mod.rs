pub mod config;
pub mod context;
pub mod knowledge;
pub mod lifecycle;
pub mod log;
pub mod stats;
pub mod weekly;

use anyhow::{Context, Result};
use std::path::PathBuf;

fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().context("Failed to determine current directory")
}
