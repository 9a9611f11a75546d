use agmem_runtime::Config;
use anyhow::{Result, bail};
use serde_json::json;
use std::path::Path;

use crate::output::print_json;

pub fn show(data_dir: &Path) -> Result<()> {
    let config_path = Config::default_path(data_dir);
    let config = Config::load_from(&config_path)?;

    print_json(&json!({
        "data_dir": data_dir,
        "config_file": config_path,
        "config_file_exists": config_path.exists(),
        "db_path": config.db_path(data_dir),
        "config": config,
    }))
}

pub fn init(data_dir: &Path, force: bool) -> Result<()> {
    let config_path = Config::default_path(data_dir);
    if config_path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }

    Config::default().save_to(&config_path)?;
    tracing::info!(path = %config_path.display(), "wrote default config");

    print_json(&json!({ "config_file": config_path }))
}
