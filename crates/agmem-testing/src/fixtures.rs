//! Git repository fixtures.
//!
//! Tests that need a real checkout call [`git_available`] first and return
//! early when the binary is missing.

use anyhow::{Context, Result, bail};
use std::path::Path;
use std::process::Command;

/// True when a `git` executable can be run
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        // Keep user/global config out of the fixture
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .env("GIT_CONFIG_GLOBAL", "/dev/null")
        .env("GIT_AUTHOR_NAME", "agmem tests")
        .env("GIT_AUTHOR_EMAIL", "tests@agmem.invalid")
        .env("GIT_COMMITTER_NAME", "agmem tests")
        .env("GIT_COMMITTER_EMAIL", "tests@agmem.invalid")
        .output()
        .with_context(|| format!("Failed to run git {:?}", args))?;

    if !output.status.success() {
        bail!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Initialize `dir` as a repository on `branch` with one commit.
///
/// Returns the commit hash.
pub fn init_repo(dir: &Path, branch: &str) -> Result<String> {
    std::fs::create_dir_all(dir)?;
    git(dir, &["init", "--quiet"])?;
    git(dir, &["symbolic-ref", "HEAD", &format!("refs/heads/{}", branch)])?;
    std::fs::write(dir.join("README.md"), "fixture\n")?;
    git(dir, &["add", "README.md"])?;
    git(dir, &["commit", "--quiet", "-m", "initial"])?;
    git(dir, &["rev-parse", "HEAD"])
}

/// Create and switch to `branch` in an existing fixture repository
pub fn checkout_new_branch(dir: &Path, branch: &str) -> Result<()> {
    git(dir, &["checkout", "--quiet", "-b", branch])?;
    Ok(())
}
