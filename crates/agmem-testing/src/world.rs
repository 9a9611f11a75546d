//! Isolated sandbox for driving the `agmem` binary.
//!
//! Each [`TestWorld`] owns a temp root holding the data directory
//! (`.agmem`) and any project directories a test walks into. Sessions are
//! keyed on the directory they start in, so most tests pick a cwd first.

use anyhow::{Context, Result};
use assert_cmd::Command;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use tempfile::TempDir;

/// Variables from the host that would redirect the store or add log noise
const SCRUBBED_ENV: &[&str] = &["AGMEM_PATH", "AGMEM_LOG", "RUST_LOG"];

/// # Example
/// ```no_run
/// use agmem_testing::TestWorld;
///
/// let world = TestWorld::new().enter_dir("project-a");
/// let id = world.run(&["start", "claude"]).unwrap().stdout_line().to_string();
/// assert!(world.run(&["end", &id]).unwrap().success());
/// ```
pub struct TestWorld {
    root: TempDir,
    data_dir: PathBuf,
    cwd: PathBuf,
    env: BTreeMap<String, String>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        let data_dir = root.path().join(".agmem");
        std::fs::create_dir_all(&data_dir).expect("Failed to create data dir");

        Self {
            cwd: root.path().to_path_buf(),
            data_dir,
            root,
            env: BTreeMap::new(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn temp_dir(&self) -> &Path {
        self.root.path()
    }

    /// Builder form of [`set_cwd`](Self::set_cwd)
    pub fn enter_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.set_cwd(path);
        self
    }

    /// Move to `path` (relative to the temp root), creating it if needed
    pub fn set_cwd<P: AsRef<Path>>(&mut self, path: P) {
        let path = path.as_ref();
        let dir = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.path().join(path)
        };
        std::fs::create_dir_all(&dir).expect("Failed to create directory");
        self.cwd = dir;
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Write `content` as `<data_dir>/config.toml`
    pub fn with_config(self, content: &str) -> Self {
        std::fs::write(self.data_dir.join("config.toml"), content)
            .expect("Failed to write config");
        self
    }

    /// Point `cmd` at this world: data dir, cwd and a scrubbed environment.
    ///
    /// Pair with `assert_cmd::cargo::cargo_bin_cmd!("agmem")` in the CLI's
    /// own tests to use `assert()` and predicates.
    pub fn configure_command<'a>(&self, cmd: &'a mut Command) -> &'a mut Command {
        cmd.arg("--data-dir").arg(&self.data_dir).current_dir(&self.cwd);

        for key in SCRUBBED_ENV {
            cmd.env_remove(key);
        }
        cmd.envs(&self.env);

        cmd
    }

    /// Run `agmem <args>` in the current cwd and capture its output.
    ///
    /// Looks the binary up at runtime, so it only works from tests of the
    /// package that builds `agmem`.
    #[allow(deprecated)]
    pub fn run(&self, args: &[&str]) -> Result<CliResult> {
        let mut cmd = Command::cargo_bin("agmem").context("agmem binary not built")?;
        self.configure_command(&mut cmd).args(args);

        let output = cmd.output().context("Failed to run agmem")?;
        Ok(CliResult::from(output))
    }

    /// Run in `dir` once, then return to the previous cwd
    pub fn run_in_dir<P: AsRef<Path>>(&mut self, args: &[&str], dir: P) -> Result<CliResult> {
        let previous = self.cwd.clone();
        self.set_cwd(dir);
        let result = self.run(args);
        self.cwd = previous;
        result
    }
}

/// Captured exit status and decoded output of one invocation
#[derive(Debug)]
pub struct CliResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl From<Output> for CliResult {
    fn from(output: Output) -> Self {
        Self {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

impl CliResult {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Every command except `start` prints one JSON document
    pub fn json(&self) -> Result<serde_json::Value> {
        serde_json::from_str(&self.stdout)
            .with_context(|| format!("stdout is not JSON: {}", self.stdout))
    }

    /// `start` prints a bare session id
    pub fn stdout_line(&self) -> &str {
        self.stdout.trim()
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }
}
