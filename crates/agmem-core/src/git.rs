use agmem_types::GitContext;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Source of git metadata for a directory.
///
/// Implementations never fail: any problem resolves to absent fields.
pub trait GitProbe: Send + Sync {
    fn probe(&self, dir: &Path) -> GitContext;
}

/// Queries the `git` executable, bounding each call by `timeout`
#[derive(Debug, Clone)]
pub struct SystemGit {
    timeout: Duration,
}

impl SystemGit {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run `git <args>` in `dir`; `None` on spawn failure, timeout,
    /// non-zero exit or empty output
    fn run(&self, dir: &Path, args: &[&str]) -> Option<String> {
        let mut child = match Command::new("git")
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => child,
            Err(err) => {
                tracing::debug!(error = %err, "git not available");
                return None;
            }
        };

        let start = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if start.elapsed() > self.timeout => {
                    tracing::debug!(?args, timeout_ms = self.timeout.as_millis() as u64, "git query timed out");
                    let _ = child.kill();
                    let _ = child.wait();
                    return None;
                }
                Ok(None) => std::thread::sleep(Duration::from_millis(5)),
                Err(err) => {
                    tracing::debug!(error = %err, "git query failed");
                    return None;
                }
            }
        };

        if !status.success() {
            return None;
        }

        let mut output = String::new();
        child.stdout.take()?.read_to_string(&mut output).ok()?;

        let trimmed = output.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

impl Default for SystemGit {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}

impl GitProbe for SystemGit {
    fn probe(&self, dir: &Path) -> GitContext {
        let Some(repo_root) = self.run(dir, &["rev-parse", "--show-toplevel"]) else {
            return GitContext::default();
        };

        GitContext {
            repo_root: Some(repo_root),
            // Empty on a detached HEAD
            branch: self.run(dir, &["branch", "--show-current"]),
            // Absent in a repository without commits
            commit: self.run(dir, &["rev-parse", "HEAD"]),
        }
    }
}

/// Always reports "not a repository"
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGit;

impl GitProbe for NoGit {
    fn probe(&self, _dir: &Path) -> GitContext {
        GitContext::default()
    }
}

/// Returns a fixed context regardless of directory
#[derive(Debug, Clone, Default)]
pub struct StaticGit(pub GitContext);

impl GitProbe for StaticGit {
    fn probe(&self, _dir: &Path) -> GitContext {
        self.0.clone()
    }
}
