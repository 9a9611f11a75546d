use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Session identifier: a truncated SHA-256 digest, always
/// [`SessionId::WIDTH`] lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub const WIDTH: usize = 16;

    /// Validate and wrap an identifier
    pub fn parse(value: &str) -> crate::Result<Self> {
        if Self::is_valid(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(crate::Error::InvalidSessionId(value.to_string()))
        }
    }

    /// Hex-encode a digest, truncated to the fixed width
    pub fn from_digest(digest: &[u8]) -> Self {
        let hex: String = digest
            .iter()
            .take(Self::WIDTH / 2)
            .map(|byte| format!("{:02x}", byte))
            .collect();
        Self(hex)
    }

    pub fn is_valid(value: &str) -> bool {
        value.len() == Self::WIDTH
            && value
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::parse(s)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Git metadata captured when a session starts.
///
/// Every field is best-effort; outside a checkout all three are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitContext {
    pub repo_root: Option<String>,
    pub branch: Option<String>,
    pub commit: Option<String>,
}

impl GitContext {
    pub fn is_empty(&self) -> bool {
        self.repo_root.is_none() && self.branch.is_none() && self.commit.is_none()
    }
}

/// Lifecycle state derived at read time (never stored)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Started, not yet ended, still within the staleness window
    InProgress,
    /// `end` has been recorded
    Ended,
    /// Never ended and older than the staleness window
    Abandoned,
}

/// One recorded invocation of an assistant CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: SessionId,
    pub cli_tool: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub exit_code: Option<i32>,
    pub working_dir: String,
    pub git_repo: Option<String>,
    pub git_branch: Option<String>,
    pub git_commit: Option<String>,
    /// Derived from `end_time - start_time` when the session ends
    pub duration_seconds: Option<f64>,
}

impl Session {
    pub fn is_ended(&self) -> bool {
        self.end_time.is_some()
    }

    /// Classify the session relative to `now` and the staleness window
    pub fn state(&self, now: DateTime<Utc>, stale_after: Duration) -> SessionState {
        if self.end_time.is_some() {
            SessionState::Ended
        } else if now - self.start_time > stale_after {
            SessionState::Abandoned
        } else {
            SessionState::InProgress
        }
    }
}
