use std::time::Duration;

use crate::Result;

/// How often a write transaction is re-run after `SQLITE_BUSY`.
///
/// `busy_timeout` already waits inside SQLite; this covers the cases it
/// does not (lock upgrades, WAL recovery, checkpoints).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// Sleep before attempt `n` is `backoff * n`
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            backoff: Duration::from_millis(50),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    /// Run `op` until it succeeds, fails with a non-busy error, or the
    /// retry budget is spent
    pub fn run<T, F>(&self, label: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let mut attempt = 0;
        loop {
            match op() {
                Err(err) if err.is_busy() && attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(op = label, attempt, "store busy, retrying");
                    std::thread::sleep(self.backoff * attempt);
                }
                other => return other,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn busy() -> Error {
        Error::Database(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        ))
    }

    #[test]
    fn test_retries_until_success() {
        let policy = RetryPolicy {
            max_retries: 3,
            backoff: Duration::ZERO,
        };
        let mut calls = 0;

        let result = policy.run("test", || {
            calls += 1;
            if calls < 3 { Err(busy()) } else { Ok(calls) }
        });

        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn test_gives_up_after_budget() {
        let policy = RetryPolicy {
            max_retries: 2,
            backoff: Duration::ZERO,
        };
        let mut calls = 0;

        let result: Result<()> = policy.run("test", || {
            calls += 1;
            Err(busy())
        });

        assert!(result.unwrap_err().is_busy());
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_other_errors_are_not_retried() {
        let mut calls = 0;

        let result: Result<()> = RetryPolicy::default().run("test", || {
            calls += 1;
            Err(Error::Query("bad input".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
