use agmem_types::SessionId;
use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};

/// Derive a session id from `tool`, the start instant and the process id.
///
/// SHA-256 over `"{tool}_{rfc3339 nanos}_{pid}"`, truncated to
/// [`SessionId::WIDTH`] hex characters. Distinct pids at the same instant
/// give distinct ids; uniqueness across pid reuse within one nanosecond is
/// not guaranteed.
pub fn generate_session_id(tool: &str, at: &DateTime<Utc>, pid: u32) -> SessionId {
    let composite = format!(
        "{}_{}_{}",
        tool,
        at.to_rfc3339_opts(SecondsFormat::Nanos, true),
        pid
    );

    let mut hasher = Sha256::new();
    hasher.update(composite.as_bytes());
    SessionId::from_digest(&hasher.finalize())
}
