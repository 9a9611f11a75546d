//! Custom assertions for agmem JSON output.
//!
//! Provides high-level assertions that make tests more readable:
//! - Array length checks
//! - Session id format validation

use anyhow::{Context, Result};
use serde_json::Value;

/// Assert that `json[key]` (or `json` itself for an empty key) is an array of `expected` items.
pub fn assert_array_len(json: &Value, key: &str, expected: usize) -> Result<()> {
    let value = if key.is_empty() { json } else { &json[key] };
    let items = value
        .as_array()
        .with_context(|| format!("Expected '{}' to be an array in {}", key, json))?;

    if items.len() != expected {
        anyhow::bail!(
            "Expected {} items in '{}', got {}",
            expected,
            key,
            items.len()
        );
    }

    Ok(())
}

/// Assert that `id` looks like a session id: 16 lowercase hex characters.
pub fn assert_session_id(id: &str) -> Result<()> {
    let id = id.trim();
    if id.len() != 16 || !id.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')) {
        anyhow::bail!("'{}' is not a 16-character lowercase hex session id", id);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_assert_array_len() {
        let json = json!({
            "recent_sessions": [
                {"session_id": "1"},
                {"session_id": "2"}
            ]
        });

        assert!(assert_array_len(&json, "recent_sessions", 2).is_ok());
        assert!(assert_array_len(&json, "recent_sessions", 1).is_err());
        assert!(assert_array_len(&json, "missing", 0).is_err());
        assert!(assert_array_len(&json!([1, 2, 3]), "", 3).is_ok());
    }

    #[test]
    fn test_assert_session_id() {
        assert!(assert_session_id("0123456789abcdef\n").is_ok());
        assert!(assert_session_id("0123456789ABCDEF").is_err());
        assert!(assert_session_id("abc").is_err());
    }
}
