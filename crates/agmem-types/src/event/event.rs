use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Payload;

/// Free-form context note logged during a session.
///
/// `context_type` names the schema of `data`; known kinds:
/// - `task`: `{ "summary": string }`
/// - `decision`: `{ "title": string, "rationale": string }`
/// - `error`: `{ "message": string, "source"?: string }`
///
/// Other kinds are accepted as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextNote {
    pub id: i64,
    pub session_id: String,
    pub context_type: String,
    pub data: Payload,
    pub timestamp: DateTime<Utc>,
}

/// What happened to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileActionKind {
    Create,
    Edit,
    Delete,
    Rename,
    Read,
}

impl FileActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileActionKind::Create => "create",
            FileActionKind::Edit => "edit",
            FileActionKind::Delete => "delete",
            FileActionKind::Rename => "rename",
            FileActionKind::Read => "read",
        }
    }
}

impl fmt::Display for FileActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "create" | "created" | "add" => Ok(FileActionKind::Create),
            "edit" | "edited" | "modify" | "modified" | "write" => Ok(FileActionKind::Edit),
            "delete" | "deleted" | "remove" => Ok(FileActionKind::Delete),
            "rename" | "renamed" | "move" => Ok(FileActionKind::Rename),
            "read" => Ok(FileActionKind::Read),
            other => Err(format!("unknown file action '{}'", other)),
        }
    }
}

/// File touched during a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAction {
    pub id: i64,
    pub session_id: String,
    pub file_path: String,
    pub action: FileActionKind,
    pub language: Option<String>,
    pub lines_added: u64,
    pub lines_removed: u64,
    pub timestamp: DateTime<Utc>,
}

/// Shell command run during a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRecord {
    pub id: i64,
    pub session_id: String,
    pub command: String,
    pub exit_code: i32,
    pub output_summary: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// All event logs of one session, each in append order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionEvents {
    pub context: Vec<ContextNote>,
    pub files: Vec<FileAction>,
    pub commands: Vec<CommandRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_action_aliases() {
        assert_eq!("Modified".parse::<FileActionKind>(), Ok(FileActionKind::Edit));
        assert_eq!("create".parse::<FileActionKind>(), Ok(FileActionKind::Create));
        assert!("chmod".parse::<FileActionKind>().is_err());
    }

    #[test]
    fn test_file_action_roundtrips_through_str() {
        for kind in [
            FileActionKind::Create,
            FileActionKind::Edit,
            FileActionKind::Delete,
            FileActionKind::Rename,
            FileActionKind::Read,
        ] {
            assert_eq!(kind.as_str().parse::<FileActionKind>(), Ok(kind));
        }
    }
}
