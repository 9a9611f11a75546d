use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{Error, Result};

// Schema version (increment when appending to MIGRATIONS)
pub const SCHEMA_VERSION: i32 = 2;

// Applied in order inside one IMMEDIATE transaction; never edit a shipped entry.
const MIGRATIONS: &[(i32, &str)] = &[(1, V1_INITIAL), (2, V2_KNOWLEDGE_SOURCES)];

const V1_INITIAL: &str = r#"
CREATE TABLE IF NOT EXISTS sessions (
    session_id TEXT PRIMARY KEY,
    cli_tool TEXT NOT NULL,
    start_time TEXT NOT NULL,
    end_time TEXT,
    exit_code INTEGER,
    working_dir TEXT NOT NULL,
    git_repo TEXT,
    git_branch TEXT,
    git_commit TEXT,
    duration_seconds REAL,
    CHECK (end_time IS NULL OR end_time >= start_time),
    CHECK (duration_seconds IS NULL OR duration_seconds >= 0)
);

CREATE TABLE IF NOT EXISTS projects (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_path TEXT NOT NULL UNIQUE,
    project_name TEXT NOT NULL,
    session_count INTEGER NOT NULL DEFAULT 0,
    total_time_seconds REAL NOT NULL DEFAULT 0,
    last_session_id TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS session_context (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL,
    context_type TEXT NOT NULL,
    context_data TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    FOREIGN KEY (session_id) REFERENCES sessions(session_id)
);

CREATE TABLE IF NOT EXISTS session_files (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL,
    file_path TEXT NOT NULL,
    action TEXT NOT NULL,
    language TEXT,
    lines_added INTEGER NOT NULL DEFAULT 0,
    lines_removed INTEGER NOT NULL DEFAULT 0,
    timestamp TEXT NOT NULL,
    FOREIGN KEY (session_id) REFERENCES sessions(session_id)
);

CREATE TABLE IF NOT EXISTS session_commands (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL,
    command TEXT NOT NULL,
    exit_code INTEGER NOT NULL,
    output_summary TEXT,
    timestamp TEXT NOT NULL,
    FOREIGN KEY (session_id) REFERENCES sessions(session_id)
);

CREATE TABLE IF NOT EXISTS knowledge_base (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    category TEXT NOT NULL,
    title TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL,
    context TEXT,
    source_sessions TEXT,
    frequency INTEGER NOT NULL DEFAULT 1,
    last_used TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS project_patterns (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id INTEGER NOT NULL,
    pattern_type TEXT NOT NULL,
    pattern TEXT NOT NULL,
    confidence REAL NOT NULL DEFAULT 0.5,
    occurrences INTEGER NOT NULL DEFAULT 1,
    first_seen TEXT NOT NULL,
    last_seen TEXT NOT NULL,
    UNIQUE (project_id, pattern_type, pattern),
    FOREIGN KEY (project_id) REFERENCES projects(id)
);

CREATE TABLE IF NOT EXISTS weekly_summaries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    year INTEGER NOT NULL,
    week_number INTEGER NOT NULL,
    cli_tool TEXT NOT NULL,
    project_path TEXT NOT NULL,
    summary_data TEXT NOT NULL,
    session_count INTEGER NOT NULL,
    total_time_seconds REAL NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE (year, week_number, cli_tool, project_path)
);

CREATE VIEW IF NOT EXISTS recent_sessions AS
    SELECT * FROM sessions ORDER BY start_time DESC;

CREATE INDEX IF NOT EXISTS idx_sessions_dir ON sessions(working_dir, start_time DESC);
CREATE INDEX IF NOT EXISTS idx_sessions_tool_start ON sessions(cli_tool, start_time);
CREATE INDEX IF NOT EXISTS idx_sessions_start ON sessions(start_time DESC);
CREATE INDEX IF NOT EXISTS idx_context_session ON session_context(session_id);
CREATE INDEX IF NOT EXISTS idx_files_session ON session_files(session_id);
CREATE INDEX IF NOT EXISTS idx_files_path ON session_files(file_path);
CREATE INDEX IF NOT EXISTS idx_commands_session ON session_commands(session_id);
CREATE INDEX IF NOT EXISTS idx_knowledge_rank ON knowledge_base(frequency DESC, last_used DESC);
"#;

// Source sessions move from a JSON array column (overwritten on every
// submission) to an accumulating junction table.
const V2_KNOWLEDGE_SOURCES: &str = r#"
CREATE TABLE IF NOT EXISTS knowledge_sources (
    knowledge_id INTEGER NOT NULL,
    session_id TEXT NOT NULL,
    added_at TEXT NOT NULL,
    PRIMARY KEY (knowledge_id, session_id),
    FOREIGN KEY (knowledge_id) REFERENCES knowledge_base(id)
);

ALTER TABLE knowledge_base ADD COLUMN origin_session TEXT;

INSERT OR IGNORE INTO knowledge_sources (knowledge_id, session_id, added_at)
    SELECT kb.id, je.value, kb.created_at
    FROM knowledge_base kb,
         json_each(CASE WHEN json_valid(kb.source_sessions) THEN kb.source_sessions ELSE '[]' END) je
    WHERE je.type = 'text';

UPDATE knowledge_base SET origin_session = (
    SELECT ks.session_id FROM knowledge_sources ks
    WHERE ks.knowledge_id = knowledge_base.id
    ORDER BY ks.rowid LIMIT 1
);

ALTER TABLE knowledge_base DROP COLUMN source_sessions;
"#;

/// Connection-level settings; must run outside any transaction
pub fn apply_pragmas(conn: &Connection) -> Result<()> {
    // journal_mode answers with the resulting mode ("memory" for in-memory stores)
    let _mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(())
}

pub fn current_version(conn: &Connection) -> Result<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    Ok(version)
}

/// Bring the store up to [`SCHEMA_VERSION`].
///
/// Idempotent. `extra_schema` runs once, only when the store is created.
/// Fails when the store was written by a newer schema.
pub fn init_schema(conn: &Connection, extra_schema: Option<&str>) -> Result<()> {
    // Fast path: nothing to do, no write lock taken
    if current_version(conn)? == SCHEMA_VERSION {
        return Ok(());
    }

    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;

    // Re-read under the write lock; another process may have migrated meanwhile
    let found = current_version(&tx)?;
    if found > SCHEMA_VERSION {
        return Err(Error::Migration {
            version: found,
            message: format!(
                "store schema v{} is newer than supported v{}",
                found, SCHEMA_VERSION
            ),
        });
    }

    for (version, sql) in MIGRATIONS {
        if found < *version {
            tx.execute_batch(sql).map_err(|e| Error::Migration {
                version: *version,
                message: e.to_string(),
            })?;
            tracing::info!(version = version, "applied migration");
        }
    }

    if found == 0
        && let Some(script) = extra_schema
    {
        tx.execute_batch(script).map_err(|e| Error::Migration {
            version: SCHEMA_VERSION,
            message: format!("schema file: {}", e),
        })?;
        tracing::info!("applied schema file");
    }

    tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    tx.commit()?;

    Ok(())
}
