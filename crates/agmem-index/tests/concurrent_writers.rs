//! Several processes share one store file; simulate them with one connection per thread.

use agmem_index::{Database, NewSession, OpenOptions, RetryPolicy};
use agmem_types::{GitContext, NewKnowledge, SessionId, parse_timestamp};
use std::path::PathBuf;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

const WRITERS: usize = 8;

fn options() -> OpenOptions {
    OpenOptions {
        busy_timeout: Duration::from_millis(5000),
        retry: RetryPolicy {
            max_retries: 10,
            backoff: Duration::from_millis(20),
        },
        extra_schema: None,
    }
}

fn spawn_writers<F>(db_path: PathBuf, work: F)
where
    F: Fn(&Database, usize) + Send + Sync + 'static,
{
    let barrier = Arc::new(Barrier::new(WRITERS));
    let work = Arc::new(work);

    let handles: Vec<_> = (0..WRITERS)
        .map(|i| {
            let barrier = Arc::clone(&barrier);
            let work = Arc::clone(&work);
            let db_path = db_path.clone();
            thread::spawn(move || {
                let db = Database::open_with(&db_path, &options()).unwrap();
                barrier.wait();
                work(&db, i);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_concurrent_starts_count_every_session() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("memory.db");
    drop(Database::open(&db_path).unwrap());

    spawn_writers(db_path.clone(), |db, i| {
        db.start_session(&NewSession {
            session_id: SessionId::parse(&format!("{:016x}", i + 1)).unwrap(),
            cli_tool: "claude".to_string(),
            start_time: parse_timestamp("2025-06-02T10:00:00Z").unwrap(),
            working_dir: "/work/app".to_string(),
            git: GitContext {
                repo_root: Some("/work/app".to_string()),
                branch: Some("main".to_string()),
                commit: None,
            },
        })
        .unwrap();
    });

    let db = Database::open(&db_path).unwrap();
    let project = db.get_project("/work/app").unwrap().unwrap();
    assert_eq!(project.session_count, WRITERS as u64);
    assert_eq!(db.recent_sessions(100).unwrap().len(), WRITERS);
}

#[test]
fn test_concurrent_knowledge_submissions_count_every_call() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("memory.db");
    drop(Database::open(&db_path).unwrap());

    spawn_writers(db_path.clone(), |db, i| {
        let entry = NewKnowledge {
            category: "solution".to_string(),
            title: "Retry on SQLITE_BUSY".to_string(),
            description: "Wrap writes in a retry loop".to_string(),
            context: None,
            source_session: Some(format!("session-{}", i)),
        };
        let at = parse_timestamp("2025-06-02T10:00:00Z").unwrap();
        db.upsert_knowledge(&entry, &at).unwrap();
    });

    let db = Database::open(&db_path).unwrap();
    let entry = db.get_knowledge("Retry on SQLITE_BUSY").unwrap().unwrap();
    assert_eq!(entry.frequency, WRITERS as u64);
    assert_eq!(entry.source_sessions.len(), WRITERS);
}
