use agmem_testing::{TestWorld, assertions};
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_start_end_roundtrip() {
    let world = TestWorld::new().enter_dir("project-a");

    let started = world.run(&["start", "claude"]).unwrap();
    assert!(started.success(), "start failed: {}", started.stderr());
    let session_id = started.stdout_line().to_string();
    assertions::assert_session_id(&session_id).unwrap();

    let ended = world.run(&["end", &session_id, "3"]).unwrap();
    assert!(ended.success(), "end failed: {}", ended.stderr());

    let json = ended.json().unwrap();
    assert_eq!(json["status"], "ended");
    assert_eq!(json["session_id"], session_id.as_str());
    assert_eq!(json["exit_code"], 3);
    assert!(json["duration_seconds"].as_f64().unwrap() >= 0.0);
}

#[test]
fn test_second_end_keeps_first_outcome() {
    let world = TestWorld::new().enter_dir("project-a");

    let session_id = world.run(&["start", "codex"]).unwrap().stdout_line().to_string();
    world.run(&["end", &session_id, "0"]).unwrap();

    let again = world.run(&["end", &session_id, "-1"]).unwrap();
    assert!(again.success());

    let json = again.json().unwrap();
    assert_eq!(json["status"], "already_ended");
    assert_eq!(json["exit_code"], 0);
}

#[test]
fn test_end_unknown_session_fails() {
    let world = TestWorld::new();

    let mut cmd = cargo_bin_cmd!("agmem");
    world
        .configure_command(&mut cmd)
        .arg("end")
        .arg("0123456789abcdef");

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Session not found"));
}

#[test]
fn test_start_without_tool_is_usage_error() {
    let world = TestWorld::new();

    let mut cmd = cargo_bin_cmd!("agmem");
    world.configure_command(&mut cmd).arg("start");

    cmd.assert().failure().stdout(predicate::str::is_empty());
}

#[test]
fn test_context_in_unknown_dir_is_empty() {
    let world = TestWorld::new().enter_dir("never-used");

    let result = world.run(&["context"]).unwrap();
    assert!(result.success(), "context failed: {}", result.stderr());

    let json = result.json().unwrap();
    assertions::assert_array_len(&json, "recent_sessions", 0).unwrap();
    assertions::assert_array_len(&json, "project_patterns", 0).unwrap();
    assertions::assert_array_len(&json, "relevant_knowledge", 0).unwrap();
    assert!(json["project_path"].is_null());
}

#[test]
fn test_context_lists_sessions_for_same_dir_only() {
    let mut world = TestWorld::new().enter_dir("project-a");

    let first = world.run(&["start", "claude"]).unwrap().stdout_line().to_string();
    world.run(&["end", &first]).unwrap();
    let second = world.run(&["start", "gemini"]).unwrap().stdout_line().to_string();

    let other = world.run_in_dir(&["start", "claude"], "project-b").unwrap();
    assert!(other.success());

    let result = world.run(&["context", "--branch", "main", "--file", "*.rs"]).unwrap();
    let json = result.json().unwrap();

    assertions::assert_array_len(&json, "recent_sessions", 2).unwrap();
    assert_eq!(json["recent_sessions"][0]["session_id"], second.as_str());
    assert_eq!(json["recent_sessions"][1]["session_id"], first.as_str());
    assert_eq!(json["query"]["branch"], "main");
    assert_eq!(json["query"]["file_patterns"][0], "*.rs");
}

#[test]
fn test_context_limit_caps_sessions() {
    let world = TestWorld::new().enter_dir("project-a");

    for _ in 0..3 {
        assert!(world.run(&["start", "claude"]).unwrap().success());
    }

    let json = world.run(&["context", "--limit", "2"]).unwrap().json().unwrap();
    assertions::assert_array_len(&json, "recent_sessions", 2).unwrap();
}

#[test]
fn test_history_persists_in_data_dir() {
    let world = TestWorld::new().enter_dir("project-a");

    world.run(&["start", "claude"]).unwrap();
    assert!(world.data_dir().join("memory.db").exists());

    let json = world.run(&["sessions"]).unwrap().json().unwrap();
    assertions::assert_array_len(&json, "", 1).unwrap();
    assert_eq!(json[0]["state"], "in_progress");
}
