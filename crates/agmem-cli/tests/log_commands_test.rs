use agmem_testing::{TestWorld, assertions};
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

fn started(world: &TestWorld) -> String {
    let result = world.run(&["start", "claude"]).unwrap();
    assert!(result.success(), "start failed: {}", result.stderr());
    result.stdout_line().to_string()
}

#[test]
fn test_logged_events_show_up_in_session_detail() {
    let world = TestWorld::new().enter_dir("project-a");
    let session_id = started(&world);

    let note = world
        .run(&["log", "context", &session_id, "decision", r#"{"choice":"sqlite"}"#])
        .unwrap();
    assert!(note.success(), "log context failed: {}", note.stderr());
    assert!(note.json().unwrap()["id"].as_i64().is_some());

    let file = world
        .run(&[
            "log", "file", &session_id, "src/lib.rs", "edit", "--language", "rust", "--added",
            "12", "--removed", "4",
        ])
        .unwrap();
    assert!(file.success(), "log file failed: {}", file.stderr());

    let command = world
        .run(&["log", "command", &session_id, "cargo test", "101", "--summary", "2 failed"])
        .unwrap();
    assert!(command.success(), "log command failed: {}", command.stderr());

    let detail = world.run(&["session", "show", &session_id]).unwrap().json().unwrap();
    assert_eq!(detail["session_id"], session_id.as_str());
    assert_eq!(detail["state"], "in_progress");
    assertions::assert_array_len(&detail["events"], "context", 1).unwrap();
    assertions::assert_array_len(&detail["events"], "files", 1).unwrap();
    assertions::assert_array_len(&detail["events"], "commands", 1).unwrap();
    assert_eq!(detail["events"]["files"][0]["lines_added"], 12);
    assert_eq!(detail["events"]["commands"][0]["exit_code"], 101);
}

#[test]
fn test_log_context_rejects_invalid_json() {
    let world = TestWorld::new();
    let session_id = started(&world);

    let mut cmd = cargo_bin_cmd!("agmem");
    world
        .configure_command(&mut cmd)
        .args(["log", "context", &session_id, "task", "{not json"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("JSON object"));
}

#[test]
fn test_log_against_unknown_session_fails() {
    let world = TestWorld::new();

    let result = world
        .run(&["log", "command", "0123456789abcdef", "ls", "0"])
        .unwrap();
    assert!(!result.success());
    assert!(result.stderr().contains("Session not found"));
}

#[test]
fn test_files_ranks_by_modifications() {
    let world = TestWorld::new();
    let session_id = started(&world);

    for path in ["src/main.rs", "src/main.rs", "README.md"] {
        let result = world
            .run(&["log", "file", &session_id, path, "edit"])
            .unwrap();
        assert!(result.success());
    }

    let json = world.run(&["files"]).unwrap().json().unwrap();
    assertions::assert_array_len(&json, "", 2).unwrap();
    assert_eq!(json[0]["file_path"], "src/main.rs");
    assert_eq!(json[0]["modifications"], 2);
}
