use agmem_testing::TestWorld;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_config_show_defaults_without_file() {
    let world = TestWorld::new();

    let json = world.run(&["config", "show"]).unwrap().json().unwrap();
    assert_eq!(json["config_file_exists"], false);
    assert_eq!(json["config"]["stale_after_hours"], 24);
    assert_eq!(json["config"]["context_limit"], 10);
    assert!(json["db_path"].as_str().unwrap().ends_with("memory.db"));
}

#[test]
fn test_config_init_then_refuses_overwrite() {
    let world = TestWorld::new();

    let init = world.run(&["config", "init"]).unwrap();
    assert!(init.success(), "config init failed: {}", init.stderr());
    assert!(world.data_dir().join("config.toml").exists());

    let mut cmd = cargo_bin_cmd!("agmem");
    world.configure_command(&mut cmd).args(["config", "init"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    let forced = world.run(&["config", "init", "--force"]).unwrap();
    assert!(forced.success());
}

#[test]
fn test_config_file_changes_defaults() {
    let world = TestWorld::new()
        .with_config("context_limit = 1\ndb_path = \"custom.db\"\n")
        .enter_dir("project-a");

    world.run(&["start", "claude"]).unwrap();
    world.run(&["start", "claude"]).unwrap();
    assert!(world.data_dir().join("custom.db").exists());

    let json = world.run(&["context"]).unwrap().json().unwrap();
    assert_eq!(json["recent_sessions"].as_array().unwrap().len(), 1);
    assert_eq!(json["query"]["limit"], 1);
}

#[test]
fn test_invalid_config_is_reported() {
    let world = TestWorld::new().with_config("context_limit = 0\n");

    let result = world.run(&["stats"]).unwrap();
    assert!(!result.success());
    assert!(result.stderr().contains("context_limit"));
}

#[test]
fn test_missing_schema_file_is_skipped() {
    let world = TestWorld::new()
        .with_config("schema_file = \"missing.sql\"\n")
        .with_env("AGMEM_LOG", "warn");

    let result = world.run(&["stats"]).unwrap();
    assert!(result.success(), "stats failed: {}", result.stderr());
    assert!(result.stderr().contains("schema file not found"));
}

#[test]
fn test_data_dir_from_environment() {
    let world = TestWorld::new();
    let env_dir = world.temp_dir().join("from-env");

    let mut cmd = cargo_bin_cmd!("agmem");
    cmd.env("AGMEM_PATH", &env_dir)
        .env_remove("AGMEM_LOG")
        .current_dir(world.temp_dir())
        .args(["start", "claude"]);
    cmd.assert().success();

    assert!(env_dir.join("memory.db").exists());
}
