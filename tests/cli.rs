//! End-to-end tests for the `tripforge` binary.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn tripforge(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tripforge").unwrap();
    cmd.env("TRIPFORGE_DB_PATH", dir.path().join("catalog.db"))
        .env_remove("OPENAI_API_KEY")
        .env_remove("TRIPFORGE_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn initialized() -> TempDir {
    let dir = TempDir::new().unwrap();
    tripforge(&dir).arg("init").assert().success();
    dir
}

#[test]
fn help_lists_commands() {
    let dir = TempDir::new().unwrap();
    tripforge(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("normalize"));
}

#[test]
fn init_then_status() {
    let dir = initialized();
    tripforge(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Hotels"));
}

#[test]
fn init_refuses_existing_database() {
    let dir = initialized();
    tripforge(&dir)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn tool_fetch_attractions_returns_envelope() {
    let dir = initialized();
    tripforge(&dir)
        .args(["tool", "fetch_attractions", r#"{"destination": "Luxor", "top_k": 2}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""success": true"#));
}

#[test]
fn tool_rejects_foreign_table() {
    let dir = initialized();
    tripforge(&dir)
        .args(["tool", "query_database", r#"{"sql": "SELECT * FROM SecretTable"}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""success": false"#));
}

#[test]
fn tool_list() {
    let dir = TempDir::new().unwrap();
    tripforge(&dir)
        .args(["--format", "text", "tool", "--list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("semantic_search"));
}

#[test]
fn normalize_repairs_stdin() {
    let dir = TempDir::new().unwrap();
    tripforge(&dir)
        .arg("normalize")
        .write_stdin(r#"{"travel_tips": [], "meals": ["A", "B"]}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""travelTips":[]"#))
        .stdout(predicate::str::contains(r#""dinner":"""#));
}

#[test]
fn normalize_passes_through_garbage() {
    let dir = TempDir::new().unwrap();
    tripforge(&dir)
        .arg("normalize")
        .write_stdin("not json at all")
        .assert()
        .success()
        .stdout("not json at all\n");
}

#[test]
fn plan_without_api_key_fails() {
    let dir = initialized();
    tripforge(&dir)
        .args(["plan", "Luxor", "--start", "2026-03-10", "--end", "2026-03-12"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key"));
}

#[test]
fn plan_requires_initialized_catalog() {
    let dir = TempDir::new().unwrap();
    tripforge(&dir)
        .env("OPENAI_API_KEY", "sk-test")
        .args(["plan", "Luxor", "--start", "2026-03-10", "--end", "2026-03-12"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tripforge init"));
}
