//! Smoke tests -- verify the binary runs and the subcommands are wired.

use assert_cmd::Command;
use predicates::prelude::*;

fn ferrywatch() -> Command {
    let mut cmd = Command::cargo_bin("ferrywatch").unwrap();
    cmd.env_remove("FERRYWATCH_CONFIG").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_help() {
    ferrywatch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicates::str::contains("Periodic ferry route status checker"));
}

#[test]
fn test_cli_version() {
    ferrywatch()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicates::str::contains("ferrywatch"));
}

#[test]
fn test_subcommands_exist() {
    for sub in ["check", "watch", "routes", "history", "next-runs"] {
        ferrywatch().args([sub, "--help"]).assert().success();
    }
}

#[test]
fn test_check_with_missing_registry_reports_error_object() {
    let dir = tempfile::TempDir::new().unwrap();
    let routes = dir.path().join("missing.yaml");
    let history = dir.path().join("history.json");

    ferrywatch()
        .arg("--routes")
        .arg(&routes)
        .arg("--history")
        .arg(&history)
        .args(["check", "--json"])
        .assert()
        .failure()
        .stdout(predicates::str::contains("\"status\": \"error\""))
        .stdout(predicates::str::contains("failed to load routes"));

    assert!(!history.exists());
}

#[test]
fn test_routes_lists_valid_entries() {
    let dir = tempfile::TempDir::new().unwrap();
    let routes = dir.path().join("routes.yaml");
    std::fs::write(
        &routes,
        "Routes:\n  - ID: 4\n    Name: Largs - Cumbrae\n    Status_URL: https://example.org/4\n  - ID: 5\n    Name: Broken\n",
    )
    .unwrap();

    ferrywatch()
        .arg("--routes")
        .arg(&routes)
        .arg("routes")
        .assert()
        .success()
        .stdout(predicates::str::contains("Largs - Cumbrae"))
        .stdout(predicates::str::contains("Broken").not());
}

#[test]
fn test_history_on_empty_store() {
    let dir = tempfile::TempDir::new().unwrap();
    ferrywatch()
        .arg("--history")
        .arg(dir.path().join("none.json"))
        .args(["history", "--json"])
        .assert()
        .success()
        .stdout(predicates::str::contains("[]"));
}

#[test]
fn test_next_runs_preview() {
    ferrywatch()
        .args(["next-runs", "--count", "2"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Upcoming runs (0 */15 * * * *)"));
}
