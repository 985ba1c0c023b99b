//! End-to-end flows through the compiled `passerelle` binary against a
//! throwaway data directory.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// Subcommand first; `--data-dir` belongs to the subcommand.
fn run(data_dir: &TempDir, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("passerelle").expect("binary built");
    cmd.args(args);
    cmd.arg("--data-dir").arg(data_dir.path());
    cmd
}

#[test]
fn seed_then_sync_then_status() {
    let data_dir = TempDir::new().unwrap();

    run(&data_dir, &["seed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Seeded 3 users and 3 signalements"));

    run(&data_dir, &["sync"])
        .assert()
        .success()
        .stdout(predicate::str::contains("push user"))
        .stdout(predicate::str::contains("pull report"));

    let output = run(&data_dir, &["status", "--json"]).output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["entities"][0]["entity"], "user");
    assert_eq!(json["entities"][0]["total_relational"], 3);
    assert_eq!(json["entities"][0]["mapped"], 3);
    assert_eq!(json["entities"][1]["total_relational"], 3);
    assert_eq!(json["entities"][1]["unmapped"], 0);
    assert!(json["last_sync_at"].is_string());
}

#[test]
fn second_sync_updates_instead_of_inserting() {
    let data_dir = TempDir::new().unwrap();
    run(&data_dir, &["seed"]).assert().success();
    run(&data_dir, &["sync"]).assert().success();

    let output = run(&data_dir, &["sync", "--json"]).output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    // Users ran first; the second push touched them as updates only.
    assert_eq!(json[0]["entity"], "user");
    assert_eq!(json[0]["push"]["counts"]["inserted"], 0);
    assert_eq!(json[0]["push"]["counts"]["updated"], 3);
}

#[test]
fn sync_single_entity_leaves_the_other_alone() {
    let data_dir = TempDir::new().unwrap();
    run(&data_dir, &["seed"]).assert().success();
    run(&data_dir, &["sync", "user"]).assert().success();

    let output = run(&data_dir, &["status", "--json"]).output().unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["entities"][0]["total_relational"], 3);
    assert_eq!(json["entities"][1]["total_relational"], 0);
}

#[test]
fn status_on_fresh_data_dir_reports_never_synced() {
    let data_dir = TempDir::new().unwrap();
    run(&data_dir, &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("never"));
}

#[test]
fn sync_on_empty_stores_succeeds() {
    let data_dir = TempDir::new().unwrap();
    run(&data_dir, &["sync"]).assert().success();
}

#[test]
fn unknown_entity_is_rejected() {
    let data_dir = TempDir::new().unwrap();
    run(&data_dir, &["sync", "tile"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown entity type"));
}
