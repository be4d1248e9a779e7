//! Integration tests for the `meetplan` CLI binary.
//!
//! These run the actual binary against the `team.json` fixture and check the JSON
//! envelope on stdout, the exit status and data file write-back.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

/// Helper: path to the team.json fixture.
fn team_json_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/team.json")
}

/// Helper: path to the meetplan.toml fixture.
fn config_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/meetplan.toml")
}

/// Helper: `meetplan --data team.json --now 2026-03-16T00:00:00Z`.
fn meetplan() -> Command {
    let mut cmd = Command::cargo_bin("meetplan").unwrap();
    cmd.args(["--data", team_json_path(), "--now", "2026-03-16T00:00:00Z"]);
    cmd
}

fn parse_stdout(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("stdout must be a JSON document")
}

// ─────────────────────────────────────────────────────────────────────────────
// Operation subcommands
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn slots_respect_calendars_blackouts_and_zones() {
    // Test 1: u1 (London, lunch blackout) and u2 (New York) on Monday afternoon
    let output = meetplan()
        .args([
            "slots",
            "-p",
            "u1,u2",
            "-d",
            "60",
            "--start",
            "2026-03-16T12:00:00Z",
            "--end",
            "2026-03-16T18:00:00Z",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let response = parse_stdout(&output.stdout);
    assert_eq!(response["ok"], true);
    let starts: Vec<&str> = response["result"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["start"].as_str().unwrap())
        .collect();
    assert_eq!(
        starts,
        vec![
            "2026-03-16T16:00:00Z",
            "2026-03-16T16:30:00Z",
            "2026-03-16T17:00:00Z"
        ]
    );
}

#[test]
fn conflicts_include_touching_meetings() {
    // Test 2: m1 ends and m2 starts exactly on the range bounds
    meetplan()
        .args([
            "conflicts",
            "-u",
            "u1",
            "--start",
            "2026-03-16T15:00:00Z",
            "--end",
            "2026-03-16T15:05:00Z",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"m1\""))
        .stdout(predicate::str::contains("\"m2\""));
}

#[test]
fn patterns_accept_naive_instants() {
    // Test 3
    let output = meetplan()
        .args([
            "patterns",
            "-u",
            "u1",
            "--start",
            "2026-03-16T00:00:00",
            "--end",
            "2026-03-22T23:59:59",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let response = parse_stdout(&output.stdout);
    assert_eq!(response["result"]["total_meetings"], 2);
    assert_eq!(response["result"]["most_common_day"], "Monday");
}

#[test]
fn workload_classifies_members() {
    // Test 4: u1 1.92 h, u2 1 h, u3 2 h over the week from --now
    let output = meetplan()
        .args(["workload", "-m", "u1,u2,u3"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let response = parse_stdout(&output.stdout);
    let team = response["result"]["team_workload"].as_array().unwrap();
    let statuses: Vec<&str> = team.iter().map(|s| s["status"].as_str().unwrap()).collect();
    assert_eq!(statuses, vec!["Balanced", "Underutilized", "Overloaded"]);
}

#[test]
fn optimize_reports_back_to_back_meetings() {
    // Test 5: m1 ends at 15:00 and m2 starts at 15:05
    meetplan()
        .args(["optimize", "-u", "u1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("You have 1 back-to-back meetings"));
}

#[test]
fn score_meeting() {
    // Test 6: two hours, one participant, with agenda
    meetplan()
        .args(["score", "-m", "m3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"effectiveness_score\": 8"));
}

// ─────────────────────────────────────────────────────────────────────────────
// create: write-back to the data file
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn create_commits_and_persists() {
    // Test 7: work on a copy so the fixture stays pristine
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("team.json");
    std::fs::copy(team_json_path(), &data).unwrap();

    let output = Command::cargo_bin("meetplan")
        .unwrap()
        .args(["--data", data.to_str().unwrap()])
        .args(["--now", "2026-03-16T08:00:00Z"])
        .args(["create", "-t", "Pairing", "-p", "u1,u3", "-d", "30"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let response = parse_stdout(&output.stdout);
    assert_eq!(response["result"]["start_time"], "2026-03-16T09:00:00Z");
    assert_eq!(response["result"]["location"], "Virtual");

    let saved: Value = serde_json::from_str(&std::fs::read_to_string(&data).unwrap()).unwrap();
    assert_eq!(saved["meetings"].as_array().unwrap().len(), 4);
}

// ─────────────────────────────────────────────────────────────────────────────
// Config file
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn config_supplies_suggestions_and_limits() {
    // Test 8: canned suggestions truncated to max_agenda_items = 2
    let output = meetplan()
        .args(["--config", config_path()])
        .args(["agenda", "-t", "Sprint review", "-p", "u1,u2"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let response = parse_stdout(&output.stdout);
    assert_eq!(
        response["result"],
        serde_json::json!(["Review blockers", "Demo progress"])
    );
}

#[test]
fn config_without_persistence_leaves_data_file_alone() {
    // Test 9
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("team.json");
    std::fs::copy(team_json_path(), &data).unwrap();
    let before = std::fs::read_to_string(&data).unwrap();

    Command::cargo_bin("meetplan")
        .unwrap()
        .args(["--config", config_path(), "--data", data.to_str().unwrap()])
        .args(["--now", "2026-03-16T08:00:00Z"])
        .args(["create", "-t", "Pairing", "-p", "u3", "-d", "30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"location\": \"HQ\""));

    assert_eq!(std::fs::read_to_string(&data).unwrap(), before);
}

#[test]
fn unreadable_config_fails() {
    // Test 10
    Command::cargo_bin("meetplan")
        .unwrap()
        .args(["--config", "/nonexistent/meetplan.toml", "workload", "-m", "u1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}

// ─────────────────────────────────────────────────────────────────────────────
// call: raw tool requests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn call_reads_request_from_stdin() {
    // Test 11
    meetplan()
        .arg("call")
        .write_stdin(r#"{"tool":"detect_conflicts","params":{"user_id":"u3","time_range":{"start":"2026-03-16T11:00:00Z","end":"2026-03-16T11:30:00Z"}}}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("Architecture deep dive"));
}

#[test]
fn call_reads_request_from_file() {
    // Test 12
    let dir = tempfile::tempdir().unwrap();
    let request = dir.path().join("request.json");
    std::fs::write(
        &request,
        r#"{"tool":"balance_workload","params":{"team_members":["u3"]}}"#,
    )
    .unwrap();

    meetplan()
        .args(["call", "-i", request.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_team_hours\": 2.0"));
}

#[test]
fn malformed_request_is_a_json_error() {
    // Test 13
    meetplan()
        .arg("call")
        .write_stdin("not json at all")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"ok\": false"))
        .stdout(predicate::str::contains("\"kind\": \"json\""));
}

// ─────────────────────────────────────────────────────────────────────────────
// Failures
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn unknown_user_exits_with_typed_error() {
    // Test 14
    meetplan()
        .args(["optimize", "-u", "ghost"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"kind\": \"user_not_found\""))
        .stdout(predicate::str::contains("User ghost not found"));
}

#[test]
fn invalid_now_is_rejected_by_argument_parsing() {
    // Test 15
    Command::cargo_bin("meetplan")
        .unwrap()
        .args(["--now", "next tuesday", "workload", "-m", "u1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid time format"));
}

#[test]
fn subcommand_is_required() {
    // Test 16
    Command::cargo_bin("meetplan")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
