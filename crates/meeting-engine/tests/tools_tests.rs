//! Tests for the JSON tool surface and its response envelope.

mod common;

use std::sync::Arc;

use common::*;
use meeting_engine::config::SchedulingConfig;
use meeting_engine::tools::is_ok;
use meeting_engine::{FixedSuggestions, NoSuggestions, SuggestionService, ToolCall, ToolHandler};
use serde_json::{json, Value};

const NOW: &str = "2026-03-16T08:00:00Z";

fn handler(suggester: Arc<dyn SuggestionService>) -> ToolHandler {
    let store = store(
        vec![utc_user("alice"), utc_user("bob")],
        vec![
            scored(
                meeting("m1", &["alice", "bob"], "2026-03-16T09:00:00Z", "2026-03-16T10:00:00Z"),
                8.0,
            ),
            meeting("m2", &["alice"], "2026-03-16T10:05:00Z", "2026-03-16T11:00:00Z"),
        ],
    );
    ToolHandler::new(store, suggester, SchedulingConfig::default())
}

fn call(h: &ToolHandler, request: Value) -> Value {
    h.respond_raw(&request.to_string(), at(NOW))
}

fn error_kind(response: &Value) -> &str {
    response["error"]["kind"].as_str().unwrap()
}

// ── Test 1: every tool answers in the success envelope ──────────────────────

#[test]
fn find_optimal_slots() {
    let h = handler(Arc::new(NoSuggestions));

    let r = call(
        &h,
        json!({"tool": "find_optimal_slots", "params": {
            "participants": ["alice", "bob"],
            "duration": 60,
            "date_range": {"start": "2026-03-16T11:00:00Z", "end": "2026-03-16T12:00:00Z"}
        }}),
    );

    assert!(is_ok(&r));
    assert_eq!(
        r["result"],
        json!([
            {"start": "2026-03-16T11:00:00Z", "end": "2026-03-16T12:00:00Z"},
            {"start": "2026-03-16T11:30:00Z", "end": "2026-03-16T12:30:00Z"}
        ])
    );
}

#[test]
fn detect_conflicts() {
    let h = handler(Arc::new(NoSuggestions));

    let r = call(
        &h,
        json!({"tool": "detect_conflicts", "params": {
            "user_id": "alice",
            "time_range": {"start": "2026-03-16T10:00:00Z", "end": "2026-03-16T10:30:00Z"}
        }}),
    );

    assert!(is_ok(&r));
    let ids: Vec<&str> = r["result"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["meeting_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["m1", "m2"]);
}

#[test]
fn analyze_patterns() {
    let h = handler(Arc::new(NoSuggestions));

    let r = call(
        &h,
        json!({"tool": "analyze_patterns", "params": {
            "user_id": "alice",
            "period": {"start": "2026-03-16T00:00:00", "end": "2026-03-22T00:00:00"}
        }}),
    );

    assert!(is_ok(&r));
    assert_eq!(r["result"]["total_meetings"], 2);
    assert_eq!(r["result"]["most_common_day"], "Monday");
    assert_eq!(r["result"]["avg_effectiveness"], 8.0);
}

#[test]
fn balance_workload() {
    let h = handler(Arc::new(NoSuggestions));

    let r = call(
        &h,
        json!({"tool": "balance_workload", "params": {"team_members": ["alice", "bob"]}}),
    );

    assert!(is_ok(&r));
    let team = r["result"]["team_workload"].as_array().unwrap();
    assert_eq!(team.len(), 2);
    // alice 1.92 h, bob 1 h against an average of 1.46 h
    assert_eq!(team[0]["user_id"], "alice");
    assert_eq!(team[0]["status"], "Overloaded");
    assert_eq!(team[1]["status"], "Underutilized");
}

#[test]
fn optimize_schedule_with_suggestions() {
    let h = handler(Arc::new(FixedSuggestions::new("Add buffers, Batch syncs")));

    let r = call(
        &h,
        json!({"tool": "optimize_schedule", "params": {"user_id": "alice"}}),
    );

    assert!(is_ok(&r));
    assert_eq!(r["result"]["schedule_metrics"]["back_to_back_meetings"], 1);
    let recs = r["result"]["optimization_recommendations"].as_array().unwrap();
    assert_eq!(recs.len(), 3);
    assert_eq!(recs[2], "Batch syncs");
}

#[test]
fn score_meeting() {
    let h = handler(Arc::new(NoSuggestions));

    let r = call(
        &h,
        json!({"tool": "score_meeting", "params": {"meeting_id": "m1"}}),
    );

    assert!(is_ok(&r));
    // one hour, two people, no agenda
    assert_eq!(r["result"]["effectiveness_score"], 8);
    assert_eq!(r["result"]["improvement_suggestions"], json!([]));
}

#[test]
fn suggest_agenda() {
    let h = handler(Arc::new(FixedSuggestions::new("Intro, Demo, Q&A")));

    let r = call(
        &h,
        json!({"tool": "suggest_agenda", "params": {
            "meeting_topic": "Launch", "participants": ["alice"]
        }}),
    );

    assert!(is_ok(&r));
    assert_eq!(r["result"], json!(["Intro", "Demo", "Q&A"]));
}

#[test]
fn create_meeting() {
    let h = handler(Arc::new(NoSuggestions));

    let r = call(
        &h,
        json!({"tool": "create_meeting", "params": {
            "title": "Retro", "participants": ["alice", "bob"], "duration": 30,
            "preferences": {"location": "Room 2"}
        }}),
    );

    assert!(is_ok(&r));
    let m = &r["result"];
    assert!(m["meeting_id"].as_str().unwrap().starts_with('m'));
    assert_eq!(m["start_time"], "2026-03-16T11:00:00Z");
    assert_eq!(m["location"], "Room 2");
}

// ── Test 2: failures use the error envelope ─────────────────────────────────

#[test]
fn domain_errors_carry_their_kind() {
    let h = handler(Arc::new(NoSuggestions));

    let unknown_user = call(
        &h,
        json!({"tool": "optimize_schedule", "params": {"user_id": "ghost"}}),
    );
    assert!(!is_ok(&unknown_user));
    assert_eq!(error_kind(&unknown_user), "user_not_found");
    assert_eq!(unknown_user["error"]["message"], "User ghost not found");

    let unknown_meeting = call(
        &h,
        json!({"tool": "score_meeting", "params": {"meeting_id": "nope"}}),
    );
    assert_eq!(error_kind(&unknown_meeting), "meeting_not_found");

    let empty_team = call(
        &h,
        json!({"tool": "balance_workload", "params": {"team_members": []}}),
    );
    assert_eq!(error_kind(&empty_team), "empty_team");

    let bad_duration = call(
        &h,
        json!({"tool": "find_optimal_slots", "params": {
            "participants": ["alice"], "duration": -30,
            "date_range": {"start": "2026-03-16T09:00:00Z", "end": "2026-03-16T10:00:00Z"}
        }}),
    );
    assert_eq!(error_kind(&bad_duration), "invalid_duration");
}

#[test]
fn malformed_requests_are_json_errors() {
    let h = handler(Arc::new(NoSuggestions));

    let unknown_tool = call(&h, json!({"tool": "book_room", "params": {}}));
    assert_eq!(error_kind(&unknown_tool), "json");

    let missing_param = call(&h, json!({"tool": "score_meeting", "params": {}}));
    assert_eq!(error_kind(&missing_param), "json");

    let not_json = h.respond_raw("create_meeting please", at(NOW));
    assert!(!is_ok(&not_json));
    assert_eq!(error_kind(&not_json), "json");
}

// ── Test 3: request parsing ─────────────────────────────────────────────────

#[test]
fn tool_names_match_wire_tags() {
    let parsed: ToolCall = serde_json::from_value(json!({
        "tool": "find_optimal_slots",
        "params": {
            "participants": ["alice"],
            "duration": 30,
            "date_range": {"start": "2026-03-16T09:00:00Z", "end": "2026-03-16T10:00:00Z"}
        }
    }))
    .unwrap();
    assert_eq!(parsed.name(), "find_optimal_slots");

    let parsed: ToolCall = serde_json::from_value(json!({
        "tool": "create_meeting",
        "params": {"title": "Sync", "participants": ["alice"], "duration": 30}
    }))
    .unwrap();
    assert_eq!(parsed.name(), "create_meeting");
    let ToolCall::CreateMeeting { preferences, .. } = parsed else {
        panic!("expected create_meeting");
    };
    assert_eq!(preferences.location, None);
}
