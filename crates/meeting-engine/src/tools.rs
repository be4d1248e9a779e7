//! Request/response surface over every public operation, for a host dispatcher.
//!
//! A request is a JSON object naming the tool and carrying its parameters:
//!
//! ```json
//! {"tool": "detect_conflicts",
//!  "params": {"user_id": "u1",
//!             "time_range": {"start": "2026-03-16T09:00:00Z", "end": "2026-03-16T17:00:00Z"}}}
//! ```
//!
//! [`ToolHandler::respond`] always produces a JSON envelope: `{"ok": true, "result": ...}`
//! or `{"ok": false, "error": {"kind": ..., "message": ...}}`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::availability::find_slots;
use crate::config::SchedulingConfig;
use crate::conflict::detect_conflicts;
use crate::effectiveness::score_meeting;
use crate::error::{Result, ScheduleError};
use crate::model::{AvailabilityQuery, TimeRange};
use crate::optimizer::optimize_schedule;
use crate::orchestrator::{MeetingOrchestrator, MeetingPreferences};
use crate::patterns::analyze_patterns;
use crate::provider::DataProvider;
use crate::suggest::SuggestionService;
use crate::workload::balance_workload;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", content = "params", rename_all = "snake_case")]
pub enum ToolCall {
    CreateMeeting {
        title: String,
        participants: Vec<String>,
        /// Minutes.
        duration: i64,
        #[serde(default)]
        preferences: MeetingPreferences,
    },
    #[serde(rename = "find_optimal_slots")]
    FindSlots {
        participants: Vec<String>,
        /// Minutes.
        duration: i64,
        date_range: TimeRange,
    },
    DetectConflicts {
        user_id: String,
        time_range: TimeRange,
    },
    AnalyzePatterns {
        user_id: String,
        period: TimeRange,
    },
    SuggestAgenda {
        meeting_topic: String,
        participants: Vec<String>,
    },
    BalanceWorkload {
        team_members: Vec<String>,
    },
    ScoreMeeting {
        meeting_id: String,
    },
    OptimizeSchedule {
        user_id: String,
    },
}

impl ToolCall {
    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::CreateMeeting { .. } => "create_meeting",
            ToolCall::FindSlots { .. } => "find_optimal_slots",
            ToolCall::DetectConflicts { .. } => "detect_conflicts",
            ToolCall::AnalyzePatterns { .. } => "analyze_patterns",
            ToolCall::SuggestAgenda { .. } => "suggest_agenda",
            ToolCall::BalanceWorkload { .. } => "balance_workload",
            ToolCall::ScoreMeeting { .. } => "score_meeting",
            ToolCall::OptimizeSchedule { .. } => "optimize_schedule",
        }
    }
}

pub struct ToolHandler {
    provider: Arc<dyn DataProvider>,
    suggester: Arc<dyn SuggestionService>,
    orchestrator: MeetingOrchestrator,
}

impl ToolHandler {
    pub fn new(
        provider: Arc<dyn DataProvider>,
        suggester: Arc<dyn SuggestionService>,
        config: SchedulingConfig,
    ) -> Self {
        let orchestrator =
            MeetingOrchestrator::new(Arc::clone(&provider), Arc::clone(&suggester), config);
        Self {
            provider,
            suggester,
            orchestrator,
        }
    }

    /// Run one tool call. `now` anchors the relative horizons.
    pub fn handle(&self, call: &ToolCall, now: DateTime<Utc>) -> Result<Value> {
        debug!(tool = call.name(), "handling tool call");
        let provider = self.provider.as_ref();
        let value = match call {
            ToolCall::CreateMeeting {
                title,
                participants,
                duration,
                preferences,
            } => serde_json::to_value(self.orchestrator.create_meeting(
                title,
                participants,
                *duration,
                preferences,
                now,
            )?)?,
            ToolCall::FindSlots {
                participants,
                duration,
                date_range,
            } => {
                let query = AvailabilityQuery {
                    participants: participants.clone(),
                    duration_minutes: *duration,
                    range: *date_range,
                };
                serde_json::to_value(find_slots(provider, &query)?)?
            }
            ToolCall::DetectConflicts {
                user_id,
                time_range,
            } => serde_json::to_value(detect_conflicts(provider, user_id, time_range)?)?,
            ToolCall::AnalyzePatterns { user_id, period } => {
                serde_json::to_value(analyze_patterns(provider, user_id, period)?)?
            }
            ToolCall::SuggestAgenda {
                meeting_topic,
                participants,
            } => serde_json::to_value(
                self.orchestrator
                    .suggest_agenda(meeting_topic, participants)?,
            )?,
            ToolCall::BalanceWorkload { team_members } => {
                serde_json::to_value(balance_workload(provider, team_members, now)?)?
            }
            ToolCall::ScoreMeeting { meeting_id } => serde_json::to_value(score_meeting(
                provider,
                self.suggester.as_ref(),
                meeting_id,
            )?)?,
            ToolCall::OptimizeSchedule { user_id } => serde_json::to_value(optimize_schedule(
                provider,
                self.suggester.as_ref(),
                user_id,
                now,
            )?)?,
        };
        Ok(value)
    }

    /// Run one tool call and wrap the outcome in the response envelope.
    pub fn respond(&self, call: &ToolCall, now: DateTime<Utc>) -> Value {
        match self.handle(call, now) {
            Ok(result) => json!({ "ok": true, "result": result }),
            Err(e) => error_response(&e),
        }
    }

    /// Parse a raw JSON request and respond to it. Malformed requests are reported
    /// in the same envelope with kind `json`.
    pub fn respond_raw(&self, request: &str, now: DateTime<Utc>) -> Value {
        match serde_json::from_str::<ToolCall>(request) {
            Ok(call) => self.respond(&call, now),
            Err(e) => error_response(&ScheduleError::Json(e)),
        }
    }
}

pub fn error_response(error: &ScheduleError) -> Value {
    json!({
        "ok": false,
        "error": { "kind": error.kind(), "message": error.to_string() }
    })
}

/// Whether a response envelope reports success.
pub fn is_ok(response: &Value) -> bool {
    response.get("ok").and_then(Value::as_bool).unwrap_or(false)
}
