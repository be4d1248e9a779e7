//! # meeting-engine
//!
//! Deterministic meeting scheduling for AI calendar agents.
//!
//! The engine computes common availability across participants, detects calendar
//! conflicts, measures workload distribution and produces schedule diagnostics.
//! Every computation reads through an injected [`DataProvider`]; text from the
//! external [`SuggestionService`] only ever decorates results and never changes a
//! scheduling decision. Operations that look at "the coming week" take an explicit
//! `now` anchor instead of reading the system clock.
//!
//! ## Modules
//!
//! - [`timeconv`]: Local wall-clock time + IANA zone → UTC instants, working windows
//! - [`availability`]: Common free slots on a 30-minute grid
//! - [`conflict`]: A user's meetings touching a time range
//! - [`workload`]: Team meeting-load balance over the next 7 days
//! - [`optimizer`]: Overloaded days and back-to-back density over the next 30 days
//! - [`patterns`]: Day/hour distributions and effectiveness statistics
//! - [`effectiveness`]: Heuristic score for a single meeting
//! - [`orchestrator`]: Find-slot-then-commit meeting creation, agenda suggestions
//! - [`model`]: Users, meetings, slots and the values exchanged with callers
//! - [`provider`]: Data provider contract and the in-memory / JSON-file store
//! - [`suggest`]: Suggestion service contract
//! - [`tools`]: JSON request/response surface over all operations
//! - [`config`]: TOML configuration
//! - [`error`]: Error types

pub mod availability;
pub mod config;
pub mod conflict;
pub mod effectiveness;
pub mod error;
pub mod model;
pub mod optimizer;
pub mod orchestrator;
pub mod patterns;
pub mod provider;
mod stats;
pub mod suggest;
pub mod timeconv;
pub mod tools;
pub mod workload;

pub use availability::{find_first_slot, find_slots};
pub use config::Config;
pub use conflict::detect_conflicts;
pub use effectiveness::{score_meeting, EffectivenessReport};
pub use error::ScheduleError;
pub use model::{
    AvailabilityQuery, ConflictRecord, Meeting, Preferences, TimeRange, TimeSlot, TimeWindow,
    User, WorkingHours,
};
pub use optimizer::{optimize_schedule, OptimizationReport};
pub use orchestrator::{MeetingOrchestrator, MeetingPreferences};
pub use patterns::{analyze_patterns, Histogram, PatternReport};
pub use provider::{CommitOutcome, DataProvider, MeetingStore};
pub use suggest::{FixedSuggestions, NoSuggestions, SuggestionError, SuggestionService};
pub use timeconv::{to_utc, working_window_utc};
pub use tools::{ToolCall, ToolHandler};
pub use workload::{balance_workload, LoadStatus, WorkloadReport, WorkloadSample};
