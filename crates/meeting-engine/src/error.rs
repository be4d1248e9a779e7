//! Error types for meeting-engine operations.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("User {0} not found")]
    UserNotFound(String),

    #[error("Meeting {0} not found")]
    MeetingNotFound(String),

    #[error("No suitable time slots found for all participants")]
    NoAvailableSlot,

    #[error("Duplicate user id {0}")]
    DuplicateUser(String),

    #[error("Duplicate meeting id {0}")]
    DuplicateMeeting(String),

    #[error("Team member list is empty")]
    EmptyTeam,

    #[error("A meeting needs at least one participant")]
    NoParticipants,

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid time format: {0}")]
    InvalidTimeFormat(String),

    #[error("Invalid range: end {end} is before start {start}")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Invalid duration: {0} minutes (must be positive)")]
    InvalidDuration(i64),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScheduleError {
    /// Stable tag for reporting the failure across the tool surface.
    pub fn kind(&self) -> &'static str {
        match self {
            ScheduleError::UserNotFound(_) => "user_not_found",
            ScheduleError::MeetingNotFound(_) => "meeting_not_found",
            ScheduleError::NoAvailableSlot => "no_available_slot",
            ScheduleError::DuplicateUser(_) => "duplicate_user",
            ScheduleError::DuplicateMeeting(_) => "duplicate_meeting",
            ScheduleError::EmptyTeam => "empty_team",
            ScheduleError::NoParticipants => "no_participants",
            ScheduleError::InvalidTimezone(_) => "invalid_timezone",
            ScheduleError::InvalidTimeFormat(_) => "invalid_time_format",
            ScheduleError::InvalidRange { .. } => "invalid_range",
            ScheduleError::InvalidDuration(_) => "invalid_duration",
            ScheduleError::Storage(_) => "storage",
            ScheduleError::Config(_) => "config",
            ScheduleError::Json(_) => "json",
            ScheduleError::Io(_) => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
