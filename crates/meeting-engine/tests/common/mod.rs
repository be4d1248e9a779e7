//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Utc};
use meeting_engine::timeconv::parse_time_of_day;
use meeting_engine::{
    Meeting, MeetingStore, Preferences, SuggestionError, SuggestionService, TimeRange, User,
    WorkingHours,
};

/// Parse an RFC 3339 instant.
pub fn at(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

pub fn range(start: &str, end: &str) -> TimeRange {
    TimeRange {
        start: at(start),
        end: at(end),
    }
}

pub fn user(id: &str, tz: &str, start: &str, end: &str) -> User {
    User {
        id: id.to_string(),
        name: format!("{} name", id),
        timezone: tz.to_string(),
        working_hours: WorkingHours {
            start: parse_time_of_day(start).unwrap(),
            end: parse_time_of_day(end).unwrap(),
        },
        preferences: Preferences::default(),
    }
}

/// A UTC user working 09:00-17:00.
pub fn utc_user(id: &str) -> User {
    user(id, "UTC", "09:00", "17:00")
}

pub fn with_blackouts(mut u: User, windows: &[&str]) -> User {
    u.preferences.no_meetings = windows.iter().map(|w| w.parse().unwrap()).collect();
    u
}

pub fn meeting(id: &str, participants: &[&str], start: &str, end: &str) -> Meeting {
    Meeting {
        id: id.to_string(),
        title: format!("Meeting {}", id),
        participants: participants.iter().map(|p| p.to_string()).collect(),
        start: at(start),
        end: at(end),
        agenda: Vec::new(),
        location: "Virtual".to_string(),
        notes: String::new(),
        effectiveness_score: None,
    }
}

pub fn scored(mut m: Meeting, score: f64) -> Meeting {
    m.effectiveness_score = Some(score);
    m
}

pub fn store(users: Vec<User>, meetings: Vec<Meeting>) -> Arc<MeetingStore> {
    Arc::new(MeetingStore::new(users, meetings).unwrap())
}

pub fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// A suggestion service that always errors.
pub struct FailingSuggestions;

impl SuggestionService for FailingSuggestions {
    fn generate(&self, _prompt: &str) -> Result<String, SuggestionError> {
        Err(SuggestionError::Failed("timed out".to_string()))
    }
}
