//! Meeting creation: validate participants, pick the first common slot in the
//! coming week, attach a suggested agenda and commit.
//!
//! Slot search and commit form an optimistic transaction. The provider re-checks
//! availability under its write lock; when another orchestration took the slot in
//! between, the search is repeated, up to `max_commit_attempts` times. A meeting
//! id that is already taken is retried the same way under a fresh id.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::availability::find_first_slot;
use crate::config::SchedulingConfig;
use crate::error::{Result, ScheduleError};
use crate::model::{AvailabilityQuery, Meeting, TimeRange, User};
use crate::provider::{require_user, CommitOutcome, DataProvider};
use crate::stats::sort_chronologically;
use crate::suggest::{split_suggestions, SuggestionService};

/// Search horizon `[now, now + 7 days)` for new meetings.
pub const CREATION_HORIZON_DAYS: i64 = 7;

/// Past meetings per participant quoted in the agenda prompt.
const RECENT_MEETINGS_IN_PROMPT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeetingPreferences {
    /// Overrides the configured default location.
    #[serde(default)]
    pub location: Option<String>,
}

pub struct MeetingOrchestrator {
    provider: Arc<dyn DataProvider>,
    suggester: Arc<dyn SuggestionService>,
    config: SchedulingConfig,
}

impl MeetingOrchestrator {
    pub fn new(
        provider: Arc<dyn DataProvider>,
        suggester: Arc<dyn SuggestionService>,
        config: SchedulingConfig,
    ) -> Self {
        Self {
            provider,
            suggester,
            config,
        }
    }

    /// Schedule a meeting at the earliest slot all participants share.
    ///
    /// The agenda is best-effort: a failing suggestion service yields an empty one.
    ///
    /// # Errors
    ///
    /// - [`ScheduleError::NoParticipants`] for an empty participant list.
    /// - [`ScheduleError::UserNotFound`] when a participant does not resolve.
    /// - [`ScheduleError::NoAvailableSlot`] when no slot exists in the horizon, or
    ///   every attempt lost its slot to a concurrent commit.
    pub fn create_meeting(
        &self,
        title: &str,
        participants: &[String],
        duration_minutes: i64,
        preferences: &MeetingPreferences,
        now: DateTime<Utc>,
    ) -> Result<Meeting> {
        if participants.is_empty() {
            return Err(ScheduleError::NoParticipants);
        }
        for id in participants {
            require_user(self.provider.as_ref(), id)?;
        }

        let query = AvailabilityQuery {
            participants: participants.to_vec(),
            duration_minutes,
            range: TimeRange::new(now, now + Duration::days(CREATION_HORIZON_DAYS))?,
        };
        let location = preferences
            .location
            .clone()
            .unwrap_or_else(|| self.config.default_location.clone());
        let mut agenda: Option<Vec<String>> = None;

        for attempt in 1..=self.config.max_commit_attempts {
            let slot = find_first_slot(self.provider.as_ref(), &query)?
                .ok_or(ScheduleError::NoAvailableSlot)?;

            if agenda.is_none() {
                agenda = Some(self.suggest_agenda(title, participants)?);
            }

            let meeting = Meeting {
                id: new_meeting_id(),
                title: title.to_string(),
                participants: participants.to_vec(),
                start: slot.start,
                end: slot.end,
                agenda: agenda.clone().unwrap_or_default(),
                location: location.clone(),
                notes: String::new(),
                effectiveness_score: None,
            };

            match self.provider.commit_meeting(meeting.clone())? {
                CommitOutcome::Committed => {
                    info!(meeting = %meeting.id, attempt, start = %meeting.start, "meeting created");
                    return Ok(meeting);
                }
                CommitOutcome::Conflict { meeting_id } => {
                    warn!(
                        attempt,
                        conflicts_with = %meeting_id,
                        "slot taken before commit, searching again"
                    );
                }
                CommitOutcome::DuplicateId { meeting_id } => {
                    warn!(
                        attempt,
                        meeting = %meeting_id,
                        "meeting id already in use, retrying with a new id"
                    );
                }
            }
        }

        Err(ScheduleError::NoAvailableSlot)
    }

    /// Ask the suggestion service for agenda items for a meeting on `topic`.
    ///
    /// The prompt names each participant and their most recent meeting titles.
    /// Returns at most `max_agenda_items` items, or none if the service fails.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::UserNotFound`] when a participant does not resolve.
    pub fn suggest_agenda(&self, topic: &str, participants: &[String]) -> Result<Vec<String>> {
        let mut lines = Vec::with_capacity(participants.len());
        let mut names = Vec::with_capacity(participants.len());
        for id in participants {
            let user = require_user(self.provider.as_ref(), id)?;
            lines.push(self.recent_meetings_line(&user)?);
            names.push(display_name(&user).to_string());
        }

        let prompt = format!(
            "Generate a structured agenda for a meeting with the following details:\n\
             Topic: {}\n\
             Participants: {}\n\n\
             Consider their recent meetings:\n{}\n\n\
             Generate 3-5 key agenda items that would make this meeting effective.\n\
             Format: Return only the agenda items as a comma-separated list.",
            topic,
            names.join(", "),
            lines.join("\n")
        );

        match self.suggester.generate(&prompt) {
            Ok(text) => {
                let mut items = split_suggestions(&text);
                items.truncate(self.config.max_agenda_items);
                debug!(items = items.len(), "agenda suggested");
                Ok(items)
            }
            Err(e) => {
                warn!(error = %e, "agenda suggestions unavailable, using empty agenda");
                Ok(Vec::new())
            }
        }
    }

    fn recent_meetings_line(&self, user: &User) -> Result<String> {
        let mut meetings = self.provider.get_user_meetings(&user.id)?;
        sort_chronologically(&mut meetings);
        let skip = meetings.len().saturating_sub(RECENT_MEETINGS_IN_PROMPT);
        let titles: Vec<&str> = meetings[skip..].iter().map(|m| m.title.as_str()).collect();
        Ok(format!("- {}: {}", display_name(user), titles.join("; ")))
    }
}

fn display_name(user: &User) -> &str {
    if user.name.is_empty() {
        &user.id
    } else {
        &user.name
    }
}

/// `m` followed by eight hex digits.
fn new_meeting_id() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("m{}", &id[..8])
}
