//! Heuristic effectiveness score for a single meeting.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, ScheduleError};
use crate::model::Meeting;
use crate::provider::DataProvider;
use crate::suggest::{split_suggestions, SuggestionService};

const BASE_SCORE: i32 = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectivenessFactors {
    pub duration_hours: f64,
    pub participant_count: usize,
    pub has_agenda: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectivenessReport {
    pub meeting_id: String,
    /// 0-10 scale, neutral at 7.
    pub effectiveness_score: i32,
    pub factors: EffectivenessFactors,
    pub improvement_suggestions: Vec<String>,
}

/// Score from duration, group size and agenda presence.
///
/// Short meetings (≤ 1 h) gain a point and long ones (> 2 h) lose one; groups of
/// 3-8 gain a point and groups over 12 lose one; having an agenda gains a point.
pub fn score(factors: &EffectivenessFactors) -> i32 {
    let mut score = BASE_SCORE;
    if factors.duration_hours <= 1.0 {
        score += 1;
    } else if factors.duration_hours > 2.0 {
        score -= 1;
    }
    if (3..=8).contains(&factors.participant_count) {
        score += 1;
    } else if factors.participant_count > 12 {
        score -= 1;
    }
    if factors.has_agenda {
        score += 1;
    }
    score
}

pub fn factors_of(meeting: &Meeting) -> EffectivenessFactors {
    EffectivenessFactors {
        duration_hours: meeting.duration_hours(),
        participant_count: meeting.participants.len(),
        has_agenda: !meeting.agenda.is_empty(),
    }
}

/// Score a stored meeting and ask the suggestion service for improvements.
///
/// # Errors
///
/// Returns [`ScheduleError::MeetingNotFound`] if the meeting does not resolve.
pub fn score_meeting(
    provider: &dyn DataProvider,
    suggester: &dyn SuggestionService,
    meeting_id: &str,
) -> Result<EffectivenessReport> {
    let meeting = provider
        .get_meeting(meeting_id)?
        .ok_or_else(|| ScheduleError::MeetingNotFound(meeting_id.to_string()))?;
    let factors = factors_of(&meeting);

    let prompt = format!(
        "Analyze this meeting and suggest improvements:\n\
         - Duration: {} hours\n\
         - Participants: {}\n\
         - Has Agenda: {}\n\
         - Title: {}\n\n\
         Provide 3 specific suggestions to improve meeting effectiveness.\n\
         Format: Return suggestions as a comma-separated list.",
        factors.duration_hours, factors.participant_count, factors.has_agenda, meeting.title
    );
    let improvement_suggestions = match suggester.generate(&prompt) {
        Ok(text) => split_suggestions(&text),
        Err(e) => {
            warn!(meeting = meeting_id, error = %e, "improvement suggestions unavailable");
            Vec::new()
        }
    };

    Ok(EffectivenessReport {
        meeting_id: meeting.id,
        effectiveness_score: score(&factors),
        factors,
        improvement_suggestions,
    })
}
