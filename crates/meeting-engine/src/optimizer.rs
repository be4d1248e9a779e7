//! Schedule diagnostics over the coming 30 days: overloaded days, back-to-back
//! density and recommendations.
//!
//! The deterministic recommendations always come first. Text from the suggestion
//! service is appended after them when the service answers, and silently dropped
//! (with a warning) when it does not.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::model::Meeting;
use crate::provider::{require_user, DataProvider};
use crate::stats::{meetings_starting_in, ratio_or_zero, round2};
use crate::suggest::{split_suggestions, SuggestionService};
use crate::timeconv::parse_timezone;

/// Horizon `[now, now + 30 days)` analyzed by [`optimize_schedule`].
pub const OPTIMIZE_HORIZON_DAYS: i64 = 30;

/// Adjacent meetings separated by less than this are back-to-back.
pub const BACK_TO_BACK_GAP_MINUTES: i64 = 15;

/// A day with more meetings than this is overloaded.
pub const OVERLOAD_MEETING_COUNT: usize = 5;

/// A day with more meeting hours than this is overloaded.
pub const OVERLOAD_HOURS: f64 = 6.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayLoad {
    pub date: NaiveDate,
    pub meeting_count: usize,
    pub meeting_hours: f64,
}

impl DayLoad {
    pub fn is_overloaded(&self) -> bool {
        self.meeting_count > OVERLOAD_MEETING_COUNT || self.meeting_hours > OVERLOAD_HOURS
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleMetrics {
    pub total_meetings: usize,
    /// Meetings per day that has at least one meeting.
    pub avg_daily_meetings: f64,
    pub back_to_back_meetings: usize,
    pub overloaded_days: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationReport {
    pub user_id: String,
    pub schedule_metrics: ScheduleMetrics,
    /// Per-day load, in date order.
    pub daily_load: Vec<DayLoad>,
    pub overloaded_dates: Vec<NaiveDate>,
    pub optimization_recommendations: Vec<String>,
}

/// Count adjacent pairs of `meetings` (already sorted by start) where the next one
/// starts less than 15 minutes after the previous one ends.
///
/// Overlapping pairs have a negative gap and therefore count too.
pub fn count_back_to_back(meetings: &[Meeting]) -> usize {
    let min_gap = Duration::minutes(BACK_TO_BACK_GAP_MINUTES);
    meetings
        .windows(2)
        .filter(|pair| pair[1].start - pair[0].end < min_gap)
        .count()
}

/// Analyze the user's next 30 days and recommend improvements.
///
/// Days are bucketed by the meeting start's calendar date in the user's timezone.
///
/// # Errors
///
/// Returns [`crate::ScheduleError::UserNotFound`] if the user does not resolve and
/// [`crate::ScheduleError::InvalidTimezone`] if their zone is unknown. Suggestion
/// service failures never surface as errors.
pub fn optimize_schedule(
    provider: &dyn DataProvider,
    suggester: &dyn SuggestionService,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<OptimizationReport> {
    let user = require_user(provider, user_id)?;
    let tz = parse_timezone(&user.timezone)?;
    let horizon_end = now + Duration::days(OPTIMIZE_HORIZON_DAYS);
    let meetings = meetings_starting_in(provider, user_id, now, horizon_end)?;

    let mut days: BTreeMap<NaiveDate, DayLoad> = BTreeMap::new();
    for meeting in &meetings {
        let date = meeting.start.with_timezone(&tz).date_naive();
        let day = days.entry(date).or_insert_with(|| DayLoad {
            date,
            meeting_count: 0,
            meeting_hours: 0.0,
        });
        day.meeting_count += 1;
        day.meeting_hours += meeting.duration_hours();
    }

    let overloaded_dates: Vec<NaiveDate> = days
        .values()
        .filter(|d| d.is_overloaded())
        .map(|d| d.date)
        .collect();
    let back_to_back = count_back_to_back(&meetings);
    let avg_daily = round2(ratio_or_zero(meetings.len() as f64, days.len() as f64));

    let mut recommendations = Vec::new();
    if !overloaded_dates.is_empty() {
        let listed: Vec<String> = overloaded_dates.iter().map(|d| d.to_string()).collect();
        recommendations.push(format!(
            "Consider redistributing meetings from overloaded days: {}",
            listed.join(", ")
        ));
    }
    if back_to_back > 0 {
        recommendations.push(format!(
            "You have {} back-to-back meetings. Consider adding buffer time between meetings.",
            back_to_back
        ));
    }

    let prompt = format!(
        "Analyze this schedule and suggest optimizations:\n\
         - Average daily meetings: {}\n\
         - Back-to-back meetings: {}\n\
         - Overloaded days: {}\n\n\
         Provide 2-3 specific suggestions to optimize the schedule.\n\
         Format: Return suggestions as a comma-separated list.",
        avg_daily,
        back_to_back,
        overloaded_dates.len()
    );
    match suggester.generate(&prompt) {
        Ok(text) => recommendations.extend(split_suggestions(&text)),
        Err(e) => warn!(user = user_id, error = %e, "schedule suggestions unavailable"),
    }

    debug!(
        user = user_id,
        meetings = meetings.len(),
        back_to_back,
        overloaded = overloaded_dates.len(),
        "schedule optimized"
    );

    Ok(OptimizationReport {
        user_id: user.id,
        schedule_metrics: ScheduleMetrics {
            total_meetings: meetings.len(),
            avg_daily_meetings: avg_daily,
            back_to_back_meetings: back_to_back,
            overloaded_days: overloaded_dates.len(),
        },
        daily_load: days
            .into_values()
            .map(|d| DayLoad {
                meeting_hours: round2(d.meeting_hours),
                ..d
            })
            .collect(),
        overloaded_dates,
        optimization_recommendations: recommendations,
    })
}
