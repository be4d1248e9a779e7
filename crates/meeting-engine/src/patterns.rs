//! Day-of-week / hour-of-day distributions and effectiveness statistics for a
//! user's meetings over an arbitrary period.

use chrono::Timelike;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::error::Result;
use crate::model::{Meeting, TimeRange};
use crate::provider::{require_user, DataProvider};
use crate::stats::{round2, sort_chronologically};
use crate::timeconv::parse_timezone;

/// Counts per key, kept in the order each key was first recorded.
///
/// Serializes as a JSON object whose keys appear in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram<K> {
    buckets: Vec<(K, usize)>,
}

impl<K> Default for Histogram<K> {
    fn default() -> Self {
        Self {
            buckets: Vec::new(),
        }
    }
}

impl<K: PartialEq> Histogram<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, key: K) {
        match self.buckets.iter_mut().find(|(k, _)| *k == key) {
            Some((_, count)) => *count += 1,
            None => self.buckets.push((key, 1)),
        }
    }

    pub fn count(&self, key: &K) -> usize {
        self.buckets
            .iter()
            .find(|(k, _)| k == key)
            .map_or(0, |(_, count)| *count)
    }

    /// The key with the highest count; ties go to the key recorded first.
    pub fn most_common(&self) -> Option<&K> {
        let mut best: Option<&(K, usize)> = None;
        for bucket in &self.buckets {
            if best.is_none_or(|b| bucket.1 > b.1) {
                best = Some(bucket);
            }
        }
        best.map(|(k, _)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, usize)> {
        self.buckets.iter().map(|(k, c)| (k, *c))
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

impl<K: Serialize> Serialize for Histogram<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.buckets.len()))?;
        for (key, count) in &self.buckets {
            map.serialize_entry(key, count)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternReport {
    pub user_id: String,
    pub period: TimeRange,
    pub total_meetings: usize,
    pub total_hours: f64,
    pub avg_daily_meetings: f64,
    /// Keyed by English weekday name (`"Monday"`), local to the user.
    pub day_distribution: Histogram<String>,
    /// Keyed by local hour of day, 0-23.
    pub hour_distribution: Histogram<u32>,
    /// Mean over meetings that have a recorded score; `None` when none do.
    pub avg_effectiveness: Option<f64>,
    pub most_common_day: Option<String>,
    pub most_common_hour: Option<u32>,
}

/// Summarize the user's meetings starting within `[period.start, period.end]`
/// (both ends inclusive).
///
/// Weekdays and hours are taken in the user's timezone. Meetings are visited in
/// chronological order, so "most common" ties resolve to whichever day or hour
/// occurred first in the period.
///
/// # Errors
///
/// Returns [`crate::ScheduleError::UserNotFound`] if the user does not resolve and
/// [`crate::ScheduleError::InvalidRange`] if the period ends before it starts.
pub fn analyze_patterns(
    provider: &dyn DataProvider,
    user_id: &str,
    period: &TimeRange,
) -> Result<PatternReport> {
    let user = require_user(provider, user_id)?;
    period.validate()?;
    let tz = parse_timezone(&user.timezone)?;

    let mut meetings: Vec<Meeting> = provider
        .get_user_meetings(user_id)?
        .into_iter()
        .filter(|m| period.start <= m.start && m.start <= period.end)
        .collect();
    sort_chronologically(&mut meetings);

    let mut day_distribution = Histogram::new();
    let mut hour_distribution = Histogram::new();
    let mut scores = Vec::new();
    for meeting in &meetings {
        let local = meeting.start.with_timezone(&tz);
        day_distribution.record(local.format("%A").to_string());
        hour_distribution.record(local.hour());
        if let Some(score) = meeting.effectiveness_score {
            scores.push(score);
        }
    }

    let total_hours: f64 = meetings.iter().map(|m| m.duration_hours()).sum();
    let day_span = (period.end - period.start).num_days() + 1;
    let avg_effectiveness =
        (!scores.is_empty()).then(|| round2(scores.iter().sum::<f64>() / scores.len() as f64));

    debug!(
        user = user_id,
        meetings = meetings.len(),
        day_span,
        "meeting patterns analyzed"
    );

    Ok(PatternReport {
        user_id: user.id,
        period: *period,
        total_meetings: meetings.len(),
        total_hours: round2(total_hours),
        avg_daily_meetings: round2(meetings.len() as f64 / day_span as f64),
        most_common_day: day_distribution.most_common().cloned(),
        most_common_hour: hour_distribution.most_common().copied(),
        day_distribution,
        hour_distribution,
        avg_effectiveness,
    })
}
