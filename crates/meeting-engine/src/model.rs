//! Records owned by the data provider and the value types exchanged with callers.
//!
//! Field names on the wire follow the meeting data file layout (`user_id`,
//! `meeting_id`, `start_time`, ...). Time-of-day values travel as `HH:MM`, blackout
//! windows as `HH:MM-HH:MM`, and instants as RFC 3339.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, ScheduleError};
use crate::timeconv::parse_time_of_day;

/// Location given to meetings created without an explicit one.
pub const DEFAULT_LOCATION: &str = "Virtual";

/// A local time-of-day window, inclusive at both ends.
///
/// When `end < start` the window crosses midnight (e.g. `22:00-02:00`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Whether `t` falls inside the window, boundaries included.
    pub fn contains(&self, t: NaiveTime) -> bool {
        if self.start <= self.end {
            self.start <= t && t <= self.end
        } else {
            t >= self.start || t <= self.end
        }
    }

    pub fn crosses_midnight(&self) -> bool {
        self.end < self.start
    }
}

impl FromStr for TimeWindow {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| {
                ScheduleError::InvalidTimeFormat(format!("'{}': expected HH:MM-HH:MM", s))
            })?;
        Ok(Self {
            start: parse_time_of_day(start.trim())?,
            end: parse_time_of_day(end.trim())?,
        })
    }
}

impl TryFrom<String> for TimeWindow {
    type Error = ScheduleError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<TimeWindow> for String {
    fn from(w: TimeWindow) -> String {
        w.to_string()
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", format_hhmm(self.start), format_hhmm(self.end))
    }
}

/// A user's daily working hours, as local times of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl WorkingHours {
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start, self.end)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Blackout windows during which no meeting should start.
    #[serde(default, deserialize_with = "null_as_default")]
    pub no_meetings: Vec<TimeWindow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "user_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// IANA timezone identifier, validated when the user is scheduled.
    pub timezone: String,
    pub working_hours: WorkingHours,
    #[serde(default)]
    pub preferences: Preferences,
}

impl User {
    pub fn blackouts(&self) -> &[TimeWindow] {
        &self.preferences.no_meetings
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    #[serde(rename = "meeting_id")]
    pub id: String,
    pub title: String,
    pub participants: Vec<String>,
    #[serde(rename = "start_time", deserialize_with = "instant")]
    pub start: DateTime<Utc>,
    #[serde(rename = "end_time", deserialize_with = "instant")]
    pub end: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub agenda: Vec<String>,
    #[serde(default = "default_location", deserialize_with = "null_as_location")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: String,
    /// Post-hoc rating, only present once the meeting has happened.
    #[serde(default)]
    pub effectiveness_score: Option<f64>,
}

impl Meeting {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn duration_hours(&self) -> f64 {
        self.duration().num_seconds() as f64 / 3600.0
    }

    pub fn has_participant(&self, user_id: &str) -> bool {
        self.participants.iter().any(|p| p == user_id)
    }

    /// Exclusive-boundary overlap: touching intervals do not overlap.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end && end > self.start
    }

    /// Structural checks every stored meeting must satisfy.
    pub fn validate(&self) -> Result<()> {
        if self.participants.is_empty() {
            return Err(ScheduleError::NoParticipants);
        }
        if self.start >= self.end {
            return Err(ScheduleError::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

/// A candidate or confirmed meeting interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeSlot {
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// A half-open or closed search range, depending on the operation using it.
///
/// Bounds deserialize from RFC 3339, or from naive timestamps taken as UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(deserialize_with = "instant")]
    pub start: DateTime<Utc>,
    #[serde(deserialize_with = "instant")]
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    /// Rejects ranges whose end is before their start. Empty ranges are valid.
    pub fn validate(&self) -> Result<()> {
        if self.end < self.start {
            return Err(ScheduleError::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityQuery {
    pub participants: Vec<String>,
    pub duration_minutes: i64,
    pub range: TimeRange,
}

/// The reportable subset of a meeting found to overlap a queried range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictRecord {
    pub meeting_id: String,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub participants: Vec<String>,
}

impl From<&Meeting> for ConflictRecord {
    fn from(m: &Meeting) -> Self {
        Self {
            meeting_id: m.id.clone(),
            title: m.title.clone(),
            start_time: m.start,
            end_time: m.end,
            participants: m.participants.clone(),
        }
    }
}

fn default_location() -> String {
    DEFAULT_LOCATION.to_string()
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_location<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_location))
}

fn instant<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    crate::timeconv::parse_instant(&s).map_err(serde::de::Error::custom)
}

fn format_hhmm(t: NaiveTime) -> String {
    use chrono::Timelike;
    if t.second() == 0 {
        t.format("%H:%M").to_string()
    } else {
        t.format("%H:%M:%S").to_string()
    }
}

mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_hhmm(*t))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        crate::timeconv::parse_time_of_day(&s).map_err(serde::de::Error::custom)
    }
}
