//! Local wall-clock time ↔ UTC instants, via `chrono-tz`.
//!
//! DST handling when resolving a local time in a zone:
//!
//! - ambiguous local times (fall back) resolve to the earliest instant;
//! - nonexistent local times (spring forward) shift forward by one hour, which is
//!   the size of every gap in the IANA zones we schedule against.

use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use chrono_tz::Tz;

use crate::error::{Result, ScheduleError};
use crate::model::User;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse an IANA timezone string into `Tz`.
pub fn parse_timezone(s: &str) -> Result<Tz> {
    s.parse::<Tz>()
        .map_err(|_| ScheduleError::InvalidTimezone(format!("'{}'", s)))
}

/// Parse a `HH:MM` (or `HH:MM:SS`) time of day.
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|e| ScheduleError::InvalidTimeFormat(format!("'{}': {}", s, e)))
}

/// Interpret a local timestamp in `timezone` and return the UTC instant.
///
/// Accepts `YYYY-MM-DDTHH:MM[:SS]` or the same with a space separator. A string that
/// already carries an offset (RFC 3339) is taken at face value.
///
/// # Errors
///
/// Returns [`ScheduleError::InvalidTimezone`] for an unknown zone and
/// [`ScheduleError::InvalidTimeFormat`] when the string cannot be parsed.
pub fn to_utc(local: &str, timezone: &str) -> Result<DateTime<Utc>> {
    let tz = parse_timezone(timezone)?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(local) {
        return Ok(dt.with_timezone(&Utc));
    }
    let naive = parse_naive(local)?;
    localize(&tz, naive)
}

/// Parse an RFC 3339 instant, or a naive timestamp interpreted as UTC.
pub fn parse_instant(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    parse_naive(s).map(|naive| naive.and_utc())
}

/// Resolve a wall-clock time in `tz` to a UTC instant.
pub fn localize(tz: &Tz, naive: NaiveDateTime) -> Result<DateTime<Utc>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| {
                ScheduleError::InvalidTimeFormat(format!("'{}' does not exist in {}", naive, tz))
            }),
    }
}

/// The user's working window on local calendar day `on`, as UTC bounds.
///
/// A window whose end time-of-day precedes its start crosses midnight and ends on
/// the following local day.
pub fn working_window_utc(user: &User, on: NaiveDate) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let tz = parse_timezone(&user.timezone)?;
    working_window_in(&tz, user, on)
}

pub(crate) fn working_window_in(
    tz: &Tz,
    user: &User,
    on: NaiveDate,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let hours = &user.working_hours;
    let start = localize(tz, on.and_time(hours.start))?;
    let end_day = if hours.window().crosses_midnight() {
        on.succ_opt()
            .ok_or_else(|| ScheduleError::InvalidTimeFormat(format!("no day after {}", on)))?
    } else {
        on
    };
    let end = localize(tz, end_day.and_time(hours.end))?;
    Ok((start, end))
}

fn parse_naive(s: &str) -> Result<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| ScheduleError::InvalidTimeFormat(format!("'{}'", s)))
}

// ── Tests ───────────────────────────────────────────────────────────────────
