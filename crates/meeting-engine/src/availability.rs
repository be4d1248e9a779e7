//! Common availability across participants on a fixed 30-minute grid.
//!
//! Candidate starts are stepped from the range start in 30-minute increments,
//! independent of the requested duration. A candidate survives only if, for every
//! participant:
//!
//! - its start lies inside that participant's working window for the day
//!   (boundaries inclusive);
//! - `[start, start + duration)` does not overlap an existing meeting
//!   (exclusive boundaries: back-to-back is allowed);
//! - its start's local time of day is outside every blackout window
//!   (boundaries inclusive).
//!
//! Surviving slots are returned in chronological order with no further ranking.
//!
//! Working windows are compared as UTC instants, resolved through
//! [`crate::timeconv::localize`]. A working start that falls in a spring-forward gap
//! therefore moves one hour later: with a 02:30 start on the night clocks jump from
//! 02:00 to 03:00, the window opens at 03:30 local and a 03:00 candidate is refused.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::error::{Result, ScheduleError};
use crate::model::{AvailabilityQuery, TimeRange, TimeSlot, TimeWindow};
use crate::provider::{require_user, DataProvider};
use crate::timeconv::{parse_timezone, working_window_in};

/// Spacing of candidate start times.
pub const GRID_STEP_MINUTES: i64 = 30;

/// Everything needed to judge a candidate for one participant, computed once per query.
#[derive(Debug)]
struct ParticipantCalendar {
    tz: Tz,
    /// Working window per local calendar day, as UTC bounds.
    working: BTreeMap<NaiveDate, (DateTime<Utc>, DateTime<Utc>)>,
    /// Existing meetings as (start, end), sorted by start.
    busy: Vec<(DateTime<Utc>, DateTime<Utc>)>,
    blackouts: Vec<TimeWindow>,
}

impl ParticipantCalendar {
    fn load(provider: &dyn DataProvider, user_id: &str, range: &TimeRange) -> Result<Self> {
        let user = require_user(provider, user_id)?;
        let tz = parse_timezone(&user.timezone)?;

        // One extra day on each side covers windows crossing midnight and candidates
        // whose local date differs from their UTC date.
        let first = range.start.with_timezone(&tz).date_naive();
        let first = first.pred_opt().unwrap_or(first);
        let last = range.end.with_timezone(&tz).date_naive();

        let mut working = BTreeMap::new();
        for day in first.iter_days().take_while(|d| *d <= last) {
            working.insert(day, working_window_in(&tz, &user, day)?);
        }

        let mut busy: Vec<_> = provider
            .get_user_meetings(user_id)?
            .iter()
            .map(|m| (m.start, m.end))
            .collect();
        busy.sort();

        Ok(Self {
            tz,
            working,
            busy,
            blackouts: user.blackouts().to_vec(),
        })
    }

    fn within_working_hours(&self, at: DateTime<Utc>) -> bool {
        let day = at.with_timezone(&self.tz).date_naive();
        let today = self.working.get(&day);
        let yesterday = day.pred_opt().and_then(|d| self.working.get(&d));
        [today, yesterday]
            .into_iter()
            .flatten()
            .any(|(start, end)| *start <= at && at <= *end)
    }

    fn is_busy(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.busy
            .iter()
            .take_while(|(busy_start, _)| *busy_start < end)
            .any(|(busy_start, busy_end)| start < *busy_end && end > *busy_start)
    }

    fn in_blackout(&self, at: DateTime<Utc>) -> bool {
        let time_of_day = at.with_timezone(&self.tz).time();
        self.blackouts.iter().any(|w| w.contains(time_of_day))
    }

    fn accepts(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.within_working_hours(start) && !self.is_busy(start, end) && !self.in_blackout(start)
    }
}

/// Find every grid slot where all participants are simultaneously available.
///
/// Returns an empty list (not an error) when nothing fits.
///
/// # Errors
///
/// - [`ScheduleError::NoParticipants`] for an empty participant list.
/// - [`ScheduleError::InvalidDuration`] when the duration is not positive.
/// - [`ScheduleError::InvalidRange`] when the range ends before it starts.
/// - [`ScheduleError::UserNotFound`] when a participant does not resolve.
/// - [`ScheduleError::InvalidTimezone`] when a participant's zone is unknown.
pub fn find_slots(provider: &dyn DataProvider, query: &AvailabilityQuery) -> Result<Vec<TimeSlot>> {
    let slots: Vec<TimeSlot> = scan(provider, query)?.collect();
    debug!(
        participants = query.participants.len(),
        duration_minutes = query.duration_minutes,
        slots = slots.len(),
        "availability scan finished"
    );
    Ok(slots)
}

/// The chronologically first slot [`find_slots`] would return, without scanning the rest.
pub fn find_first_slot(
    provider: &dyn DataProvider,
    query: &AvailabilityQuery,
) -> Result<Option<TimeSlot>> {
    Ok(scan(provider, query)?.next())
}

fn scan(
    provider: &dyn DataProvider,
    query: &AvailabilityQuery,
) -> Result<impl Iterator<Item = TimeSlot>> {
    if query.participants.is_empty() {
        return Err(ScheduleError::NoParticipants);
    }
    let duration = Duration::try_minutes(query.duration_minutes)
        .filter(|d| *d > Duration::zero())
        .ok_or(ScheduleError::InvalidDuration(query.duration_minutes))?;
    query.range.validate()?;

    let calendars = query
        .participants
        .iter()
        .map(|id| ParticipantCalendar::load(provider, id, &query.range))
        .collect::<Result<Vec<_>>>()?;

    let step = Duration::minutes(GRID_STEP_MINUTES);
    let range_end = query.range.end;
    let candidates = std::iter::successors(Some(query.range.start), move |t| {
        t.checked_add_signed(step)
    })
    .take_while(move |t| *t < range_end);

    Ok(candidates.filter_map(move |start| {
        let end = start.checked_add_signed(duration)?;
        calendars
            .iter()
            .all(|c| c.accepts(start, end))
            .then_some(TimeSlot { start, end })
    }))
}
