//! Find a user's meetings that touch a time range.
//!
//! Unlike slot search, the test here is inclusive at both boundaries: a meeting that
//! ends exactly when the range starts, or starts exactly when it ends, is reported.

use tracing::debug;

use crate::error::Result;
use crate::model::{ConflictRecord, TimeRange};
use crate::provider::{require_user, DataProvider};

/// Return every meeting of `user_id` with `start <= range.end && end >= range.start`,
/// sorted by start time (then meeting id).
///
/// # Errors
///
/// Returns [`crate::ScheduleError::UserNotFound`] if the user does not resolve and
/// [`crate::ScheduleError::InvalidRange`] if the range ends before it starts.
pub fn detect_conflicts(
    provider: &dyn DataProvider,
    user_id: &str,
    range: &TimeRange,
) -> Result<Vec<ConflictRecord>> {
    require_user(provider, user_id)?;
    range.validate()?;

    let mut conflicts: Vec<ConflictRecord> = provider
        .get_user_meetings(user_id)?
        .iter()
        // Touching counts: a.start <= b.end AND a.end >= b.start.
        .filter(|m| m.start <= range.end && m.end >= range.start)
        .map(ConflictRecord::from)
        .collect();

    conflicts.sort_by(|a, b| {
        (a.start_time, &a.meeting_id).cmp(&(b.start_time, &b.meeting_id))
    });

    debug!(user = user_id, conflicts = conflicts.len(), "conflict check finished");
    Ok(conflicts)
}
