//! Small numeric and selection helpers shared by the analyzers.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::model::Meeting;
use crate::provider::DataProvider;

/// Round to two decimal places, the precision every report uses.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `numerator / denominator`, or 0 when there is nothing to divide by.
pub(crate) fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// The user's meetings starting in `[from, to)`, sorted by start.
pub(crate) fn meetings_starting_in(
    provider: &dyn DataProvider,
    user_id: &str,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<Meeting>> {
    let mut meetings: Vec<Meeting> = provider
        .get_user_meetings(user_id)?
        .into_iter()
        .filter(|m| from <= m.start && m.start < to)
        .collect();
    sort_chronologically(&mut meetings);
    Ok(meetings)
}

pub(crate) fn sort_chronologically(meetings: &mut [Meeting]) {
    meetings.sort_by(|a, b| (a.start, a.end, &a.id).cmp(&(b.start, b.end, &b.id)));
}
