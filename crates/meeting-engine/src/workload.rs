//! Meeting-load distribution across a team over the coming week.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ScheduleError};
use crate::provider::{require_user, DataProvider};
use crate::stats::{meetings_starting_in, round2};

/// Horizon `[now, now + 7 days)` over which meeting hours are counted.
pub const WORKLOAD_HORIZON_DAYS: i64 = 7;

/// Relative load above which a member is overloaded.
pub const OVERLOADED_RATIO: f64 = 1.2;

/// Relative load below which a member is underutilized.
pub const UNDERUTILIZED_RATIO: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadStatus {
    Overloaded,
    Underutilized,
    Balanced,
}

impl LoadStatus {
    pub fn classify(relative_load: f64) -> Self {
        if relative_load > OVERLOADED_RATIO {
            LoadStatus::Overloaded
        } else if relative_load < UNDERUTILIZED_RATIO {
            LoadStatus::Underutilized
        } else {
            LoadStatus::Balanced
        }
    }
}

/// One member's load over the horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadSample {
    pub user_id: String,
    pub name: String,
    pub meeting_hours: f64,
    pub meeting_count: usize,
    /// Member hours divided by the team average.
    pub relative_load: f64,
    pub status: LoadStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadReport {
    /// One sample per requested member, in request order.
    pub team_workload: Vec<WorkloadSample>,
    pub total_team_hours: f64,
    pub avg_hours_per_member: f64,
}

/// Compare each member's meeting hours over `[now, now + 7 days)` with the team average.
///
/// When nobody has any meetings the average is zero; every member is then reported
/// with a relative load of 1.0 and [`LoadStatus::Balanced`].
///
/// # Errors
///
/// Returns [`ScheduleError::EmptyTeam`] for an empty member list and
/// [`ScheduleError::UserNotFound`] for any member that does not resolve.
pub fn balance_workload(
    provider: &dyn DataProvider,
    team_members: &[String],
    now: DateTime<Utc>,
) -> Result<WorkloadReport> {
    if team_members.is_empty() {
        return Err(ScheduleError::EmptyTeam);
    }

    let horizon_end = now + Duration::days(WORKLOAD_HORIZON_DAYS);
    let mut samples = Vec::with_capacity(team_members.len());
    let mut member_hours = Vec::with_capacity(team_members.len());
    let mut total_team_hours = 0.0;

    for user_id in team_members {
        let user = require_user(provider, user_id)?;
        let meetings = meetings_starting_in(provider, user_id, now, horizon_end)?;
        let hours: f64 = meetings.iter().map(|m| m.duration_hours()).sum();
        total_team_hours += hours;
        member_hours.push(hours);
        samples.push(WorkloadSample {
            user_id: user.id,
            name: user.name,
            meeting_hours: round2(hours),
            meeting_count: meetings.len(),
            relative_load: 1.0,
            status: LoadStatus::Balanced,
        });
    }

    let avg_hours = total_team_hours / team_members.len() as f64;
    if avg_hours > 0.0 {
        // Ratios use unrounded hours; only reported fields are rounded.
        for (sample, hours) in samples.iter_mut().zip(&member_hours) {
            sample.relative_load = round2(hours / avg_hours);
            sample.status = LoadStatus::classify(sample.relative_load);
        }
    }

    debug!(
        members = samples.len(),
        total_team_hours, avg_hours, "workload balance computed"
    );

    Ok(WorkloadReport {
        team_workload: samples,
        total_team_hours: round2(total_team_hours),
        avg_hours_per_member: round2(avg_hours),
    })
}
