// ABOUTME: Daily session reconciliation sweep run shortly after local midnight
// ABOUTME: Past scheduled sessions auto-complete; stale pending/requested ones cancel
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Fitsched Contributors

//! Session reconciliation.
//!
//! The sweep is idempotent: each pass selects rows strictly before the
//! cutoff with a sweepable status, so a repeated run over the same data
//! changes nothing. The cutoff is local midnight of the current day in the
//! operating timezone; a session late on yesterday's calendar is already
//! swept by a run at 00:01 today.

use crate::config::SchedulingConfig;
use crate::database::Database;
use crate::errors::AppResult;
use crate::scheduling::intervals::{local_date, start_of_day};
use chrono::{DateTime, Duration, Utc};
use tracing::{error, info};

/// Row counts from one sweep pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// `scheduled` sessions auto-completed
    pub completed: u64,
    /// `pending`/`requested` sessions cancelled
    pub cancelled: u64,
}

/// Run one sweep pass with `now` as the reference instant.
///
/// The two updates run independently; a failure in one is logged and
/// surfaced while the other's effect stands. Surviving rows are picked up
/// by the next pass.
///
/// # Errors
///
/// Returns the first update error encountered
pub async fn run_sweep(
    database: &Database,
    config: &SchedulingConfig,
    now: DateTime<Utc>,
) -> AppResult<SweepOutcome> {
    let today = local_date(now, config.timezone);
    let cutoff = start_of_day(today, config.timezone);
    let sessions = database.sessions();

    let mut outcome = SweepOutcome::default();
    let mut first_error = None;

    match sessions.sweep_complete_past(cutoff).await {
        Ok(count) => outcome.completed = count,
        Err(e) => {
            error!(error = %e, "sweep failed to complete past sessions");
            first_error = Some(e);
        }
    }

    match sessions.sweep_cancel_stale(cutoff).await {
        Ok(count) => outcome.cancelled = count,
        Err(e) => {
            error!(error = %e, "sweep failed to cancel stale sessions");
            first_error.get_or_insert(e);
        }
    }

    if let Some(e) = first_error {
        return Err(e);
    }

    info!(
        completed = outcome.completed,
        cancelled = outcome.cancelled,
        cutoff = %cutoff,
        "session sweep finished"
    );
    Ok(outcome)
}

/// Seconds until the next occurrence of the configured local sweep time
fn seconds_until_next_sweep(config: &SchedulingConfig, now: DateTime<Utc>) -> u64 {
    let today = local_date(now, config.timezone);
    let mut next = crate::scheduling::intervals::zoned(today, config.sweep_time, config.timezone);
    if next <= now {
        next = crate::scheduling::intervals::zoned(
            today + Duration::days(1),
            config.sweep_time,
            config.timezone,
        );
    }
    u64::try_from((next - now).num_seconds().max(1)).unwrap_or(1)
}

/// Run the sweep on its daily schedule until the task is aborted.
///
/// Sweep failures are logged and the loop keeps going; the next day's pass
/// covers everything a failed pass left behind.
pub async fn sweep_loop(database: Database, config: SchedulingConfig) {
    loop {
        let wait = seconds_until_next_sweep(&config, Utc::now());
        info!(seconds = wait, "next session sweep scheduled");
        tokio::time::sleep(std::time::Duration::from_secs(wait)).await;

        if let Err(e) = run_sweep(&database, &config, Utc::now()).await {
            error!(error = %e, "session sweep pass failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn config() -> SchedulingConfig {
        SchedulingConfig::default()
    }

    #[test]
    fn next_sweep_is_later_today_before_sweep_time() {
        // January: London is on GMT, so local time equals UTC
        let now = Utc.with_ymd_and_hms(2025, 1, 6, 23, 30, 0).unwrap();
        let wait = seconds_until_next_sweep(&config(), now);
        // 00:01 local is 31 minutes away
        assert_eq!(wait, 31 * 60);
    }

    #[test]
    fn next_sweep_rolls_to_tomorrow_after_sweep_time() {
        let now = Utc.with_ymd_and_hms(2025, 1, 6, 0, 1, 0).unwrap();
        let wait = seconds_until_next_sweep(&config(), now);
        assert_eq!(wait, 24 * 60 * 60);
    }

    #[test]
    fn sweep_wait_accounts_for_summer_offset() {
        // July: London is UTC+1, so 00:01 local is 23:01 UTC the day before
        let now = Utc.with_ymd_and_hms(2025, 7, 5, 22, 0, 0).unwrap();
        let wait = seconds_until_next_sweep(&config(), now);
        assert_eq!(wait, 61 * 60);
    }
}
