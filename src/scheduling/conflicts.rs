// ABOUTME: Booking admissibility predicates over sessions and availability windows
// ABOUTME: Only scheduled sessions block; candidates must fit entirely inside one window
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Fitsched Contributors

//! Pure booking conflict predicates.
//!
//! These are advisory: two concurrent checks can both see "free". The
//! persistence layer's conditional insert is the authoritative guard
//! (see [`crate::database::sessions`]).

use crate::models::{SessionStatus, TimeWindow, TrainingSession};
use crate::scheduling::intervals::{overlaps, zoned};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Whether the candidate interval overlaps any `scheduled` session.
///
/// `requested` and `pending` sessions never block other bookings until
/// approved; terminal sessions never block.
#[must_use]
pub fn conflicts_with_sessions(
    candidate_start: DateTime<Utc>,
    candidate_end: DateTime<Utc>,
    sessions: &[TrainingSession],
) -> bool {
    sessions
        .iter()
        .filter(|s| s.status == SessionStatus::Scheduled)
        .any(|s| overlaps(&candidate_start, &candidate_end, &s.scheduled_at, &s.end_at()))
}

/// Whether the candidate interval is fully contained within at least one of
/// the day's windows, interpreted in the operating zone.
///
/// Partial containment is rejected: a session may not straddle two disjoint
/// windows or extend past a window's end, even by one unit of time.
#[must_use]
pub fn fits_windows(
    candidate_start: DateTime<Utc>,
    candidate_end: DateTime<Utc>,
    date: NaiveDate,
    windows: &[TimeWindow],
    tz: Tz,
) -> bool {
    windows.iter().any(|window| {
        let window_start = zoned(date, window.start, tz);
        let window_end = zoned(date, window.end, tz);
        candidate_start >= window_start && candidate_end <= window_end
    })
}
