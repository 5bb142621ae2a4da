// ABOUTME: Time interval utilities: half-open overlap testing and zoned construction
// ABOUTME: Combines wall-clock times with calendar dates in the operating timezone
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Fitsched Contributors

//! Time interval utilities.
//!
//! Intervals are half-open: `[start, end)`. Touching endpoints do not
//! overlap, so a session ending at 10:00 and one starting at 10:00 coexist.
//! Wall-clock values are resolved in the fixed operating timezone before
//! any comparison to avoid daylight-saving ambiguity.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Half-open interval overlap test.
///
/// True iff `start_a < end_b && start_b < end_a`. Symmetric in its two
/// intervals; exactly-touching endpoints are not an overlap.
pub fn overlaps<T: PartialOrd>(start_a: &T, end_a: &T, start_b: &T, end_b: &T) -> bool {
    start_a < end_b && start_b < end_a
}

/// Resolve a local calendar date + wall-clock time in the operating zone,
/// returned as a UTC instant.
///
/// DST-ambiguous local times (clocks falling back) resolve to the earliest
/// valid instant; nonexistent local times (clocks springing forward) roll
/// forward past the gap.
#[must_use]
pub fn zoned(date: NaiveDate, time: NaiveTime, tz: Tz) -> DateTime<Utc> {
    let naive = date.and_time(time);
    let resolved = match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            // Inside a spring-forward gap; an hour later is always valid
            match tz.from_local_datetime(&(naive + Duration::hours(1))) {
                LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
                LocalResult::None => tz.from_utc_datetime(&naive),
            }
        }
    };
    resolved.with_timezone(&Utc)
}

/// Local calendar date of an instant in the operating zone
#[must_use]
pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Start of the local day (local midnight) containing `date`, as a UTC instant
#[must_use]
pub fn start_of_day(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    zoned(date, NaiveTime::MIN, tz)
}
