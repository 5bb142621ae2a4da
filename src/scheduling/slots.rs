// ABOUTME: Free-slot enumeration composing window resolution with booking subtraction
// ABOUTME: Produces fixed-granularity bookable sub-slot start instants per date
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Fitsched Contributors

//! Slot enumeration.
//!
//! A slot is a fixed-granularity bookable sub-interval derived from a
//! window once existing `scheduled` bookings are subtracted. Range results
//! omit dates with zero free slots; a date closed by an empty override
//! simply yields nothing here (the "officially closed" signal is the
//! override itself, surfaced by the resolver).

use crate::models::{TrainerAvailability, TrainingSession};
use crate::scheduling::availability::resolve_windows;
use crate::scheduling::conflicts::conflicts_with_sessions;
use crate::scheduling::intervals::zoned;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use std::collections::BTreeMap;

/// Enumerate free sub-slot start instants for a single date.
///
/// Each candidate sub-slot runs `granularity_minutes` long, must fit
/// entirely within some resolved window, and must not overlap any
/// `scheduled` session.
#[must_use]
pub fn free_slots_for_date(
    availability: &TrainerAvailability,
    sessions: &[TrainingSession],
    date: NaiveDate,
    tz: Tz,
    granularity_minutes: u32,
) -> Vec<DateTime<Utc>> {
    let granularity = Duration::minutes(i64::from(granularity_minutes));
    if granularity <= Duration::zero() {
        return Vec::new();
    }

    let mut slots = Vec::new();
    for window in resolve_windows(availability, date) {
        let window_end = zoned(date, window.end, tz);
        let mut cursor = zoned(date, window.start, tz);

        while cursor + granularity <= window_end {
            let slot_end = cursor + granularity;
            if !conflicts_with_sessions(cursor, slot_end, sessions) {
                slots.push(cursor);
            }
            cursor = slot_end;
        }
    }
    slots
}

/// Enumerate free slots for every date in `[start_date, end_date]`.
///
/// Dates resolving to no windows are skipped; dates where every sub-slot
/// is booked are omitted from the result.
#[must_use]
pub fn free_slots_for_range(
    availability: &TrainerAvailability,
    sessions: &[TrainingSession],
    start_date: NaiveDate,
    end_date: NaiveDate,
    tz: Tz,
    granularity_minutes: u32,
) -> BTreeMap<NaiveDate, Vec<DateTime<Utc>>> {
    let mut by_date = BTreeMap::new();
    let mut date = start_date;
    while date <= end_date {
        let slots = free_slots_for_date(availability, sessions, date, tz, granularity_minutes);
        if !slots.is_empty() {
            by_date.insert(date, slots);
        }
        date += Duration::days(1);
    }
    by_date
}
