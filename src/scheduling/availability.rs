// ABOUTME: Availability resolver producing the open windows for a given date
// ABOUTME: Date overrides replace the recurring weekly pattern, never merge with it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Fitsched Contributors

//! Override-first availability resolution.

use crate::models::{DayOfWeek, TimeWindow, TrainerAvailability};
use chrono::{Datelike, NaiveDate};

/// Resolve the ordered open windows for a date, independent of bookings.
///
/// An override entry for the date wins verbatim, even when its window list
/// is empty ("explicitly unavailable that day"). Only when no override
/// exists does the weekday's recurring pattern apply.
#[must_use]
pub fn resolve_windows(availability: &TrainerAvailability, date: NaiveDate) -> Vec<TimeWindow> {
    if let Some(windows) = availability.date_overrides.get(&date) {
        return windows.clone();
    }

    let weekday = DayOfWeek::from_weekday(date.weekday());
    availability
        .recurring
        .get(&weekday)
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn window(start: (u32, u32), end: (u32, u32)) -> TimeWindow {
        TimeWindow::new(
            NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
        )
    }

    #[test]
    fn test_recurring_applies_without_override() {
        let mut availability = TrainerAvailability::default();
        availability
            .recurring
            .insert(DayOfWeek::Monday, vec![window((9, 0), (11, 0))]);

        // 2025-07-07 is a Monday
        let monday = NaiveDate::from_ymd_opt(2025, 7, 7).unwrap();
        assert_eq!(
            resolve_windows(&availability, monday),
            vec![window((9, 0), (11, 0))]
        );
    }

    #[test]
    fn test_override_replaces_recurring() {
        let mut availability = TrainerAvailability::default();
        let monday = NaiveDate::from_ymd_opt(2025, 7, 7).unwrap();
        availability
            .recurring
            .insert(DayOfWeek::Monday, vec![window((9, 0), (11, 0))]);
        availability
            .date_overrides
            .insert(monday, vec![window((14, 0), (16, 0))]);

        // The override wins outright; no merging with the recurring window
        assert_eq!(
            resolve_windows(&availability, monday),
            vec![window((14, 0), (16, 0))]
        );
    }

    #[test]
    fn test_empty_override_means_closed() {
        let mut availability = TrainerAvailability::default();
        let monday = NaiveDate::from_ymd_opt(2025, 7, 7).unwrap();
        availability
            .recurring
            .insert(DayOfWeek::Monday, vec![window((9, 0), (11, 0))]);
        availability.date_overrides.insert(monday, vec![]);

        assert!(resolve_windows(&availability, monday).is_empty());
    }

    #[test]
    fn test_absent_weekday_resolves_empty() {
        let availability = TrainerAvailability::default();
        let tuesday = NaiveDate::from_ymd_opt(2025, 7, 8).unwrap();
        assert!(resolve_windows(&availability, tuesday).is_empty());
    }

    #[test]
    fn test_override_on_one_date_leaves_other_dates_alone() {
        let mut availability = TrainerAvailability::default();
        availability
            .recurring
            .insert(DayOfWeek::Monday, vec![window((9, 0), (11, 0))]);
        availability
            .date_overrides
            .insert(NaiveDate::from_ymd_opt(2025, 7, 7).unwrap(), vec![]);

        // The following Monday is untouched by the 7th's override
        let next_monday = NaiveDate::from_ymd_opt(2025, 7, 14).unwrap();
        assert_eq!(
            resolve_windows(&availability, next_monday),
            vec![window((9, 0), (11, 0))]
        );
    }
}
