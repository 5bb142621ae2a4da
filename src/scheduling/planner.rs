// ABOUTME: Plan auto-scheduler placing a multi-week block of sessions for a workout plan
// ABOUTME: Natural slot placement with a guaranteed fallback; all-or-nothing validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Fitsched Contributors

//! Workout plan session placement.
//!
//! Placement is computed fully before anything is persisted; the service
//! layer inserts the drafts as one atomic batch. A week either gets
//! explicit caller-supplied placements or is auto-placed in two phases:
//! a natural walk over the week's free slots, then forced local-midnight
//! fallback placements for whatever the walk could not satisfy. Fallback
//! placements ignore declared availability and carry
//! `needs_manual_scheduling` so a trainer can follow up before they are
//! committed.

use crate::config::SchedulingConfig;
use crate::errors::{AppError, AppResult};
use crate::models::{
    SessionDraft, SessionStatus, SessionType, TrainerAvailability, TrainingSession,
};
use crate::scheduling::intervals::start_of_day;
use crate::scheduling::slots::free_slots_for_date;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Caller-supplied placement for one explicit-mode session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplicitSessionSpec {
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: Option<u32>,
    pub note: Option<String>,
    pub session_type: Option<SessionType>,
}

/// One week of a plan request; `sessions: None` selects auto placement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanWeekSpec {
    /// Caller-declared 1-based week index; informational only. Placement
    /// tags sessions by the week's position in the list.
    #[serde(default)]
    pub week_number: u32,
    /// Required session count for the week
    pub session_count: u32,
    /// Explicit placements; length must equal `session_count` when present
    #[serde(default)]
    pub sessions: Option<Vec<ExplicitSessionSpec>>,
}

/// A validated-on-entry workout plan request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSpec {
    pub goal: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub weeks: Vec<PlanWeekSpec>,
}

/// Number of whole-week buckets spanned by `[start, end]`, inclusive.
///
/// A range of under seven days is one week; each further started seven-day
/// bucket adds one.
#[must_use]
pub fn computed_week_count(start: NaiveDate, end: NaiveDate) -> u32 {
    let days = (end - start).num_days();
    if days < 0 {
        return 0;
    }
    u32::try_from(days / 7 + 1).unwrap_or(u32::MAX)
}

/// 1-based plan week containing `target`, counted from `start`
#[must_use]
pub fn week_number_for(start: NaiveDate, target: NaiveDate) -> u32 {
    let days = (target - start).num_days();
    if days < 0 {
        return 1;
    }
    u32::try_from(days / 7 + 1).unwrap_or(u32::MAX)
}

/// Validate a plan request before any placement or persistence.
///
/// # Errors
///
/// Returns `ValidationFailed` for a malformed date range, a week list not
/// matching the computed week count, zero session counts, or an explicit
/// week whose placement count mismatches.
pub fn validate_plan(spec: &PlanSpec) -> AppResult<()> {
    if spec.start_date >= spec.end_date {
        return Err(AppError::validation("Start date must be before end date"));
    }
    if spec.weeks.is_empty() {
        return Err(AppError::validation("Weekly sessions data is required"));
    }

    let total_weeks = computed_week_count(spec.start_date, spec.end_date);
    if spec.weeks.len() != total_weeks as usize {
        return Err(AppError::validation(format!(
            "Weekly session count must match total weeks in the plan: got {}, expected {total_weeks}",
            spec.weeks.len()
        )));
    }

    for (index, week) in spec.weeks.iter().enumerate() {
        let position = u32::try_from(index).unwrap_or(u32::MAX) + 1;
        if week.session_count == 0 {
            return Err(AppError::validation(format!(
                "Week {position} must declare at least one session"
            )));
        }
        if let Some(sessions) = &week.sessions {
            if sessions.len() != week.session_count as usize {
                return Err(AppError::validation(format!(
                    "Week {position} declares {} sessions but supplies {} placements",
                    week.session_count,
                    sessions.len()
                )));
            }
        }
    }

    Ok(())
}

/// Compute concrete session drafts for every week of a validated plan.
///
/// Auto weeks walk the week's days from the week start, taking the first
/// free slot of a day and advancing the day cursor between placements;
/// whatever remains after the seven-day walk is force-placed at local
/// midnight on successive days from the week start, flagged for manual
/// follow-up. The declared session count is always met exactly.
///
/// # Errors
///
/// Returns `ValidationFailed` when the plan request is malformed; no
/// drafts are produced in that case.
pub fn schedule_plan_sessions(
    spec: &PlanSpec,
    trainer_id: Uuid,
    member_id: Uuid,
    plan_id: Uuid,
    availability: &TrainerAvailability,
    existing_sessions: &[TrainingSession],
    config: &SchedulingConfig,
) -> AppResult<Vec<SessionDraft>> {
    validate_plan(spec)?;

    let mut drafts = Vec::new();
    for (index, week) in spec.weeks.iter().enumerate() {
        // Weeks are tagged by list position; the declared week_number is
        // not trusted for placement
        let week_number = u32::try_from(index).unwrap_or(u32::MAX) + 1;
        let week_start = spec.start_date + Duration::days(7 * index as i64);

        match &week.sessions {
            Some(explicit) => {
                for session in explicit {
                    drafts.push(SessionDraft {
                        member_id,
                        trainer_id,
                        workout_plan_id: Some(plan_id),
                        week_number: Some(week_number),
                        status: SessionStatus::Pending,
                        scheduled_at: session.scheduled_at,
                        duration_minutes: session
                            .duration_minutes
                            .unwrap_or(config.default_session_duration_minutes),
                        session_type: session.session_type.unwrap_or_default(),
                        note: session.note.clone(),
                        needs_manual_scheduling: false,
                    });
                }
            }
            None => {
                auto_place_week(
                    week_number,
                    week.session_count,
                    week_start,
                    trainer_id,
                    member_id,
                    plan_id,
                    availability,
                    existing_sessions,
                    config,
                    &mut drafts,
                );
            }
        }
    }

    Ok(drafts)
}

/// Two-phase auto placement for one week
#[allow(clippy::too_many_arguments)]
fn auto_place_week(
    week_number: u32,
    session_count: u32,
    week_start: NaiveDate,
    trainer_id: Uuid,
    member_id: Uuid,
    plan_id: Uuid,
    availability: &TrainerAvailability,
    existing_sessions: &[TrainingSession],
    config: &SchedulingConfig,
    drafts: &mut Vec<SessionDraft>,
) {
    let make_draft = |scheduled_at: DateTime<Utc>, fallback: bool| SessionDraft {
        member_id,
        trainer_id,
        workout_plan_id: Some(plan_id),
        week_number: Some(week_number),
        status: SessionStatus::Pending,
        scheduled_at,
        duration_minutes: config.default_session_duration_minutes,
        session_type: SessionType::Tbd,
        note: None,
        needs_manual_scheduling: fallback,
    };

    // Natural phase: one day-cursor walk across the 7-day week window
    let mut placed = 0u32;
    let mut day_offset = 0i64;
    while placed < session_count && day_offset < 7 {
        let date = week_start + Duration::days(day_offset);
        day_offset += 1;

        let slots = free_slots_for_date(
            availability,
            existing_sessions,
            date,
            config.timezone,
            config.slot_granularity_minutes,
        );
        if let Some(first) = slots.first() {
            drafts.push(make_draft(*first, false));
            placed += 1;
        }
    }

    // Fallback phase: restart at the week start and force-place the rest
    // at local midnight on successive days, availability notwithstanding
    for offset in 0..i64::from(session_count - placed) {
        let date = week_start + Duration::days(offset);
        drafts.push(make_draft(start_of_day(date, config.timezone), true));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DayOfWeek, TimeWindow};
    use chrono::{NaiveTime, TimeZone};

    fn spec(start: (i32, u32, u32), end: (i32, u32, u32), weeks: Vec<PlanWeekSpec>) -> PlanSpec {
        PlanSpec {
            goal: "Build endurance".into(),
            start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
            weeks,
        }
    }

    fn auto_week(week_number: u32, session_count: u32) -> PlanWeekSpec {
        PlanWeekSpec {
            week_number,
            session_count,
            sessions: None,
        }
    }

    #[test]
    fn test_week_count_buckets() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        assert_eq!(computed_week_count(start, start + Duration::days(6)), 1);
        assert_eq!(computed_week_count(start, start + Duration::days(7)), 2);
        assert_eq!(computed_week_count(start, start + Duration::days(13)), 2);
        assert_eq!(computed_week_count(start, start + Duration::days(14)), 3);
    }

    #[test]
    fn test_week_number_for_dates_in_plan() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        assert_eq!(week_number_for(start, start), 1);
        assert_eq!(week_number_for(start, start + Duration::days(6)), 1);
        assert_eq!(week_number_for(start, start + Duration::days(7)), 2);
    }

    #[test]
    fn test_week_list_length_must_match_range() {
        let plan = spec((2025, 1, 6), (2025, 1, 19), vec![auto_week(1, 2)]);
        let err = validate_plan(&plan).unwrap_err();
        assert_eq!(err.code, crate::errors::ErrorCode::ValidationFailed);
    }

    #[test]
    fn test_declared_week_numbers_are_ignored_for_tagging() {
        // Caller sends nonsense week numbers; tagging goes by position
        let plan = spec(
            (2025, 1, 6),
            (2025, 1, 19),
            vec![auto_week(9, 1), auto_week(4, 1)],
        );
        validate_plan(&plan).unwrap();

        let drafts = schedule_plan_sessions(
            &plan,
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            &TrainerAvailability::default(),
            &[],
            &SchedulingConfig::default(),
        )
        .unwrap();

        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].week_number, Some(1));
        assert_eq!(drafts[1].week_number, Some(2));
        // Second week's fallback lands a week after the first week's
        assert_eq!(
            drafts[1].scheduled_at - drafts[0].scheduled_at,
            Duration::days(7)
        );
    }

    #[test]
    fn test_explicit_count_mismatch_fails_validation() {
        let plan = spec(
            (2025, 1, 6),
            (2025, 1, 12),
            vec![PlanWeekSpec {
                week_number: 1,
                session_count: 2,
                sessions: Some(vec![ExplicitSessionSpec {
                    scheduled_at: Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0).unwrap(),
                    duration_minutes: None,
                    note: None,
                    session_type: None,
                }]),
            }],
        );
        assert!(validate_plan(&plan).is_err());
    }

    #[test]
    fn test_fallback_guarantees_exact_count() {
        // No availability at all: every placement comes from the fallback
        let plan = spec((2025, 1, 6), (2025, 1, 12), vec![auto_week(1, 3)]);
        let drafts = schedule_plan_sessions(
            &plan,
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            &TrainerAvailability::default(),
            &[],
            &SchedulingConfig::default(),
        )
        .unwrap();

        assert_eq!(drafts.len(), 3);
        for (offset, draft) in drafts.iter().enumerate() {
            assert_eq!(draft.status, SessionStatus::Pending);
            assert!(draft.needs_manual_scheduling);
            // Local midnight on successive days from the week start
            let expected = start_of_day(
                NaiveDate::from_ymd_opt(2025, 1, 6).unwrap() + Duration::days(offset as i64),
                chrono_tz::Europe::London,
            );
            assert_eq!(draft.scheduled_at, expected);
        }
    }

    #[test]
    fn test_two_week_plan_tags_week_numbers() {
        // Monday start, following Sunday + 7 days: exactly two week buckets
        let plan = spec(
            (2025, 1, 6),
            (2025, 1, 19),
            vec![auto_week(1, 2), auto_week(2, 2)],
        );

        let mut availability = TrainerAvailability::default();
        availability.recurring.insert(
            DayOfWeek::Monday,
            vec![TimeWindow::new(
                NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            )],
        );

        let drafts = schedule_plan_sessions(
            &plan,
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            &availability,
            &[],
            &SchedulingConfig::default(),
        )
        .unwrap();

        assert_eq!(drafts.len(), 4);
        assert_eq!(
            drafts.iter().filter(|d| d.week_number == Some(1)).count(),
            2
        );
        assert_eq!(
            drafts.iter().filter(|d| d.week_number == Some(2)).count(),
            2
        );
    }

    #[test]
    fn test_natural_placements_use_real_slots_and_advance_days() {
        let plan = spec((2025, 1, 6), (2025, 1, 12), vec![auto_week(1, 2)]);

        // Open every weekday morning: two sessions land on two distinct days
        let mut availability = TrainerAvailability::default();
        for day in [DayOfWeek::Monday, DayOfWeek::Tuesday, DayOfWeek::Wednesday] {
            availability.recurring.insert(
                day,
                vec![TimeWindow::new(
                    NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                    NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
                )],
            );
        }

        let drafts = schedule_plan_sessions(
            &plan,
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            &availability,
            &[],
            &SchedulingConfig::default(),
        )
        .unwrap();

        assert_eq!(drafts.len(), 2);
        assert!(drafts.iter().all(|d| !d.needs_manual_scheduling));
        assert_eq!(
            drafts[0].scheduled_at,
            Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0).unwrap()
        );
        assert_eq!(
            drafts[1].scheduled_at,
            Utc.with_ymd_and_hms(2025, 1, 7, 9, 0, 0).unwrap()
        );
    }
}
