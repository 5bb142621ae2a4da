// ABOUTME: Integration tests for workout plan creation and retrieval
// ABOUTME: Covers auto placement, fallback flagging, validation, and atomic persistence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Fitsched Contributors

//! Workout plan service tests against an in-memory database

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use fitsched::config::SchedulingConfig;
use fitsched::database::Database;
use fitsched::errors::ErrorCode;
use fitsched::models::{DayOfWeek, SessionStatus, TimeWindow, TrainerAvailability};
use fitsched::notifications::LogNotifier;
use fitsched::scheduling::planner::{PlanSpec, PlanWeekSpec};
use fitsched::services::{AvailabilityService, PlanService};
use std::sync::Arc;
use uuid::Uuid;

async fn test_database() -> Database {
    Database::new("sqlite::memory:").await.unwrap()
}

fn services(database: &Database) -> (PlanService, AvailabilityService) {
    let config = SchedulingConfig::default();
    (
        PlanService::new(database.clone(), config, Arc::new(LogNotifier)),
        AvailabilityService::new(database.clone(), config),
    )
}

fn next_monday() -> NaiveDate {
    let mut date = Utc::now().date_naive() + Duration::days(7);
    while date.weekday() != Weekday::Mon {
        date += Duration::days(1);
    }
    date
}

fn window(start_h: u32, end_h: u32) -> TimeWindow {
    TimeWindow::new(
        NaiveTime::from_hms_opt(start_h, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(end_h, 0, 0).unwrap(),
    )
}

/// Open Monday, Wednesday, and Friday mornings
fn three_day_availability() -> TrainerAvailability {
    let mut availability = TrainerAvailability::default();
    for day in [DayOfWeek::Monday, DayOfWeek::Wednesday, DayOfWeek::Friday] {
        availability.recurring.insert(day, vec![window(9, 11)]);
    }
    availability
}

fn auto_week(week_number: u32, session_count: u32) -> PlanWeekSpec {
    PlanWeekSpec {
        week_number,
        session_count,
        sessions: None,
    }
}

fn plan_spec(start: NaiveDate, end: NaiveDate, weeks: Vec<PlanWeekSpec>) -> PlanSpec {
    PlanSpec {
        goal: "Build endurance".into(),
        start_date: start,
        end_date: end,
        weeks,
    }
}

#[tokio::test]
async fn test_plan_creation_places_every_session() {
    let database = test_database().await;
    let (plans, availability) = services(&database);
    let trainer = availability
        .register_trainer("Alex", &three_day_availability())
        .await
        .unwrap();

    let start = next_monday();
    let spec = plan_spec(start, start + Duration::days(6), vec![auto_week(1, 3)]);
    let details = plans
        .create_workout_plan(trainer.id, Uuid::new_v4(), &spec)
        .await
        .unwrap();

    assert_eq!(details.sessions.len(), 3);
    assert_eq!(details.completed_sessions, 0);
    assert_eq!(details.plan.ref_id, "WKP-001");
    for session in &details.sessions {
        assert_eq!(session.status, SessionStatus::Pending);
        assert_eq!(session.week_number, Some(1));
        assert_eq!(session.workout_plan_id, Some(details.plan.id));
        assert!(!session.needs_manual_scheduling);
    }

    // Three open days, one natural placement per day
    let mut dates: Vec<NaiveDate> = details
        .sessions
        .iter()
        .map(|s| s.scheduled_at.date_naive())
        .collect();
    dates.dedup();
    assert_eq!(dates.len(), 3);
}

#[tokio::test]
async fn test_two_week_plan_tags_week_numbers() {
    let database = test_database().await;
    let (plans, availability) = services(&database);
    let trainer = availability
        .register_trainer("Alex", &three_day_availability())
        .await
        .unwrap();

    let start = next_monday();
    let spec = plan_spec(
        start,
        start + Duration::days(13),
        vec![auto_week(1, 2), auto_week(2, 2)],
    );
    let details = plans
        .create_workout_plan(trainer.id, Uuid::new_v4(), &spec)
        .await
        .unwrap();

    assert_eq!(details.sessions.len(), 4);
    let week_one = details
        .sessions
        .iter()
        .filter(|s| s.week_number == Some(1))
        .count();
    let week_two = details
        .sessions
        .iter()
        .filter(|s| s.week_number == Some(2))
        .count();
    assert_eq!(week_one, 2);
    assert_eq!(week_two, 2);
}

#[tokio::test]
async fn test_unplaceable_sessions_are_flagged_not_dropped() {
    let database = test_database().await;
    let (plans, availability) = services(&database);
    // Fully closed trainer
    let trainer = availability
        .register_trainer("Alex", &TrainerAvailability::default())
        .await
        .unwrap();

    let start = next_monday();
    let spec = plan_spec(start, start + Duration::days(6), vec![auto_week(1, 3)]);
    let details = plans
        .create_workout_plan(trainer.id, Uuid::new_v4(), &spec)
        .await
        .unwrap();

    // The declared count is met exactly, every session flagged
    assert_eq!(details.sessions.len(), 3);
    assert!(details.sessions.iter().all(|s| s.needs_manual_scheduling));
}

#[tokio::test]
async fn test_week_count_mismatch_persists_nothing() {
    let database = test_database().await;
    let (plans, availability) = services(&database);
    let trainer = availability
        .register_trainer("Alex", &three_day_availability())
        .await
        .unwrap();

    let member = Uuid::new_v4();
    let start = next_monday();
    // 13 inclusive days span two week buckets; one declared week is short
    let spec = plan_spec(start, start + Duration::days(13), vec![auto_week(1, 2)]);
    let error = plans
        .create_workout_plan(trainer.id, member, &spec)
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::ValidationFailed);

    // No plan row and no sessions survived the failure
    assert!(database.plans().active_for_member(member).await.unwrap().is_none());
    assert!(database
        .sessions()
        .list_for_member(member, None)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_second_active_plan_is_rejected() {
    let database = test_database().await;
    let (plans, availability) = services(&database);
    let trainer = availability
        .register_trainer("Alex", &three_day_availability())
        .await
        .unwrap();

    let member = Uuid::new_v4();
    let start = next_monday();
    let spec = plan_spec(start, start + Duration::days(6), vec![auto_week(1, 1)]);
    plans
        .create_workout_plan(trainer.id, member, &spec)
        .await
        .unwrap();

    let error = plans
        .create_workout_plan(trainer.id, member, &spec)
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::Conflict);
}

#[tokio::test]
async fn test_ref_ids_are_sequential() {
    let database = test_database().await;
    let (plans, availability) = services(&database);
    let trainer = availability
        .register_trainer("Alex", &three_day_availability())
        .await
        .unwrap();

    let start = next_monday();
    let spec = plan_spec(start, start + Duration::days(6), vec![auto_week(1, 1)]);
    let first = plans
        .create_workout_plan(trainer.id, Uuid::new_v4(), &spec)
        .await
        .unwrap();
    let second = plans
        .create_workout_plan(trainer.id, Uuid::new_v4(), &spec)
        .await
        .unwrap();

    assert_eq!(first.plan.ref_id, "WKP-001");
    assert_eq!(second.plan.ref_id, "WKP-002");
}

#[tokio::test]
async fn test_get_workout_plan_reports_progress() {
    let database = test_database().await;
    let (plans, availability) = services(&database);
    let trainer = availability
        .register_trainer("Alex", &three_day_availability())
        .await
        .unwrap();

    let start = next_monday();
    let spec = plan_spec(start, start + Duration::days(6), vec![auto_week(1, 2)]);
    let created = plans
        .create_workout_plan(trainer.id, Uuid::new_v4(), &spec)
        .await
        .unwrap();

    // Drive one session through to completed directly in storage
    let first = &created.sessions[0];
    database
        .sessions()
        .transition(first.id, &[SessionStatus::Pending], SessionStatus::Scheduled)
        .await
        .unwrap();
    database
        .sessions()
        .complete(first.id, 60, None)
        .await
        .unwrap();

    let details = plans.get_workout_plan(created.plan.id).await.unwrap();
    assert_eq!(details.sessions.len(), 2);
    assert_eq!(details.completed_sessions, 1);
}
