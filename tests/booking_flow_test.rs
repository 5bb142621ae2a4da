// ABOUTME: Integration tests for the session booking workflows
// ABOUTME: Direct booking, member requests, trainer responses, conflicts, cancellation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Fitsched Contributors

//! Booking flow tests against an in-memory database

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use fitsched::config::SchedulingConfig;
use fitsched::database::Database;
use fitsched::errors::ErrorCode;
use fitsched::models::{
    DayOfWeek, SessionDraft, SessionStatus, SessionType, TimeWindow, TrainerAvailability,
};
use fitsched::notifications::LogNotifier;
use fitsched::scheduling::intervals::zoned;
use fitsched::services::{AvailabilityService, BookingService};
use std::sync::Arc;
use uuid::Uuid;

async fn test_database() -> Database {
    Database::new("sqlite::memory:").await.unwrap()
}

fn services(database: &Database) -> (BookingService, AvailabilityService) {
    let config = SchedulingConfig::default();
    (
        BookingService::new(database.clone(), config, Arc::new(LogNotifier)),
        AvailabilityService::new(database.clone(), config),
    )
}

/// Next Monday at least a week out, so every test instant is in the future
fn next_monday() -> NaiveDate {
    let mut date = Utc::now().date_naive() + Duration::days(7);
    while date.weekday() != Weekday::Mon {
        date += Duration::days(1);
    }
    date
}

fn monday_morning_availability() -> TrainerAvailability {
    let mut availability = TrainerAvailability::default();
    availability.recurring.insert(
        DayOfWeek::Monday,
        vec![TimeWindow::new(
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
        )],
    );
    availability
}

fn at(date: NaiveDate, hour: u32, minute: u32) -> chrono::DateTime<Utc> {
    let config = SchedulingConfig::default();
    zoned(
        date,
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap(),
        config.timezone,
    )
}

#[tokio::test]
async fn test_booking_inside_window_succeeds() {
    let database = test_database().await;
    let (booking, availability) = services(&database);
    let trainer = availability
        .register_trainer("Alex", &monday_morning_availability())
        .await
        .unwrap();

    let monday = next_monday();
    let session = booking
        .create_session(trainer.id, Uuid::new_v4(), at(monday, 9, 30), Some(60), None, None)
        .await
        .unwrap();

    assert_eq!(session.status, SessionStatus::Scheduled);
    assert_eq!(session.duration_minutes, 60);
}

#[tokio::test]
async fn test_booking_straddling_window_end_is_rejected() {
    let database = test_database().await;
    let (booking, availability) = services(&database);
    let trainer = availability
        .register_trainer("Alex", &monday_morning_availability())
        .await
        .unwrap();

    // 10:30 + 60min runs past the 11:00 close
    let error = booking
        .create_session(trainer.id, Uuid::new_v4(), at(next_monday(), 10, 30), Some(60), None, None)
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::Conflict);
}

#[tokio::test]
async fn test_overlapping_booking_is_rejected() {
    let database = test_database().await;
    let (booking, availability) = services(&database);
    let trainer = availability
        .register_trainer("Alex", &monday_morning_availability())
        .await
        .unwrap();

    let monday = next_monday();
    booking
        .create_session(trainer.id, Uuid::new_v4(), at(monday, 9, 0), Some(60), None, None)
        .await
        .unwrap();

    let error = booking
        .create_session(trainer.id, Uuid::new_v4(), at(monday, 9, 30), Some(60), None, None)
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::Conflict);
}

#[tokio::test]
async fn test_back_to_back_bookings_do_not_conflict() {
    let database = test_database().await;
    let (booking, availability) = services(&database);
    let trainer = availability
        .register_trainer("Alex", &monday_morning_availability())
        .await
        .unwrap();

    let monday = next_monday();
    booking
        .create_session(trainer.id, Uuid::new_v4(), at(monday, 9, 0), Some(60), None, None)
        .await
        .unwrap();
    // Starts exactly where the first ends
    let second = booking
        .create_session(trainer.id, Uuid::new_v4(), at(monday, 10, 0), Some(60), None, None)
        .await
        .unwrap();
    assert_eq!(second.status, SessionStatus::Scheduled);
}

#[tokio::test]
async fn test_cancelled_session_frees_its_slot() {
    let database = test_database().await;
    let (booking, availability) = services(&database);
    let trainer = availability
        .register_trainer("Alex", &monday_morning_availability())
        .await
        .unwrap();

    let monday = next_monday();
    let member = Uuid::new_v4();
    let session = booking
        .create_session(trainer.id, member, at(monday, 9, 0), Some(60), None, None)
        .await
        .unwrap();
    booking.cancel_session(member, session.id).await.unwrap();

    let rebooked = booking
        .create_session(trainer.id, Uuid::new_v4(), at(monday, 9, 0), Some(60), None, None)
        .await
        .unwrap();
    assert_eq!(rebooked.status, SessionStatus::Scheduled);
}

#[tokio::test]
async fn test_request_does_not_block_other_bookings() {
    let database = test_database().await;
    let (booking, availability) = services(&database);
    let trainer = availability
        .register_trainer("Alex", &monday_morning_availability())
        .await
        .unwrap();

    let monday = next_monday();
    let request = booking
        .request_session(Uuid::new_v4(), trainer.id, at(monday, 9, 0), Some(60), None)
        .await
        .unwrap();
    assert_eq!(request.status, SessionStatus::Requested);

    // The requested interval is still bookable by someone else
    booking
        .create_session(trainer.id, Uuid::new_v4(), at(monday, 9, 0), Some(60), None, None)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_request_then_accept_schedules_the_session() {
    let database = test_database().await;
    let (booking, availability) = services(&database);
    let trainer = availability
        .register_trainer("Alex", &monday_morning_availability())
        .await
        .unwrap();

    let request = booking
        .request_session(Uuid::new_v4(), trainer.id, at(next_monday(), 9, 0), Some(60), None)
        .await
        .unwrap();

    let approved = booking
        .respond_to_request(trainer.id, request.id, true)
        .await
        .unwrap();
    assert_eq!(approved.status, SessionStatus::Scheduled);
}

#[tokio::test]
async fn test_accept_fails_after_slot_was_taken() {
    let database = test_database().await;
    let (booking, availability) = services(&database);
    let trainer = availability
        .register_trainer("Alex", &monday_morning_availability())
        .await
        .unwrap();

    let monday = next_monday();
    let request = booking
        .request_session(Uuid::new_v4(), trainer.id, at(monday, 9, 0), Some(60), None)
        .await
        .unwrap();

    // Slot is taken between request and response
    booking
        .create_session(trainer.id, Uuid::new_v4(), at(monday, 9, 30), Some(60), None, None)
        .await
        .unwrap();

    let error = booking
        .respond_to_request(trainer.id, request.id, true)
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::Conflict);

    // The request itself is untouched
    let session = booking.get_session(request.id).await.unwrap();
    assert_eq!(session.status, SessionStatus::Requested);
}

#[tokio::test]
async fn test_reject_cancels_the_request() {
    let database = test_database().await;
    let (booking, availability) = services(&database);
    let trainer = availability
        .register_trainer("Alex", &monday_morning_availability())
        .await
        .unwrap();

    let request = booking
        .request_session(Uuid::new_v4(), trainer.id, at(next_monday(), 9, 0), Some(60), None)
        .await
        .unwrap();
    let rejected = booking
        .respond_to_request(trainer.id, request.id, false)
        .await
        .unwrap();
    assert_eq!(rejected.status, SessionStatus::Cancelled);
}

#[tokio::test]
async fn test_stranger_cannot_cancel_a_session() {
    let database = test_database().await;
    let (booking, availability) = services(&database);
    let trainer = availability
        .register_trainer("Alex", &monday_morning_availability())
        .await
        .unwrap();

    let session = booking
        .create_session(trainer.id, Uuid::new_v4(), at(next_monday(), 9, 0), Some(60), None, None)
        .await
        .unwrap();

    let error = booking
        .cancel_session(Uuid::new_v4(), session.id)
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::Forbidden);
}

#[tokio::test]
async fn test_unknown_trainer_is_simply_unavailable() {
    let database = test_database().await;
    let (booking, _) = services(&database);

    let available = booking
        .is_trainer_available(Uuid::new_v4(), at(next_monday(), 9, 0), 60)
        .await
        .unwrap();
    assert!(!available);
}

#[tokio::test]
async fn test_complete_session_records_actual_minutes() {
    let database = test_database().await;
    let (booking, availability) = services(&database);
    let trainer = availability
        .register_trainer("Alex", &monday_morning_availability())
        .await
        .unwrap();

    let session = booking
        .create_session(trainer.id, Uuid::new_v4(), at(next_monday(), 9, 0), Some(60), None, None)
        .await
        .unwrap();

    let completed = booking
        .complete_session(trainer.id, session.id, 55, Some("good pace".into()))
        .await
        .unwrap();
    assert_eq!(completed.status, SessionStatus::Completed);
    assert_eq!(completed.actual_minutes_spent, 55);
    assert!(completed.attended);
    assert_eq!(completed.note.as_deref(), Some("good pace"));
}

fn scheduled_draft(
    trainer_id: Uuid,
    status: SessionStatus,
    scheduled_at: chrono::DateTime<Utc>,
    duration_minutes: u32,
) -> SessionDraft {
    SessionDraft {
        member_id: Uuid::new_v4(),
        trainer_id,
        workout_plan_id: None,
        week_number: None,
        status,
        scheduled_at,
        duration_minutes,
        session_type: SessionType::Tbd,
        note: None,
        needs_manual_scheduling: false,
    }
}

#[tokio::test]
async fn test_guarded_insert_enforces_overlap_at_commit() {
    // Exercises the conditional insert itself, with no availability check in
    // front of it: two writers that both passed an earlier free-slot read
    // must still serialize on the SQL guard.
    let database = test_database().await;
    let trainer_id = Uuid::new_v4();
    let monday = next_monday();

    let first = database
        .sessions()
        .insert_scheduled_guarded(&scheduled_draft(
            trainer_id,
            SessionStatus::Scheduled,
            at(monday, 9, 0),
            60,
        ))
        .await
        .unwrap();
    assert!(first.is_some());

    // Overlapping interval: starts inside the committed one
    let overlapping = database
        .sessions()
        .insert_scheduled_guarded(&scheduled_draft(
            trainer_id,
            SessionStatus::Scheduled,
            at(monday, 9, 30),
            60,
        ))
        .await
        .unwrap();
    assert!(overlapping.is_none());

    // Touching interval: starts exactly at the committed end, so no overlap
    let touching = database
        .sessions()
        .insert_scheduled_guarded(&scheduled_draft(
            trainer_id,
            SessionStatus::Scheduled,
            at(monday, 10, 0),
            30,
        ))
        .await
        .unwrap();
    assert!(touching.is_some());

    // Disjoint interval later the same day
    let disjoint = database
        .sessions()
        .insert_scheduled_guarded(&scheduled_draft(
            trainer_id,
            SessionStatus::Scheduled,
            at(monday, 14, 0),
            60,
        ))
        .await
        .unwrap();
    assert!(disjoint.is_some());

    // Only the committed rows exist
    let sessions = database
        .sessions()
        .list_for_trainer(trainer_id, Some(SessionStatus::Scheduled))
        .await
        .unwrap();
    assert_eq!(sessions.len(), 3);
}

#[tokio::test]
async fn test_guarded_insert_ignores_other_trainers_and_nonblocking_statuses() {
    let database = test_database().await;
    let trainer_id = Uuid::new_v4();
    let monday = next_monday();

    // A requested session at the same time never blocks the guard
    database
        .sessions()
        .insert(&scheduled_draft(
            trainer_id,
            SessionStatus::Requested,
            at(monday, 9, 0),
            60,
        ))
        .await
        .unwrap();
    // Neither does another trainer's scheduled session
    database
        .sessions()
        .insert(&scheduled_draft(
            Uuid::new_v4(),
            SessionStatus::Scheduled,
            at(monday, 9, 0),
            60,
        ))
        .await
        .unwrap();

    let committed = database
        .sessions()
        .insert_scheduled_guarded(&scheduled_draft(
            trainer_id,
            SessionStatus::Scheduled,
            at(monday, 9, 0),
            60,
        ))
        .await
        .unwrap();
    assert!(committed.is_some());
}

#[tokio::test]
async fn test_guarded_approval_refuses_after_slot_taken_at_commit() {
    // approve_guarded must re-check inside the UPDATE even when the caller's
    // earlier availability read said the slot was free.
    let database = test_database().await;
    let trainer_id = Uuid::new_v4();
    let monday = next_monday();

    let requested = database
        .sessions()
        .insert(&scheduled_draft(
            trainer_id,
            SessionStatus::Requested,
            at(monday, 9, 30),
            60,
        ))
        .await
        .unwrap();

    // Another booking lands first, overlapping the requested interval
    database
        .sessions()
        .insert(&scheduled_draft(
            trainer_id,
            SessionStatus::Scheduled,
            at(monday, 9, 0),
            60,
        ))
        .await
        .unwrap();

    let approved = database.sessions().approve_guarded(requested.id).await.unwrap();
    assert!(!approved);
    // The request is untouched, not silently cancelled
    let after = database.sessions().get(requested.id).await.unwrap().unwrap();
    assert_eq!(after.status, SessionStatus::Requested);
}

#[tokio::test]
async fn test_guarded_approval_succeeds_around_back_to_back_booking() {
    let database = test_database().await;
    let trainer_id = Uuid::new_v4();
    let monday = next_monday();

    let requested = database
        .sessions()
        .insert(&scheduled_draft(
            trainer_id,
            SessionStatus::Requested,
            at(monday, 10, 0),
            60,
        ))
        .await
        .unwrap();

    // Scheduled session ending exactly where the request starts
    database
        .sessions()
        .insert(&scheduled_draft(
            trainer_id,
            SessionStatus::Scheduled,
            at(monday, 9, 0),
            60,
        ))
        .await
        .unwrap();

    let approved = database.sessions().approve_guarded(requested.id).await.unwrap();
    assert!(approved);
    let after = database.sessions().get(requested.id).await.unwrap().unwrap();
    assert_eq!(after.status, SessionStatus::Scheduled);
}

#[tokio::test]
async fn test_member_claims_pending_placeholder() {
    let database = test_database().await;
    let (booking, availability) = services(&database);
    let trainer = availability
        .register_trainer("Alex", &monday_morning_availability())
        .await
        .unwrap();

    let monday = next_monday();
    let member = Uuid::new_v4();
    // Placeholder as the plan scheduler would leave it
    let pending = database
        .sessions()
        .insert(&SessionDraft {
            member_id: member,
            trainer_id: trainer.id,
            workout_plan_id: None,
            week_number: Some(1),
            status: SessionStatus::Pending,
            scheduled_at: at(monday, 9, 0),
            duration_minutes: 60,
            session_type: SessionType::Tbd,
            note: None,
            needs_manual_scheduling: true,
        })
        .await
        .unwrap();

    let claimed = booking
        .claim_pending_session(member, pending.id, at(monday, 10, 0), Some(60))
        .await
        .unwrap();
    assert_eq!(claimed.status, SessionStatus::Requested);
    assert_eq!(claimed.scheduled_at, at(monday, 10, 0));
    assert!(!claimed.needs_manual_scheduling);

    // A second claim is rejected
    let error = booking
        .claim_pending_session(member, pending.id, at(monday, 10, 0), Some(60))
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::Conflict);
}

#[tokio::test]
async fn test_trainer_deletes_session_outright() {
    let database = test_database().await;
    let (booking, availability) = services(&database);
    let trainer = availability
        .register_trainer("Alex", &monday_morning_availability())
        .await
        .unwrap();

    let monday = next_monday();
    let session = booking
        .create_session(trainer.id, Uuid::new_v4(), at(monday, 9, 0), Some(60), None, None)
        .await
        .unwrap();

    // A stranger (or the member) cannot hard-delete
    let error = booking
        .delete_session(Uuid::new_v4(), session.id)
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::Forbidden);

    booking.delete_session(trainer.id, session.id).await.unwrap();
    let error = booking.get_session(session.id).await.unwrap_err();
    assert_eq!(error.code, ErrorCode::NotFound);

    // The slot is bookable again
    booking
        .create_session(trainer.id, Uuid::new_v4(), at(monday, 9, 0), Some(60), None, None)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_reschedule_moves_the_session() {
    let database = test_database().await;
    let (booking, availability) = services(&database);
    let trainer = availability
        .register_trainer("Alex", &monday_morning_availability())
        .await
        .unwrap();

    let monday = next_monday();
    let member = Uuid::new_v4();
    let session = booking
        .create_session(trainer.id, member, at(monday, 9, 0), Some(60), None, None)
        .await
        .unwrap();

    let moved = booking
        .reschedule_session(member, session.id, at(monday, 10, 0), None)
        .await
        .unwrap();
    assert_eq!(moved.scheduled_at, at(monday, 10, 0));
    assert_eq!(moved.status, SessionStatus::Scheduled);
}
