// ABOUTME: Session booking workflows: direct booking, member requests, trainer responses
// ABOUTME: Advisory checks run in memory; commits go through guarded conditional writes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Fitsched Contributors

//! Booking service.
//!
//! The availability check here is advisory: it produces good error messages
//! but proves nothing about the state at commit time. The authoritative
//! answer is the conditional write in the database layer, which refuses the
//! row when an overlapping `scheduled` session already holds the interval.

use crate::config::SchedulingConfig;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{
    SessionDraft, SessionStatus, SessionType, Trainer, TrainingSession,
};
use crate::notifications::{Notifier, SchedulingEvent};
use crate::scheduling::availability::resolve_windows;
use crate::scheduling::conflicts::{conflicts_with_sessions, fits_windows};
use crate::scheduling::intervals::local_date;
use crate::scheduling::planner::week_number_for;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Completed-session totals for a member over a reporting window
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct SessionProgress {
    pub completed_sessions: u32,
    pub total_minutes: u64,
}

/// Session booking and lifecycle service
pub struct BookingService {
    database: Database,
    config: SchedulingConfig,
    notifier: Arc<dyn Notifier>,
}

impl BookingService {
    /// Create a new booking service
    #[must_use]
    pub fn new(database: Database, config: SchedulingConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            database,
            config,
            notifier,
        }
    }

    /// Whether a trainer is open and unbooked for the interval. An unknown
    /// trainer is simply not available.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn is_trainer_available(
        &self,
        trainer_id: Uuid,
        scheduled_at: DateTime<Utc>,
        duration_minutes: u32,
    ) -> AppResult<bool> {
        let Some(trainer) = self.database.trainers().get(trainer_id).await? else {
            return Ok(false);
        };
        self.interval_is_open(&trainer, scheduled_at, duration_minutes, None)
            .await
    }

    /// Trainer books a session directly onto their own calendar.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorCode::Conflict`](crate::errors::ErrorCode::Conflict)
    /// when the interval is closed or already booked
    pub async fn create_session(
        &self,
        trainer_id: Uuid,
        member_id: Uuid,
        scheduled_at: DateTime<Utc>,
        duration_minutes: Option<u32>,
        session_type: Option<SessionType>,
        note: Option<String>,
    ) -> AppResult<TrainingSession> {
        let duration = duration_minutes.unwrap_or(self.config.default_session_duration_minutes);
        validate_interval(scheduled_at, duration)?;

        let trainer = self.require_trainer(trainer_id).await?;
        if !self
            .interval_is_open(&trainer, scheduled_at, duration, None)
            .await?
        {
            return Err(AppError::conflict(
                "Trainer is not available at the requested time",
            ));
        }

        let draft = SessionDraft {
            member_id,
            trainer_id,
            workout_plan_id: None,
            week_number: None,
            status: SessionStatus::Scheduled,
            scheduled_at,
            duration_minutes: duration,
            session_type: session_type.unwrap_or_default(),
            note,
            needs_manual_scheduling: false,
        };

        let session = self
            .database
            .sessions()
            .insert_scheduled_guarded(&draft)
            .await?
            .ok_or_else(|| AppError::conflict("Time slot was booked by another session"))?;

        self.notifier
            .notify(&SchedulingEvent::SessionScheduled(session.clone()))
            .await;
        Ok(session)
    }

    /// Member proposes a session time; the record lands as `requested` and
    /// does not block other bookings until the trainer accepts.
    ///
    /// When the proposed date falls inside the member's active plan, the
    /// session is attached to that plan and tagged with its week number.
    ///
    /// # Errors
    ///
    /// Returns an error if the trainer is unknown, the interval is closed,
    /// or a database operation fails
    pub async fn request_session(
        &self,
        member_id: Uuid,
        trainer_id: Uuid,
        scheduled_at: DateTime<Utc>,
        duration_minutes: Option<u32>,
        note: Option<String>,
    ) -> AppResult<TrainingSession> {
        let duration = duration_minutes.unwrap_or(self.config.default_session_duration_minutes);
        validate_interval(scheduled_at, duration)?;

        let trainer = self.require_trainer(trainer_id).await?;
        if !self
            .interval_is_open(&trainer, scheduled_at, duration, None)
            .await?
        {
            return Err(AppError::conflict(
                "Trainer is not available at the requested time",
            ));
        }

        let (workout_plan_id, week_number) = self
            .plan_attachment(member_id, scheduled_at)
            .await?;

        let draft = SessionDraft {
            member_id,
            trainer_id,
            workout_plan_id,
            week_number,
            status: SessionStatus::Requested,
            scheduled_at,
            duration_minutes: duration,
            session_type: SessionType::default(),
            note,
            needs_manual_scheduling: false,
        };

        let session = self.database.sessions().insert(&draft).await?;
        self.notifier
            .notify(&SchedulingEvent::SessionRequested(session.clone()))
            .await;
        Ok(session)
    }

    /// Member claims one of their `pending` placeholder sessions by
    /// proposing a concrete time; the session becomes `requested`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is missing, owned by someone else,
    /// past `pending`, or the interval is closed
    pub async fn claim_pending_session(
        &self,
        member_id: Uuid,
        session_id: Uuid,
        scheduled_at: DateTime<Utc>,
        duration_minutes: Option<u32>,
    ) -> AppResult<TrainingSession> {
        let session = self.require_session(session_id).await?;
        if session.member_id != member_id {
            return Err(AppError::forbidden("Session belongs to another member"));
        }
        if session.status != SessionStatus::Pending {
            return Err(AppError::conflict("Session is no longer pending"));
        }

        let duration = duration_minutes.unwrap_or(session.duration_minutes);
        validate_interval(scheduled_at, duration)?;

        let trainer = self.require_trainer(session.trainer_id).await?;
        if !self
            .interval_is_open(&trainer, scheduled_at, duration, Some(session_id))
            .await?
        {
            return Err(AppError::conflict(
                "Trainer is not available at the requested time",
            ));
        }

        if !self
            .database
            .sessions()
            .claim_pending(session_id, scheduled_at, duration)
            .await?
        {
            return Err(AppError::conflict("Session is no longer pending"));
        }

        let session = self.require_session(session_id).await?;
        self.notifier
            .notify(&SchedulingEvent::SessionRequested(session.clone()))
            .await;
        Ok(session)
    }

    /// Trainer accepts or rejects a `requested` session. Acceptance is
    /// guarded in the database against overlapping sessions scheduled since
    /// the request was made; rejection cancels the request.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is missing, not this trainer's, not
    /// `requested`, or (on accept) the interval has since been taken
    pub async fn respond_to_request(
        &self,
        trainer_id: Uuid,
        session_id: Uuid,
        accept: bool,
    ) -> AppResult<TrainingSession> {
        let session = self.require_session(session_id).await?;
        if session.trainer_id != trainer_id {
            return Err(AppError::forbidden("Session belongs to another trainer"));
        }
        if session.status != SessionStatus::Requested {
            return Err(AppError::validation("Session has already been processed"));
        }

        if accept {
            let trainer = self.require_trainer(trainer_id).await?;
            if !self
                .interval_is_open(&trainer, session.scheduled_at, session.duration_minutes, Some(session_id))
                .await?
            {
                return Err(AppError::conflict(
                    "Requested time is no longer available",
                ));
            }
            if !self.database.sessions().approve_guarded(session_id).await? {
                return Err(AppError::conflict(
                    "Requested time is no longer available",
                ));
            }
            let session = self.require_session(session_id).await?;
            self.notifier
                .notify(&SchedulingEvent::SessionScheduled(session.clone()))
                .await;
            Ok(session)
        } else {
            self.database
                .sessions()
                .transition(session_id, &[SessionStatus::Requested], SessionStatus::Cancelled)
                .await?;
            let session = self.require_session(session_id).await?;
            self.notifier
                .notify(&SchedulingEvent::SessionRejected(session.clone()))
                .await;
            Ok(session)
        }
    }

    /// Move a non-terminal session to a new time. Either party to the
    /// session may reschedule it.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is missing, the actor is neither
    /// party, the session is terminal, or the new interval is closed
    pub async fn reschedule_session(
        &self,
        actor_id: Uuid,
        session_id: Uuid,
        scheduled_at: DateTime<Utc>,
        duration_minutes: Option<u32>,
    ) -> AppResult<TrainingSession> {
        let session = self.require_session(session_id).await?;
        if actor_id != session.trainer_id && actor_id != session.member_id {
            return Err(AppError::forbidden("Not a party to this session"));
        }
        if session.status.is_terminal() {
            return Err(AppError::conflict("Session can no longer be rescheduled"));
        }

        let duration = duration_minutes.unwrap_or(session.duration_minutes);
        validate_interval(scheduled_at, duration)?;

        let trainer = self.require_trainer(session.trainer_id).await?;
        if !self
            .interval_is_open(&trainer, scheduled_at, duration, Some(session_id))
            .await?
        {
            return Err(AppError::conflict(
                "Trainer is not available at the new time",
            ));
        }

        if !self
            .database
            .sessions()
            .reschedule(session_id, scheduled_at, duration)
            .await?
        {
            return Err(AppError::conflict("Session can no longer be rescheduled"));
        }

        let session = self.require_session(session_id).await?;
        if session.status == SessionStatus::Scheduled {
            self.notifier
                .notify(&SchedulingEvent::SessionScheduled(session.clone()))
                .await;
        }
        Ok(session)
    }

    /// Trainer records a finished session with the actual time spent.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is missing, not this trainer's, or
    /// not currently `scheduled`
    pub async fn complete_session(
        &self,
        trainer_id: Uuid,
        session_id: Uuid,
        actual_minutes_spent: u32,
        note: Option<String>,
    ) -> AppResult<TrainingSession> {
        let session = self.require_session(session_id).await?;
        if session.trainer_id != trainer_id {
            return Err(AppError::forbidden("Session belongs to another trainer"));
        }

        if !self
            .database
            .sessions()
            .complete(session_id, actual_minutes_spent, note.as_deref())
            .await?
        {
            return Err(AppError::conflict("Only scheduled sessions can be completed"));
        }

        let session = self.require_session(session_id).await?;
        self.notifier
            .notify(&SchedulingEvent::SessionCompleted(session.clone()))
            .await;
        Ok(session)
    }

    /// Cancel a session. The member may cancel their own `requested` or
    /// `scheduled` sessions; the trainer may cancel `scheduled` ones
    /// (rejecting a request goes through [`Self::respond_to_request`]).
    ///
    /// # Errors
    ///
    /// Returns an error if the session is missing, the actor is neither
    /// party, or the status does not permit cancellation by that actor
    pub async fn cancel_session(
        &self,
        actor_id: Uuid,
        session_id: Uuid,
    ) -> AppResult<TrainingSession> {
        let session = self.require_session(session_id).await?;
        let allowed: &[SessionStatus] = if actor_id == session.member_id {
            &[SessionStatus::Requested, SessionStatus::Scheduled]
        } else if actor_id == session.trainer_id {
            &[SessionStatus::Scheduled]
        } else {
            return Err(AppError::forbidden("Not a party to this session"));
        };

        let transitioned = self
            .database
            .sessions()
            .transition(session_id, allowed, SessionStatus::Cancelled)
            .await?;
        if !transitioned {
            return Err(AppError::conflict(
                "Session status does not permit cancellation",
            ));
        }

        let session = self.require_session(session_id).await?;
        self.notifier
            .notify(&SchedulingEvent::SessionCancelled {
                session: session.clone(),
                cancelled_by: actor_id,
            })
            .await;
        Ok(session)
    }

    /// Delete a session outright. Only the owning trainer may do this;
    /// members cancel instead so the record survives for their history.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is missing or the actor is not the
    /// session's trainer
    pub async fn delete_session(&self, trainer_id: Uuid, session_id: Uuid) -> AppResult<()> {
        let session = self.require_session(session_id).await?;
        if session.trainer_id != trainer_id {
            return Err(AppError::forbidden("Only the session's trainer may delete it"));
        }

        self.database.sessions().delete(session_id).await?;
        Ok(())
    }

    /// A trainer's open requests, oldest proposed time first
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn pending_requests(&self, trainer_id: Uuid) -> AppResult<Vec<TrainingSession>> {
        self.database
            .sessions()
            .list_for_trainer(trainer_id, Some(SessionStatus::Requested))
            .await
    }

    /// A trainer's sessions, optionally filtered by status
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn trainer_sessions(
        &self,
        trainer_id: Uuid,
        status: Option<SessionStatus>,
    ) -> AppResult<Vec<TrainingSession>> {
        self.database.sessions().list_for_trainer(trainer_id, status).await
    }

    /// A member's sessions, optionally filtered by status
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn member_sessions(
        &self,
        member_id: Uuid,
        status: Option<SessionStatus>,
    ) -> AppResult<Vec<TrainingSession>> {
        self.database.sessions().list_for_member(member_id, status).await
    }

    /// Get one session by id
    ///
    /// # Errors
    ///
    /// Returns an error if the session is missing or the lookup fails
    pub async fn get_session(&self, session_id: Uuid) -> AppResult<TrainingSession> {
        self.require_session(session_id).await
    }

    /// Completed-session totals for a member between two instants
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn session_progress(
        &self,
        member_id: Uuid,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> AppResult<SessionProgress> {
        let (completed_sessions, total_minutes) = self
            .database
            .sessions()
            .member_progress(member_id, since, until)
            .await?;
        Ok(SessionProgress {
            completed_sessions,
            total_minutes,
        })
    }

    /// Advisory check: the interval sits inside an open window on its local
    /// date and overlaps no `scheduled` session (optionally ignoring one
    /// session id, for reschedules and approvals).
    async fn interval_is_open(
        &self,
        trainer: &Trainer,
        scheduled_at: DateTime<Utc>,
        duration_minutes: u32,
        exclude: Option<Uuid>,
    ) -> AppResult<bool> {
        let end = scheduled_at + Duration::minutes(i64::from(duration_minutes));
        let date = local_date(scheduled_at, self.config.timezone);
        let windows = resolve_windows(&trainer.availability, date);
        if !fits_windows(scheduled_at, end, date, &windows, self.config.timezone) {
            return Ok(false);
        }

        // A day of slack on each side covers sessions straddling local
        // midnight in any timezone
        let mut nearby = self
            .database
            .sessions()
            .list_scheduled_in_range(
                trainer.id,
                scheduled_at - Duration::days(1),
                end + Duration::days(1),
            )
            .await?;
        if let Some(excluded) = exclude {
            nearby.retain(|s| s.id != excluded);
        }

        Ok(!conflicts_with_sessions(scheduled_at, end, &nearby))
    }

    /// The member's active-plan attachment for a proposed date, if the date
    /// falls inside the plan's range
    async fn plan_attachment(
        &self,
        member_id: Uuid,
        scheduled_at: DateTime<Utc>,
    ) -> AppResult<(Option<Uuid>, Option<u32>)> {
        let Some(plan) = self.database.plans().active_for_member(member_id).await? else {
            return Ok((None, None));
        };
        let date = local_date(scheduled_at, self.config.timezone);
        if date < plan.start_date || date > plan.end_date {
            return Ok((None, None));
        }
        Ok((
            Some(plan.id),
            Some(week_number_for(plan.start_date, date)),
        ))
    }

    async fn require_trainer(&self, trainer_id: Uuid) -> AppResult<Trainer> {
        self.database
            .trainers()
            .get(trainer_id)
            .await?
            .ok_or_else(|| AppError::not_found("Trainer").with_resource_id(trainer_id.to_string()))
    }

    async fn require_session(&self, session_id: Uuid) -> AppResult<TrainingSession> {
        self.database
            .sessions()
            .get(session_id)
            .await?
            .ok_or_else(|| AppError::not_found("Session").with_resource_id(session_id.to_string()))
    }
}

/// Reject degenerate intervals before any storage or window math
fn validate_interval(scheduled_at: DateTime<Utc>, duration_minutes: u32) -> AppResult<()> {
    if duration_minutes == 0 {
        return Err(AppError::validation("Duration must be positive"));
    }
    if scheduled_at < Utc::now() - Duration::minutes(1) {
        return Err(AppError::validation("Session time is in the past"));
    }
    Ok(())
}
