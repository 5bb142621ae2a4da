// ABOUTME: Scheduling event notifications emitted on session lifecycle transitions
// ABOUTME: Default implementation writes structured log lines; real channels plug in behind the trait
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Fitsched Contributors

//! Outbound notifications for scheduling outcomes.
//!
//! Delivery is fire-and-forget from the services' point of view: a failed
//! notification never rolls back the booking it describes.

use crate::models::{TrainingSession, WorkoutPlan};
use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

/// A scheduling outcome worth telling someone about
#[derive(Debug, Clone)]
pub enum SchedulingEvent {
    /// A member proposed a session time to a trainer
    SessionRequested(TrainingSession),
    /// A session was committed to the trainer's calendar
    SessionScheduled(TrainingSession),
    /// A trainer declined a requested session
    SessionRejected(TrainingSession),
    /// A session was cancelled by either party
    SessionCancelled { session: TrainingSession, cancelled_by: Uuid },
    /// A trainer recorded a finished session
    SessionCompleted(TrainingSession),
    /// A plan and its session batch were created
    PlanCreated { plan: WorkoutPlan, session_count: usize },
}

/// Notification delivery channel
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one event. Implementations swallow their own transport
    /// failures; callers do not retry.
    async fn notify(&self, event: &SchedulingEvent);
}

/// Notifier that records events as structured log lines
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, event: &SchedulingEvent) {
        match event {
            SchedulingEvent::SessionRequested(session) => info!(
                session_id = %session.id,
                trainer_id = %session.trainer_id,
                member_id = %session.member_id,
                scheduled_at = %session.scheduled_at,
                "session requested"
            ),
            SchedulingEvent::SessionScheduled(session) => info!(
                session_id = %session.id,
                trainer_id = %session.trainer_id,
                member_id = %session.member_id,
                scheduled_at = %session.scheduled_at,
                "session scheduled"
            ),
            SchedulingEvent::SessionRejected(session) => info!(
                session_id = %session.id,
                trainer_id = %session.trainer_id,
                member_id = %session.member_id,
                "session request rejected"
            ),
            SchedulingEvent::SessionCancelled { session, cancelled_by } => info!(
                session_id = %session.id,
                trainer_id = %session.trainer_id,
                member_id = %session.member_id,
                cancelled_by = %cancelled_by,
                "session cancelled"
            ),
            SchedulingEvent::SessionCompleted(session) => info!(
                session_id = %session.id,
                member_id = %session.member_id,
                actual_minutes_spent = session.actual_minutes_spent,
                "session completed"
            ),
            SchedulingEvent::PlanCreated { plan, session_count } => info!(
                plan_id = %plan.id,
                ref_id = %plan.ref_id,
                trainer_id = %plan.trainer_id,
                member_id = %plan.member_id,
                session_count,
                "workout plan created"
            ),
        }
    }
}
