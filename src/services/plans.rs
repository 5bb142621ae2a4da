// ABOUTME: Workout plan service: validation, auto-placement, atomic persistence
// ABOUTME: A plan either lands with its entire session batch or not at all
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Fitsched Contributors

//! Workout plan service.

use crate::config::SchedulingConfig;
use crate::database::plans::NewWorkoutPlan;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{TrainingSession, WeeklySessionTarget, WorkoutPlan};
use crate::notifications::{Notifier, SchedulingEvent};
use crate::scheduling::intervals::start_of_day;
use crate::scheduling::planner::{schedule_plan_sessions, validate_plan, PlanSpec};
use chrono::Duration;
use std::sync::Arc;
use uuid::Uuid;

/// A plan with its sessions and completion progress
#[derive(Debug, Clone, serde::Serialize)]
pub struct PlanDetails {
    pub plan: WorkoutPlan,
    pub sessions: Vec<TrainingSession>,
    pub completed_sessions: u32,
}

/// Workout plan service
pub struct PlanService {
    database: Database,
    config: SchedulingConfig,
    notifier: Arc<dyn Notifier>,
}

impl PlanService {
    /// Create a new plan service
    #[must_use]
    pub fn new(database: Database, config: SchedulingConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            database,
            config,
            notifier,
        }
    }

    /// Create a workout plan with its full session batch.
    ///
    /// Placement runs first, entirely in memory against the trainer's
    /// availability and current bookings; persistence is one transaction.
    /// A validation failure therefore leaves nothing behind.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is invalid, the trainer or an explicit
    /// placement conflicts, or the transaction fails
    pub async fn create_workout_plan(
        &self,
        trainer_id: Uuid,
        member_id: Uuid,
        spec: &PlanSpec,
    ) -> AppResult<PlanDetails> {
        validate_plan(spec)?;

        let trainer = self
            .database
            .trainers()
            .get(trainer_id)
            .await?
            .ok_or_else(|| AppError::not_found("Trainer").with_resource_id(trainer_id.to_string()))?;

        if self
            .database
            .plans()
            .active_for_member(member_id)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("Member already has an active plan"));
        }

        let from = start_of_day(spec.start_date - Duration::days(1), self.config.timezone);
        let to = start_of_day(spec.end_date + Duration::days(2), self.config.timezone);
        let existing = self
            .database
            .sessions()
            .list_scheduled_in_range(trainer_id, from, to)
            .await?;

        let plan_id = Uuid::new_v4();
        let drafts = schedule_plan_sessions(
            spec,
            trainer_id,
            member_id,
            plan_id,
            &trainer.availability,
            &existing,
            &self.config,
        )?;

        let weekly_sessions: Vec<WeeklySessionTarget> = spec
            .weeks
            .iter()
            .enumerate()
            .map(|(index, week)| WeeklySessionTarget {
                week_number: u32::try_from(index).unwrap_or(u32::MAX) + 1,
                session_count: week.session_count,
            })
            .collect();

        let (plan, sessions) = self
            .database
            .plans()
            .create_with_sessions(
                &NewWorkoutPlan {
                    id: plan_id,
                    trainer_id,
                    member_id,
                    goal: spec.goal.clone(),
                    start_date: spec.start_date,
                    end_date: spec.end_date,
                    weekly_sessions,
                },
                &drafts,
            )
            .await?;

        self.notifier
            .notify(&SchedulingEvent::PlanCreated {
                plan: plan.clone(),
                session_count: sessions.len(),
            })
            .await;

        Ok(PlanDetails {
            plan,
            sessions,
            completed_sessions: 0,
        })
    }

    /// Get a plan with its sessions and completion count
    ///
    /// # Errors
    ///
    /// Returns an error if the plan is missing or a lookup fails
    pub async fn get_workout_plan(&self, plan_id: Uuid) -> AppResult<PlanDetails> {
        let plan = self
            .database
            .plans()
            .get(plan_id)
            .await?
            .ok_or_else(|| AppError::not_found("Workout plan").with_resource_id(plan_id.to_string()))?;

        let mut sessions = self
            .database
            .sessions()
            .list_for_member(plan.member_id, None)
            .await?;
        sessions.retain(|s| s.workout_plan_id == Some(plan.id));
        sessions.sort_by_key(|s| s.scheduled_at);

        let completed_sessions = self
            .database
            .sessions()
            .count_completed_for_plan(plan.id)
            .await?;

        Ok(PlanDetails {
            plan,
            sessions,
            completed_sessions,
        })
    }
}
