// ABOUTME: Database operations for workout plans and their session batches
// ABOUTME: Plan creation commits the plan row and every session in one transaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Fitsched Contributors

//! Workout plan storage.

use crate::database::sessions::{fmt_instant, SessionsManager};
use crate::database::trainers::{parse_instant, parse_uuid};
use crate::errors::{AppError, AppResult};
use crate::models::{PlanStatus, SessionDraft, TrainingSession, WeeklySessionTarget, WorkoutPlan};
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

/// Workout plan database operations manager
pub struct PlansManager {
    pool: SqlitePool,
}

impl PlansManager {
    /// Create a new plans manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a plan and its full session batch atomically. Either the plan
    /// row and every session land, or nothing does.
    ///
    /// The human-readable reference id (`WKP-001`, `WKP-002`, ...) is
    /// assigned from the plan count inside the same transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement in the batch fails
    pub async fn create_with_sessions(
        &self,
        plan: &NewWorkoutPlan,
        drafts: &[SessionDraft],
    ) -> AppResult<(WorkoutPlan, Vec<TrainingSession>)> {
        let now = Utc::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        let row = sqlx::query("SELECT COUNT(*) AS count FROM workout_plans")
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to count plans: {e}")))?;
        let count: i64 = row.try_get("count")?;
        let ref_id = format!("WKP-{:03}", count + 1);

        let stored = WorkoutPlan {
            id: plan.id,
            ref_id,
            trainer_id: plan.trainer_id,
            member_id: plan.member_id,
            goal: plan.goal.clone(),
            start_date: plan.start_date,
            end_date: plan.end_date,
            weekly_sessions: plan.weekly_sessions.clone(),
            status: PlanStatus::Active,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r"
            INSERT INTO workout_plans (
                id, ref_id, trainer_id, member_id, goal, start_date, end_date,
                weekly_sessions, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            ",
        )
        .bind(stored.id.to_string())
        .bind(&stored.ref_id)
        .bind(stored.trainer_id.to_string())
        .bind(stored.member_id.to_string())
        .bind(&stored.goal)
        .bind(stored.start_date.to_string())
        .bind(stored.end_date.to_string())
        .bind(serde_json::to_string(&stored.weekly_sessions)?)
        .bind(stored.status.as_str())
        .bind(fmt_instant(now))
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to create plan: {e}")))?;

        let mut sessions = Vec::with_capacity(drafts.len());
        for draft in drafts {
            sessions.push(SessionsManager::insert_in_tx(&mut tx, draft, now).await?);
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit plan: {e}")))?;

        Ok((stored, sessions))
    }

    /// Get a plan by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get(&self, plan_id: Uuid) -> AppResult<Option<WorkoutPlan>> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(plan_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get plan: {e}")))?;

        row.map(|r| plan_from_row(&r)).transpose()
    }

    /// The member's most recently created active plan, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn active_for_member(&self, member_id: Uuid) -> AppResult<Option<WorkoutPlan>> {
        let row = sqlx::query(&format!(
            "{SELECT_COLUMNS}
             WHERE member_id = $1 AND status = 'active'
             ORDER BY created_at DESC LIMIT 1"
        ))
        .bind(member_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get active plan: {e}")))?;

        row.map(|r| plan_from_row(&r)).transpose()
    }
}

/// Insertable plan record; ref id, status, and timestamps are assigned at
/// commit time. The id is caller-supplied so session drafts can reference
/// the plan before it exists.
#[derive(Debug, Clone)]
pub struct NewWorkoutPlan {
    pub id: Uuid,
    pub trainer_id: Uuid,
    pub member_id: Uuid,
    pub goal: String,
    pub start_date: chrono::NaiveDate,
    pub end_date: chrono::NaiveDate,
    pub weekly_sessions: Vec<WeeklySessionTarget>,
}

const SELECT_COLUMNS: &str = r"
    SELECT id, ref_id, trainer_id, member_id, goal, start_date, end_date,
           weekly_sessions, status, created_at, updated_at
    FROM workout_plans
";

/// Map a database row onto a plan record
fn plan_from_row(row: &SqliteRow) -> AppResult<WorkoutPlan> {
    let id: String = row.try_get("id")?;
    let trainer_id: String = row.try_get("trainer_id")?;
    let member_id: String = row.try_get("member_id")?;
    let start_date: String = row.try_get("start_date")?;
    let end_date: String = row.try_get("end_date")?;
    let weekly_sessions: String = row.try_get("weekly_sessions")?;
    let status: String = row.try_get("status")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(WorkoutPlan {
        id: parse_uuid(&id)?,
        ref_id: row.try_get("ref_id")?,
        trainer_id: parse_uuid(&trainer_id)?,
        member_id: parse_uuid(&member_id)?,
        goal: row.try_get("goal")?,
        start_date: parse_date(&start_date)?,
        end_date: parse_date(&end_date)?,
        weekly_sessions: serde_json::from_str(&weekly_sessions)?,
        status: PlanStatus::parse(&status),
        created_at: parse_instant(&created_at)?,
        updated_at: parse_instant(&updated_at)?,
    })
}

fn parse_date(s: &str) -> AppResult<chrono::NaiveDate> {
    s.parse()
        .map_err(|e| AppError::database(format!("Invalid date in database: {e}")))
}
