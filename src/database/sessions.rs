// ABOUTME: Database operations for training sessions and their lifecycle transitions
// ABOUTME: Carries the conditional-write booking guard and the daily sweep updates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Fitsched Contributors

//! Training session storage.
//!
//! Booking commits are guarded: [`SessionsManager::insert_scheduled_guarded`]
//! and [`SessionsManager::approve_guarded`] only take effect where no
//! overlapping `scheduled` session exists for the trainer, in one
//! conditional statement. Two near-simultaneous advisory checks can both
//! observe "free", but only one commit wins.

use crate::database::trainers::{parse_instant, parse_uuid};
use crate::errors::{AppError, AppResult};
use crate::models::{SessionDraft, SessionStatus, SessionType, TrainingSession};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use sqlx::{sqlite::SqliteRow, Row, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

/// Format an instant as normalized RFC3339 UTC text.
///
/// All session timestamp columns use this one format so lexicographic
/// comparison inside SQL equals chronological comparison.
pub(crate) fn fmt_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Session database operations manager
pub struct SessionsManager {
    pool: SqlitePool,
}

impl SessionsManager {
    /// Create a new sessions manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Materialize a draft into a full session record with fresh identity
    fn session_from_draft(draft: &SessionDraft, now: DateTime<Utc>) -> TrainingSession {
        TrainingSession {
            id: Uuid::new_v4(),
            member_id: draft.member_id,
            trainer_id: draft.trainer_id,
            workout_plan_id: draft.workout_plan_id,
            week_number: draft.week_number,
            status: draft.status,
            scheduled_at: draft.scheduled_at,
            duration_minutes: draft.duration_minutes,
            actual_minutes_spent: 0,
            session_type: draft.session_type,
            note: draft.note.clone(),
            attended: false,
            needs_manual_scheduling: draft.needs_manual_scheduling,
            created_at: now,
            updated_at: now,
        }
    }

    /// Insert a session unconditionally (pending/requested records that do
    /// not block other bookings)
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn insert(&self, draft: &SessionDraft) -> AppResult<TrainingSession> {
        let session = Self::session_from_draft(draft, Utc::now());
        sqlx::query(&insert_sql(false))
            .bind(session.id.to_string())
            .bind(session.member_id.to_string())
            .bind(session.trainer_id.to_string())
            .bind(session.workout_plan_id.map(|id| id.to_string()))
            .bind(session.week_number.map(i64::from))
            .bind(session.status.as_str())
            .bind(fmt_instant(session.scheduled_at))
            .bind(fmt_instant(session.end_at()))
            .bind(i64::from(session.duration_minutes))
            .bind(i64::from(session.actual_minutes_spent))
            .bind(session.session_type.as_str())
            .bind(&session.note)
            .bind(session.attended)
            .bind(session.needs_manual_scheduling)
            .bind(fmt_instant(session.created_at))
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to create session: {e}")))?;

        Ok(session)
    }

    /// Conditionally insert a `scheduled` session: the row is written only
    /// where no overlapping `scheduled` session exists for the trainer.
    ///
    /// Returns `None` when the guard rejected the commit (another booking
    /// holds the interval).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn insert_scheduled_guarded(
        &self,
        draft: &SessionDraft,
    ) -> AppResult<Option<TrainingSession>> {
        let session = Self::session_from_draft(draft, Utc::now());
        let result = sqlx::query(&insert_sql(true))
            .bind(session.id.to_string())
            .bind(session.member_id.to_string())
            .bind(session.trainer_id.to_string())
            .bind(session.workout_plan_id.map(|id| id.to_string()))
            .bind(session.week_number.map(i64::from))
            .bind(session.status.as_str())
            .bind(fmt_instant(session.scheduled_at))
            .bind(fmt_instant(session.end_at()))
            .bind(i64::from(session.duration_minutes))
            .bind(i64::from(session.actual_minutes_spent))
            .bind(session.session_type.as_str())
            .bind(&session.note)
            .bind(session.attended)
            .bind(session.needs_manual_scheduling)
            .bind(fmt_instant(session.created_at))
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to book session: {e}")))?;

        Ok((result.rows_affected() > 0).then_some(session))
    }

    /// Insert one session inside an open transaction (plan batch creation)
    pub(crate) async fn insert_in_tx(
        tx: &mut Transaction<'_, Sqlite>,
        draft: &SessionDraft,
        now: DateTime<Utc>,
    ) -> AppResult<TrainingSession> {
        let session = Self::session_from_draft(draft, now);
        sqlx::query(&insert_sql(false))
            .bind(session.id.to_string())
            .bind(session.member_id.to_string())
            .bind(session.trainer_id.to_string())
            .bind(session.workout_plan_id.map(|id| id.to_string()))
            .bind(session.week_number.map(i64::from))
            .bind(session.status.as_str())
            .bind(fmt_instant(session.scheduled_at))
            .bind(fmt_instant(session.end_at()))
            .bind(i64::from(session.duration_minutes))
            .bind(i64::from(session.actual_minutes_spent))
            .bind(session.session_type.as_str())
            .bind(&session.note)
            .bind(session.attended)
            .bind(session.needs_manual_scheduling)
            .bind(fmt_instant(session.created_at))
            .execute(&mut **tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to insert plan session: {e}")))?;

        Ok(session)
    }

    /// Get a session by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get(&self, session_id: Uuid) -> AppResult<Option<TrainingSession>> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(session_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get session: {e}")))?;

        row.map(|r| session_from_row(&r)).transpose()
    }

    /// List a trainer's sessions, optionally filtered by status, ordered by
    /// scheduled time
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list_for_trainer(
        &self,
        trainer_id: Uuid,
        status: Option<SessionStatus>,
    ) -> AppResult<Vec<TrainingSession>> {
        let rows = match status {
            Some(status) => {
                sqlx::query(&format!(
                    "{SELECT_COLUMNS} WHERE trainer_id = $1 AND status = $2 ORDER BY scheduled_at"
                ))
                .bind(trainer_id.to_string())
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "{SELECT_COLUMNS} WHERE trainer_id = $1 ORDER BY scheduled_at"
                ))
                .bind(trainer_id.to_string())
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| AppError::database(format!("Failed to list sessions: {e}")))?;

        rows.iter().map(session_from_row).collect()
    }

    /// List a trainer's `scheduled` sessions starting inside `[from, to]`
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list_scheduled_in_range(
        &self,
        trainer_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<TrainingSession>> {
        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS}
             WHERE trainer_id = $1 AND status = 'scheduled'
               AND scheduled_at >= $2 AND scheduled_at <= $3
             ORDER BY scheduled_at"
        ))
        .bind(trainer_id.to_string())
        .bind(fmt_instant(from))
        .bind(fmt_instant(to))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list scheduled sessions: {e}")))?;

        rows.iter().map(session_from_row).collect()
    }

    /// List a member's sessions, optionally filtered by status, most recent
    /// first
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list_for_member(
        &self,
        member_id: Uuid,
        status: Option<SessionStatus>,
    ) -> AppResult<Vec<TrainingSession>> {
        let rows = match status {
            Some(status) => {
                sqlx::query(&format!(
                    "{SELECT_COLUMNS} WHERE member_id = $1 AND status = $2 ORDER BY scheduled_at DESC"
                ))
                .bind(member_id.to_string())
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "{SELECT_COLUMNS} WHERE member_id = $1 ORDER BY scheduled_at DESC"
                ))
                .bind(member_id.to_string())
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| AppError::database(format!("Failed to list member sessions: {e}")))?;

        rows.iter().map(session_from_row).collect()
    }

    /// Transition a session to `to` iff its current status is in `allowed`.
    /// Returns whether a row changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn transition(
        &self,
        session_id: Uuid,
        allowed: &[SessionStatus],
        to: SessionStatus,
    ) -> AppResult<bool> {
        // Statuses are a closed enum; inlining their strings is safe
        let allowed_list = allowed
            .iter()
            .map(|s| format!("'{}'", s.as_str()))
            .collect::<Vec<_>>()
            .join(", ");

        let result = sqlx::query(&format!(
            "UPDATE training_sessions SET status = $2, updated_at = $3
             WHERE id = $1 AND status IN ({allowed_list})"
        ))
        .bind(session_id.to_string())
        .bind(to.as_str())
        .bind(fmt_instant(Utc::now()))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to transition session: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Approve a `requested` session, guarded against overlapping
    /// `scheduled` sessions of the same trainer in the same statement.
    /// Returns whether the approval took effect.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn approve_guarded(&self, session_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE training_sessions
            SET status = 'scheduled', updated_at = $2
            WHERE id = $1 AND status = 'requested'
              AND NOT EXISTS (
                  SELECT 1 FROM training_sessions AS other
                  WHERE other.trainer_id = training_sessions.trainer_id
                    AND other.id <> training_sessions.id
                    AND other.status = 'scheduled'
                    AND other.scheduled_at < training_sessions.scheduled_end
                    AND other.scheduled_end > training_sessions.scheduled_at
              )
            ",
        )
        .bind(session_id.to_string())
        .bind(fmt_instant(Utc::now()))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to approve session: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Move a session to a new start/duration. Both timestamp columns are
    /// rewritten together. Returns whether a row changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn reschedule(
        &self,
        session_id: Uuid,
        scheduled_at: DateTime<Utc>,
        duration_minutes: u32,
    ) -> AppResult<bool> {
        let scheduled_end = scheduled_at + Duration::minutes(i64::from(duration_minutes));
        let result = sqlx::query(
            r"
            UPDATE training_sessions
            SET scheduled_at = $2, scheduled_end = $3, duration_minutes = $4, updated_at = $5
            WHERE id = $1 AND status NOT IN ('completed', 'cancelled')
            ",
        )
        .bind(session_id.to_string())
        .bind(fmt_instant(scheduled_at))
        .bind(fmt_instant(scheduled_end))
        .bind(i64::from(duration_minutes))
        .bind(fmt_instant(Utc::now()))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to reschedule session: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Member claims a `pending` placeholder by proposing a concrete time;
    /// the session becomes `requested`. Returns whether a row changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn claim_pending(
        &self,
        session_id: Uuid,
        scheduled_at: DateTime<Utc>,
        duration_minutes: u32,
    ) -> AppResult<bool> {
        let scheduled_end = scheduled_at + Duration::minutes(i64::from(duration_minutes));
        let result = sqlx::query(
            r"
            UPDATE training_sessions
            SET status = 'requested', scheduled_at = $2, scheduled_end = $3,
                duration_minutes = $4, needs_manual_scheduling = 0, updated_at = $5
            WHERE id = $1 AND status = 'pending'
            ",
        )
        .bind(session_id.to_string())
        .bind(fmt_instant(scheduled_at))
        .bind(fmt_instant(scheduled_end))
        .bind(i64::from(duration_minutes))
        .bind(fmt_instant(Utc::now()))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to claim session: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Mark a `scheduled` session `completed` with the actual time spent.
    /// Returns whether a row changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn complete(
        &self,
        session_id: Uuid,
        actual_minutes_spent: u32,
        note: Option<&str>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE training_sessions
            SET status = 'completed', actual_minutes_spent = $2, attended = 1,
                note = COALESCE($3, note), updated_at = $4
            WHERE id = $1 AND status = 'scheduled'
            ",
        )
        .bind(session_id.to_string())
        .bind(i64::from(actual_minutes_spent))
        .bind(note)
        .bind(fmt_instant(Utc::now()))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to complete session: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Sweep: every `scheduled` session before the cutoff becomes
    /// `completed`, with the planned duration standing in for actual time.
    /// Returns the number of rows transitioned.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn sweep_complete_past(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE training_sessions
            SET status = 'completed', actual_minutes_spent = duration_minutes, updated_at = $2
            WHERE status = 'scheduled' AND scheduled_at < $1
            ",
        )
        .bind(fmt_instant(cutoff))
        .bind(fmt_instant(Utc::now()))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to complete past sessions: {e}")))?;

        Ok(result.rows_affected())
    }

    /// Sweep: every `pending` or `requested` session before the cutoff was
    /// never committed in time and becomes `cancelled`. Returns the number
    /// of rows transitioned.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn sweep_cancel_stale(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE training_sessions
            SET status = 'cancelled', updated_at = $2
            WHERE status IN ('pending', 'requested') AND scheduled_at < $1
            ",
        )
        .bind(fmt_instant(cutoff))
        .bind(fmt_instant(Utc::now()))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to cancel stale sessions: {e}")))?;

        Ok(result.rows_affected())
    }

    /// Hard-delete a session row. Returns `false` when no row matched.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn delete(&self, session_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM training_sessions WHERE id = $1")
            .bind(session_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete session: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Count a plan's completed sessions
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn count_completed_for_plan(&self, plan_id: Uuid) -> AppResult<u32> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS count FROM training_sessions
             WHERE workout_plan_id = $1 AND status = 'completed'",
        )
        .bind(plan_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to count sessions: {e}")))?;

        let count: i64 = row.try_get("count")?;
        Ok(u32::try_from(count).unwrap_or(0))
    }

    /// Completed-session count and total minutes for a member inside a
    /// completion-time window
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn member_progress(
        &self,
        member_id: Uuid,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> AppResult<(u32, u64)> {
        let row = sqlx::query(
            r"
            SELECT COUNT(*) AS count, COALESCE(SUM(actual_minutes_spent), 0) AS minutes
            FROM training_sessions
            WHERE member_id = $1 AND status = 'completed'
              AND updated_at >= $2 AND updated_at <= $3
            ",
        )
        .bind(member_id.to_string())
        .bind(fmt_instant(since))
        .bind(fmt_instant(until))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to compute progress: {e}")))?;

        let count: i64 = row.try_get("count")?;
        let minutes: i64 = row.try_get("minutes")?;
        Ok((
            u32::try_from(count).unwrap_or(0),
            u64::try_from(minutes).unwrap_or(0),
        ))
    }
}

const SELECT_COLUMNS: &str = r"
    SELECT id, member_id, trainer_id, workout_plan_id, week_number, status,
           scheduled_at, scheduled_end, duration_minutes, actual_minutes_spent,
           session_type, note, attended, needs_manual_scheduling,
           created_at, updated_at
    FROM training_sessions
";

/// Build the insert statement, optionally guarded by the no-overlap
/// predicate against the trainer's `scheduled` sessions
fn insert_sql(guarded: bool) -> String {
    let guard = if guarded {
        r"
        WHERE NOT EXISTS (
            SELECT 1 FROM training_sessions
            WHERE trainer_id = $3 AND status = 'scheduled'
              AND scheduled_at < $8 AND scheduled_end > $7
        )"
    } else {
        ""
    };

    format!(
        r"
        INSERT INTO training_sessions (
            id, member_id, trainer_id, workout_plan_id, week_number, status,
            scheduled_at, scheduled_end, duration_minutes, actual_minutes_spent,
            session_type, note, attended, needs_manual_scheduling,
            created_at, updated_at
        )
        SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $15
        {guard}
        "
    )
}

/// Map a database row onto a session record
pub(crate) fn session_from_row(row: &SqliteRow) -> AppResult<TrainingSession> {
    let id: String = row.try_get("id")?;
    let member_id: String = row.try_get("member_id")?;
    let trainer_id: String = row.try_get("trainer_id")?;
    let workout_plan_id: Option<String> = row.try_get("workout_plan_id")?;
    let week_number: Option<i64> = row.try_get("week_number")?;
    let status: String = row.try_get("status")?;
    let scheduled_at: String = row.try_get("scheduled_at")?;
    let duration_minutes: i64 = row.try_get("duration_minutes")?;
    let actual_minutes_spent: i64 = row.try_get("actual_minutes_spent")?;
    let session_type: String = row.try_get("session_type")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(TrainingSession {
        id: parse_uuid(&id)?,
        member_id: parse_uuid(&member_id)?,
        trainer_id: parse_uuid(&trainer_id)?,
        workout_plan_id: workout_plan_id.as_deref().map(parse_uuid).transpose()?,
        week_number: week_number.map(|n| u32::try_from(n).unwrap_or(0)),
        status: SessionStatus::parse(&status),
        scheduled_at: parse_instant(&scheduled_at)?,
        duration_minutes: u32::try_from(duration_minutes).unwrap_or(0),
        actual_minutes_spent: u32::try_from(actual_minutes_spent).unwrap_or(0),
        session_type: SessionType::parse(&session_type),
        note: row.try_get("note")?,
        attended: row.try_get("attended")?,
        needs_manual_scheduling: row.try_get("needs_manual_scheduling")?,
        created_at: parse_instant(&created_at)?,
        updated_at: parse_instant(&updated_at)?,
    })
}
