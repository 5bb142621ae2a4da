// ABOUTME: Database operations for trainer profiles and their stored availability
// ABOUTME: Availability is persisted as JSON text columns, one per mapping source
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Fitsched Contributors

use crate::errors::{AppError, AppResult};
use crate::models::{Trainer, TrainerAvailability};
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

/// Trainer database operations manager
pub struct TrainersManager {
    pool: SqlitePool,
}

impl TrainersManager {
    /// Create a new trainers manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new trainer
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create(
        &self,
        name: &str,
        availability: &TrainerAvailability,
    ) -> AppResult<Trainer> {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let recurring_json = serde_json::to_string(&availability.recurring)?;
        let overrides_json = serde_json::to_string(&availability.date_overrides)?;

        sqlx::query(
            r"
            INSERT INTO trainers (id, name, recurring_windows, date_overrides, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            ",
        )
        .bind(id.to_string())
        .bind(name)
        .bind(&recurring_json)
        .bind(&overrides_json)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create trainer: {e}")))?;

        Ok(Trainer {
            id,
            name: name.to_owned(),
            availability: availability.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a trainer by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get(&self, trainer_id: Uuid) -> AppResult<Option<Trainer>> {
        let row = sqlx::query(
            r"
            SELECT id, name, recurring_windows, date_overrides, created_at, updated_at
            FROM trainers
            WHERE id = $1
            ",
        )
        .bind(trainer_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get trainer: {e}")))?;

        row.map(|r| Self::trainer_from_row(&r)).transpose()
    }

    /// Replace a trainer's stored availability
    ///
    /// Consistency with existing `scheduled` sessions is the service
    /// layer's responsibility; this is a plain write.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the trainer does not exist
    pub async fn update_availability(
        &self,
        trainer_id: Uuid,
        availability: &TrainerAvailability,
    ) -> AppResult<()> {
        let recurring_json = serde_json::to_string(&availability.recurring)?;
        let overrides_json = serde_json::to_string(&availability.date_overrides)?;

        let result = sqlx::query(
            r"
            UPDATE trainers
            SET recurring_windows = $2, date_overrides = $3, updated_at = $4
            WHERE id = $1
            ",
        )
        .bind(trainer_id.to_string())
        .bind(&recurring_json)
        .bind(&overrides_json)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update availability: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Trainer").with_resource_id(trainer_id.to_string()));
        }

        Ok(())
    }

    fn trainer_from_row(row: &SqliteRow) -> AppResult<Trainer> {
        let id: String = row.try_get("id")?;
        let recurring_json: String = row.try_get("recurring_windows")?;
        let overrides_json: String = row.try_get("date_overrides")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        Ok(Trainer {
            id: parse_uuid(&id)?,
            name: row.try_get("name")?,
            availability: TrainerAvailability {
                recurring: serde_json::from_str(&recurring_json)?,
                date_overrides: serde_json::from_str(&overrides_json)?,
            },
            created_at: parse_instant(&created_at)?,
            updated_at: parse_instant(&updated_at)?,
        })
    }
}

/// Parse a stored UUID column
pub(crate) fn parse_uuid(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|e| AppError::database(format!("Invalid UUID '{raw}': {e}")))
}

/// Parse a stored RFC3339 instant column
pub(crate) fn parse_instant(raw: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::database(format!("Invalid timestamp '{raw}': {e}")))
}
