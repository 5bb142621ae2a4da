// ABOUTME: Trainer availability service: free-slot computation and pattern updates
// ABOUTME: Availability changes are refused while they would orphan scheduled sessions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Fitsched Contributors

//! Availability service.

use crate::config::SchedulingConfig;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{Trainer, TrainerAvailability};
use crate::scheduling::availability::resolve_windows;
use crate::scheduling::conflicts::fits_windows;
use crate::scheduling::intervals::{local_date, start_of_day};
use crate::scheduling::slots::{free_slots_for_date, free_slots_for_range};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Trainer availability service
pub struct AvailabilityService {
    database: Database,
    config: SchedulingConfig,
}

impl AvailabilityService {
    /// Create a new availability service
    #[must_use]
    pub const fn new(database: Database, config: SchedulingConfig) -> Self {
        Self { database, config }
    }

    /// Register a trainer with an initial availability pattern
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is malformed or the insert fails
    pub async fn register_trainer(
        &self,
        name: &str,
        availability: &TrainerAvailability,
    ) -> AppResult<Trainer> {
        validate_pattern(availability)?;
        self.database.trainers().create(name, availability).await
    }

    /// Get a trainer by id
    ///
    /// # Errors
    ///
    /// Returns an error if the trainer is missing or the lookup fails
    pub async fn get_trainer(&self, trainer_id: Uuid) -> AppResult<Trainer> {
        self.database
            .trainers()
            .get(trainer_id)
            .await?
            .ok_or_else(|| AppError::not_found("Trainer").with_resource_id(trainer_id.to_string()))
    }

    /// Replace a trainer's availability pattern.
    ///
    /// The update is refused while any upcoming `scheduled` session would
    /// fall outside the new pattern's windows; those sessions must be
    /// rescheduled or cancelled first.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorCode::Conflict`](crate::errors::ErrorCode::Conflict)
    /// naming the first orphaned session when the pattern cuts one off
    pub async fn update_availability(
        &self,
        trainer_id: Uuid,
        availability: &TrainerAvailability,
    ) -> AppResult<Trainer> {
        validate_pattern(availability)?;
        let trainer = self.get_trainer(trainer_id).await?;

        let now = Utc::now();
        let upcoming = self
            .database
            .sessions()
            .list_scheduled_in_range(trainer.id, now, now + Duration::days(366))
            .await?;
        for session in &upcoming {
            let date = local_date(session.scheduled_at, self.config.timezone);
            let windows = resolve_windows(availability, date);
            if !fits_windows(
                session.scheduled_at,
                session.end_at(),
                date,
                &windows,
                self.config.timezone,
            ) {
                return Err(AppError::conflict(format!(
                    "Scheduled session on {date} falls outside the new availability"
                ))
                .with_resource_id(session.id.to_string()));
            }
        }

        self.database
            .trainers()
            .update_availability(trainer_id, availability)
            .await?;
        self.get_trainer(trainer_id).await
    }

    /// Bookable slot start instants for one local date
    ///
    /// # Errors
    ///
    /// Returns an error if the trainer is missing or a lookup fails
    pub async fn free_slots(
        &self,
        trainer_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Vec<DateTime<Utc>>> {
        let trainer = self.get_trainer(trainer_id).await?;
        let sessions = self.scheduled_around(trainer_id, date, date).await?;
        Ok(free_slots_for_date(
            &trainer.availability,
            &sessions,
            date,
            self.config.timezone,
            self.config.slot_granularity_minutes,
        ))
    }

    /// Bookable slot start instants for an inclusive local date range, keyed
    /// by date; fully booked or closed dates are omitted
    ///
    /// # Errors
    ///
    /// Returns an error if the range is inverted or too wide, the trainer is
    /// missing, or a lookup fails
    pub async fn free_slots_range(
        &self,
        trainer_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> AppResult<BTreeMap<NaiveDate, Vec<DateTime<Utc>>>> {
        if start_date > end_date {
            return Err(AppError::validation("Start date must not be after end date"));
        }
        if (end_date - start_date).num_days() > 92 {
            return Err(AppError::validation("Date range is limited to 92 days"));
        }

        let trainer = self.get_trainer(trainer_id).await?;
        let sessions = self.scheduled_around(trainer_id, start_date, end_date).await?;
        Ok(free_slots_for_range(
            &trainer.availability,
            &sessions,
            start_date,
            end_date,
            self.config.timezone,
            self.config.slot_granularity_minutes,
        ))
    }

    /// Scheduled sessions near a local date range, with a day of slack on
    /// each side for sessions straddling midnight
    async fn scheduled_around(
        &self,
        trainer_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> AppResult<Vec<crate::models::TrainingSession>> {
        let from = start_of_day(start_date - Duration::days(1), self.config.timezone);
        let to = start_of_day(end_date + Duration::days(2), self.config.timezone);
        self.database
            .sessions()
            .list_scheduled_in_range(trainer_id, from, to)
            .await
    }
}

/// Every window must be well-formed: start strictly before end
fn validate_pattern(availability: &TrainerAvailability) -> AppResult<()> {
    let recurring = availability.recurring.values().flatten();
    let overridden = availability.date_overrides.values().flatten();
    for window in recurring.chain(overridden) {
        if window.start >= window.end {
            return Err(AppError::validation(
                "Availability window start must be before its end",
            ));
        }
    }
    Ok(())
}
