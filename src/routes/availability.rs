// ABOUTME: Route handlers for trainer registration, availability patterns, and free slots
// ABOUTME: Availability checks here are advisory; booking commits are guarded elsewhere
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Fitsched Contributors

//! Trainer availability routes

use crate::errors::AppError;
use crate::models::{Trainer, TrainerAvailability};
use crate::routes::ServerResources;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Request to register a trainer
#[derive(Debug, Deserialize)]
pub struct RegisterTrainerBody {
    /// Display name
    pub name: String,
    /// Initial availability pattern; defaults to fully closed
    #[serde(default)]
    pub availability: TrainerAvailability,
}

/// Trainer profile response
#[derive(Debug, Serialize)]
pub struct TrainerResponse {
    pub id: String,
    pub name: String,
    pub availability: TrainerAvailability,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Trainer> for TrainerResponse {
    fn from(trainer: Trainer) -> Self {
        Self {
            id: trainer.id.to_string(),
            name: trainer.name,
            availability: trainer.availability,
            created_at: trainer.created_at.to_rfc3339(),
            updated_at: trainer.updated_at.to_rfc3339(),
        }
    }
}

/// Query for a point-in-time availability check
#[derive(Debug, Deserialize)]
pub struct AvailabilityCheckQuery {
    /// Proposed session start (RFC3339)
    pub start: DateTime<Utc>,
    /// Proposed duration; the configured default applies when absent
    pub duration_minutes: Option<u32>,
}

/// Availability check response
#[derive(Debug, Serialize)]
pub struct AvailabilityCheckResponse {
    pub trainer_id: String,
    pub start: String,
    pub duration_minutes: u32,
    pub available: bool,
}

/// Query for free slots over one date or a range
#[derive(Debug, Deserialize)]
pub struct FreeSlotsQuery {
    /// Single local date
    pub date: Option<NaiveDate>,
    /// Range start (used with `end_date`)
    pub start_date: Option<NaiveDate>,
    /// Inclusive range end
    pub end_date: Option<NaiveDate>,
}

/// Free slots for one date
#[derive(Debug, Serialize)]
pub struct DaySlotsResponse {
    pub date: NaiveDate,
    pub slots: Vec<String>,
}

/// Availability routes handler
pub struct AvailabilityRoutes;

impl AvailabilityRoutes {
    /// Create all availability routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/trainers", post(Self::handle_register))
            .route("/api/trainers/:id", get(Self::handle_get))
            .route(
                "/api/trainers/:id/availability",
                put(Self::handle_update_availability),
            )
            .route(
                "/api/trainers/:id/availability/check",
                get(Self::handle_check),
            )
            .route("/api/trainers/:id/slots", get(Self::handle_free_slots))
            .with_state(resources)
    }

    /// Handle POST /api/trainers - Register a trainer
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<RegisterTrainerBody>,
    ) -> Result<Response, AppError> {
        let trainer = resources
            .availability
            .register_trainer(&body.name, &body.availability)
            .await?;
        Ok((StatusCode::CREATED, Json(TrainerResponse::from(trainer))).into_response())
    }

    /// Handle GET /api/trainers/:id - Get a trainer profile
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(trainer_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let trainer = resources.availability.get_trainer(trainer_id).await?;
        Ok(Json(TrainerResponse::from(trainer)).into_response())
    }

    /// Handle PUT /api/trainers/:id/availability - Replace the pattern
    async fn handle_update_availability(
        State(resources): State<Arc<ServerResources>>,
        Path(trainer_id): Path<Uuid>,
        Json(body): Json<TrainerAvailability>,
    ) -> Result<Response, AppError> {
        let trainer = resources
            .availability
            .update_availability(trainer_id, &body)
            .await?;
        Ok(Json(TrainerResponse::from(trainer)).into_response())
    }

    /// Handle GET /api/trainers/:id/availability/check - Advisory check
    async fn handle_check(
        State(resources): State<Arc<ServerResources>>,
        Path(trainer_id): Path<Uuid>,
        Query(query): Query<AvailabilityCheckQuery>,
    ) -> Result<Response, AppError> {
        let duration = query
            .duration_minutes
            .unwrap_or(resources.config.scheduling.default_session_duration_minutes);
        let available = resources
            .booking
            .is_trainer_available(trainer_id, query.start, duration)
            .await?;
        Ok(Json(AvailabilityCheckResponse {
            trainer_id: trainer_id.to_string(),
            start: query.start.to_rfc3339(),
            duration_minutes: duration,
            available,
        })
        .into_response())
    }

    /// Handle GET /api/trainers/:id/slots - Free slots for a date or range
    async fn handle_free_slots(
        State(resources): State<Arc<ServerResources>>,
        Path(trainer_id): Path<Uuid>,
        Query(query): Query<FreeSlotsQuery>,
    ) -> Result<Response, AppError> {
        match (query.date, query.start_date, query.end_date) {
            (Some(date), None, None) => {
                let slots = resources.availability.free_slots(trainer_id, date).await?;
                Ok(Json(DaySlotsResponse {
                    date,
                    slots: slots.iter().map(DateTime::to_rfc3339).collect(),
                })
                .into_response())
            }
            (None, Some(start_date), Some(end_date)) => {
                let by_date = resources
                    .availability
                    .free_slots_range(trainer_id, start_date, end_date)
                    .await?;
                let days: Vec<DaySlotsResponse> = by_date
                    .into_iter()
                    .map(|(date, slots)| DaySlotsResponse {
                        date,
                        slots: slots.iter().map(DateTime::to_rfc3339).collect(),
                    })
                    .collect();
                Ok(Json(days).into_response())
            }
            _ => Err(AppError::validation(
                "Provide either date or start_date with end_date",
            )),
        }
    }
}
