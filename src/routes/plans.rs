// ABOUTME: Route handlers for workout plan creation and retrieval
// ABOUTME: Plan creation commits the plan and its session batch in one transaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Fitsched Contributors

//! Workout plan routes

use crate::errors::AppError;
use crate::models::{PlanStatus, WeeklySessionTarget, WorkoutPlan};
use crate::routes::sessions::SessionResponse;
use crate::routes::ServerResources;
use crate::scheduling::planner::{PlanSpec, PlanWeekSpec};
use crate::services::plans::PlanDetails;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Request to create a workout plan
#[derive(Debug, Deserialize)]
pub struct CreatePlanBody {
    pub trainer_id: Uuid,
    pub member_id: Uuid,
    pub goal: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub weekly_sessions: Vec<PlanWeekSpec>,
}

/// Workout plan response
#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub id: String,
    pub ref_id: String,
    pub trainer_id: String,
    pub member_id: String,
    pub goal: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub weekly_sessions: Vec<WeeklySessionTarget>,
    pub status: PlanStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl From<WorkoutPlan> for PlanResponse {
    fn from(plan: WorkoutPlan) -> Self {
        Self {
            id: plan.id.to_string(),
            ref_id: plan.ref_id,
            trainer_id: plan.trainer_id.to_string(),
            member_id: plan.member_id.to_string(),
            goal: plan.goal,
            start_date: plan.start_date,
            end_date: plan.end_date,
            weekly_sessions: plan.weekly_sessions,
            status: plan.status,
            created_at: plan.created_at.to_rfc3339(),
            updated_at: plan.updated_at.to_rfc3339(),
        }
    }
}

/// Plan with its sessions and progress
#[derive(Debug, Serialize)]
pub struct PlanDetailsResponse {
    pub plan: PlanResponse,
    pub sessions: Vec<SessionResponse>,
    pub completed_sessions: u32,
    pub total_sessions: usize,
}

impl From<PlanDetails> for PlanDetailsResponse {
    fn from(details: PlanDetails) -> Self {
        let sessions: Vec<SessionResponse> =
            details.sessions.into_iter().map(Into::into).collect();
        Self {
            plan: details.plan.into(),
            total_sessions: sessions.len(),
            sessions,
            completed_sessions: details.completed_sessions,
        }
    }
}

/// Plan routes handler
pub struct PlanRoutes;

impl PlanRoutes {
    /// Create all plan routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/plans", post(Self::handle_create))
            .route("/api/plans/:id", get(Self::handle_get))
            .with_state(resources)
    }

    /// Handle POST /api/plans - Create a plan with its session batch
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<CreatePlanBody>,
    ) -> Result<Response, AppError> {
        let spec = PlanSpec {
            goal: body.goal,
            start_date: body.start_date,
            end_date: body.end_date,
            weeks: body.weekly_sessions,
        };
        let details = resources
            .plans
            .create_workout_plan(body.trainer_id, body.member_id, &spec)
            .await?;
        Ok((StatusCode::CREATED, Json(PlanDetailsResponse::from(details))).into_response())
    }

    /// Handle GET /api/plans/:id - Get a plan with sessions and progress
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(plan_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let details = resources.plans.get_workout_plan(plan_id).await?;
        Ok(Json(PlanDetailsResponse::from(details)).into_response())
    }
}
