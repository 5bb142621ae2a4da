// ABOUTME: Route handlers for the session booking and lifecycle REST API
// ABOUTME: Direct booking, member requests, trainer responses, completion, cancellation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Fitsched Contributors

//! Training session routes

use crate::errors::AppError;
use crate::models::{SessionStatus, SessionType, TrainingSession};
use crate::routes::ServerResources;
use crate::services::booking::SessionProgress;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Request for a trainer booking a session directly
#[derive(Debug, Deserialize)]
pub struct CreateSessionBody {
    pub trainer_id: Uuid,
    pub member_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: Option<u32>,
    pub session_type: Option<SessionType>,
    pub note: Option<String>,
}

/// Request for a member proposing a session time
#[derive(Debug, Deserialize)]
pub struct RequestSessionBody {
    pub member_id: Uuid,
    pub trainer_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: Option<u32>,
    pub note: Option<String>,
}

/// Request for a member claiming a pending placeholder
#[derive(Debug, Deserialize)]
pub struct ClaimSessionBody {
    pub member_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: Option<u32>,
}

/// Trainer's response to a requested session
#[derive(Debug, Deserialize)]
pub struct RespondBody {
    pub trainer_id: Uuid,
    pub accept: bool,
}

/// Request to move a session
#[derive(Debug, Deserialize)]
pub struct RescheduleBody {
    pub actor_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: Option<u32>,
}

/// Request to record a finished session
#[derive(Debug, Deserialize)]
pub struct CompleteBody {
    pub trainer_id: Uuid,
    pub actual_minutes_spent: u32,
    pub note: Option<String>,
}

/// Request to cancel a session
#[derive(Debug, Deserialize)]
pub struct CancelBody {
    pub actor_id: Uuid,
}

/// Request for a trainer removing a session outright
#[derive(Debug, Deserialize)]
pub struct DeleteSessionBody {
    pub trainer_id: Uuid,
}

/// Status filter for session listings
#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: Option<SessionStatus>,
}

/// Reporting window for member progress
#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    pub since: DateTime<Utc>,
    pub until: Option<DateTime<Utc>>,
}

/// Session response
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub member_id: String,
    pub trainer_id: String,
    pub workout_plan_id: Option<String>,
    pub week_number: Option<u32>,
    pub status: SessionStatus,
    pub scheduled_at: String,
    pub scheduled_end: String,
    pub duration_minutes: u32,
    pub actual_minutes_spent: u32,
    pub session_type: SessionType,
    pub note: Option<String>,
    pub attended: bool,
    pub needs_manual_scheduling: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<TrainingSession> for SessionResponse {
    fn from(session: TrainingSession) -> Self {
        Self {
            id: session.id.to_string(),
            member_id: session.member_id.to_string(),
            trainer_id: session.trainer_id.to_string(),
            workout_plan_id: session.workout_plan_id.map(|id| id.to_string()),
            week_number: session.week_number,
            status: session.status,
            scheduled_at: session.scheduled_at.to_rfc3339(),
            scheduled_end: session.end_at().to_rfc3339(),
            duration_minutes: session.duration_minutes,
            actual_minutes_spent: session.actual_minutes_spent,
            session_type: session.session_type,
            note: session.note,
            attended: session.attended,
            needs_manual_scheduling: session.needs_manual_scheduling,
            created_at: session.created_at.to_rfc3339(),
            updated_at: session.updated_at.to_rfc3339(),
        }
    }
}

/// Session list response
#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionResponse>,
    pub total: usize,
}

impl SessionListResponse {
    fn from_sessions(sessions: Vec<TrainingSession>) -> Self {
        let sessions: Vec<SessionResponse> = sessions.into_iter().map(Into::into).collect();
        Self {
            total: sessions.len(),
            sessions,
        }
    }
}

/// Sweep trigger response
#[derive(Debug, Serialize)]
pub struct SweepResponse {
    pub completed: u64,
    pub cancelled: u64,
}

/// Session routes handler
pub struct SessionRoutes;

impl SessionRoutes {
    /// Create all session routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/sessions", post(Self::handle_create))
            .route("/api/sessions/sweep", post(Self::handle_sweep))
            .route("/api/sessions/requests", post(Self::handle_request))
            .route(
                "/api/sessions/:id",
                get(Self::handle_get).delete(Self::handle_delete),
            )
            .route("/api/sessions/:id/claim", post(Self::handle_claim))
            .route("/api/sessions/:id/respond", post(Self::handle_respond))
            .route("/api/sessions/:id/reschedule", post(Self::handle_reschedule))
            .route("/api/sessions/:id/complete", post(Self::handle_complete))
            .route("/api/sessions/:id/cancel", post(Self::handle_cancel))
            .route(
                "/api/trainers/:id/sessions",
                get(Self::handle_trainer_sessions),
            )
            .route(
                "/api/trainers/:id/requests",
                get(Self::handle_pending_requests),
            )
            .route(
                "/api/members/:id/sessions",
                get(Self::handle_member_sessions),
            )
            .route("/api/members/:id/progress", get(Self::handle_progress))
            .with_state(resources)
    }

    /// Handle POST /api/sessions/sweep - Trigger the lifecycle sweep now
    ///
    /// Idempotent; safe to call alongside the internal daily timer.
    async fn handle_sweep(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let outcome = crate::reconciler::run_sweep(
            &resources.database,
            &resources.config.scheduling,
            Utc::now(),
        )
        .await?;
        Ok(Json(SweepResponse {
            completed: outcome.completed,
            cancelled: outcome.cancelled,
        })
        .into_response())
    }

    /// Handle POST /api/sessions - Trainer books a session directly
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<CreateSessionBody>,
    ) -> Result<Response, AppError> {
        let session = resources
            .booking
            .create_session(
                body.trainer_id,
                body.member_id,
                body.scheduled_at,
                body.duration_minutes,
                body.session_type,
                body.note,
            )
            .await?;
        Ok((StatusCode::CREATED, Json(SessionResponse::from(session))).into_response())
    }

    /// Handle POST /api/sessions/requests - Member proposes a time
    async fn handle_request(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<RequestSessionBody>,
    ) -> Result<Response, AppError> {
        let session = resources
            .booking
            .request_session(
                body.member_id,
                body.trainer_id,
                body.scheduled_at,
                body.duration_minutes,
                body.note,
            )
            .await?;
        Ok((StatusCode::CREATED, Json(SessionResponse::from(session))).into_response())
    }

    /// Handle GET /api/sessions/:id - Get one session
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(session_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let session = resources.booking.get_session(session_id).await?;
        Ok(Json(SessionResponse::from(session)).into_response())
    }

    /// Handle POST /api/sessions/:id/claim - Member claims a pending slot
    async fn handle_claim(
        State(resources): State<Arc<ServerResources>>,
        Path(session_id): Path<Uuid>,
        Json(body): Json<ClaimSessionBody>,
    ) -> Result<Response, AppError> {
        let session = resources
            .booking
            .claim_pending_session(
                body.member_id,
                session_id,
                body.scheduled_at,
                body.duration_minutes,
            )
            .await?;
        Ok(Json(SessionResponse::from(session)).into_response())
    }

    /// Handle POST /api/sessions/:id/respond - Trainer accepts or rejects
    async fn handle_respond(
        State(resources): State<Arc<ServerResources>>,
        Path(session_id): Path<Uuid>,
        Json(body): Json<RespondBody>,
    ) -> Result<Response, AppError> {
        let session = resources
            .booking
            .respond_to_request(body.trainer_id, session_id, body.accept)
            .await?;
        Ok(Json(SessionResponse::from(session)).into_response())
    }

    /// Handle POST /api/sessions/:id/reschedule - Move a session
    async fn handle_reschedule(
        State(resources): State<Arc<ServerResources>>,
        Path(session_id): Path<Uuid>,
        Json(body): Json<RescheduleBody>,
    ) -> Result<Response, AppError> {
        let session = resources
            .booking
            .reschedule_session(
                body.actor_id,
                session_id,
                body.scheduled_at,
                body.duration_minutes,
            )
            .await?;
        Ok(Json(SessionResponse::from(session)).into_response())
    }

    /// Handle POST /api/sessions/:id/complete - Record a finished session
    async fn handle_complete(
        State(resources): State<Arc<ServerResources>>,
        Path(session_id): Path<Uuid>,
        Json(body): Json<CompleteBody>,
    ) -> Result<Response, AppError> {
        let session = resources
            .booking
            .complete_session(
                body.trainer_id,
                session_id,
                body.actual_minutes_spent,
                body.note,
            )
            .await?;
        Ok(Json(SessionResponse::from(session)).into_response())
    }

    /// Handle POST /api/sessions/:id/cancel - Cancel a session
    async fn handle_cancel(
        State(resources): State<Arc<ServerResources>>,
        Path(session_id): Path<Uuid>,
        Json(body): Json<CancelBody>,
    ) -> Result<Response, AppError> {
        let session = resources
            .booking
            .cancel_session(body.actor_id, session_id)
            .await?;
        Ok(Json(SessionResponse::from(session)).into_response())
    }

    /// Handle DELETE /api/sessions/:id - Trainer removes a session outright
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        Path(session_id): Path<Uuid>,
        Json(body): Json<DeleteSessionBody>,
    ) -> Result<Response, AppError> {
        resources
            .booking
            .delete_session(body.trainer_id, session_id)
            .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle GET /api/trainers/:id/sessions - Trainer's sessions
    async fn handle_trainer_sessions(
        State(resources): State<Arc<ServerResources>>,
        Path(trainer_id): Path<Uuid>,
        Query(query): Query<StatusQuery>,
    ) -> Result<Response, AppError> {
        let sessions = resources
            .booking
            .trainer_sessions(trainer_id, query.status)
            .await?;
        Ok(Json(SessionListResponse::from_sessions(sessions)).into_response())
    }

    /// Handle GET /api/trainers/:id/requests - Open requests for a trainer
    async fn handle_pending_requests(
        State(resources): State<Arc<ServerResources>>,
        Path(trainer_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let sessions = resources.booking.pending_requests(trainer_id).await?;
        Ok(Json(SessionListResponse::from_sessions(sessions)).into_response())
    }

    /// Handle GET /api/members/:id/sessions - Member's sessions
    async fn handle_member_sessions(
        State(resources): State<Arc<ServerResources>>,
        Path(member_id): Path<Uuid>,
        Query(query): Query<StatusQuery>,
    ) -> Result<Response, AppError> {
        let sessions = resources
            .booking
            .member_sessions(member_id, query.status)
            .await?;
        Ok(Json(SessionListResponse::from_sessions(sessions)).into_response())
    }

    /// Handle GET /api/members/:id/progress - Completed totals over a window
    async fn handle_progress(
        State(resources): State<Arc<ServerResources>>,
        Path(member_id): Path<Uuid>,
        Query(query): Query<ProgressQuery>,
    ) -> Result<Response, AppError> {
        let progress: SessionProgress = resources
            .booking
            .session_progress(member_id, query.since, query.until.unwrap_or_else(Utc::now))
            .await?;
        Ok(Json(progress).into_response())
    }
}
