// ABOUTME: HTTP route registration and the shared server resource bundle
// ABOUTME: Each area contributes a Router over Arc<ServerResources>; this module merges them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Fitsched Contributors

//! HTTP routes.
//!
//! Routes stay thin: parse the request, call one service method, shape the
//! response. Caller identity arrives as explicit actor ids in the payloads;
//! platform authentication sits in front of this service.

pub mod availability;
pub mod health;
pub mod plans;
pub mod sessions;

use crate::config::ServerConfig;
use crate::database::Database;
use crate::notifications::{LogNotifier, Notifier};
use crate::services::{AvailabilityService, BookingService, PlanService};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared resources for all route handlers
pub struct ServerResources {
    /// Database handle
    pub database: Database,
    /// Server configuration
    pub config: ServerConfig,
    /// Booking workflows
    pub booking: BookingService,
    /// Availability and free slots
    pub availability: AvailabilityService,
    /// Workout plans
    pub plans: PlanService,
}

impl ServerResources {
    /// Assemble the resource bundle with the default log notifier
    #[must_use]
    pub fn new(database: Database, config: ServerConfig) -> Self {
        Self::with_notifier(database, config, Arc::new(LogNotifier))
    }

    /// Assemble the resource bundle with a custom notification channel
    #[must_use]
    pub fn with_notifier(
        database: Database,
        config: ServerConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let scheduling = config.scheduling.clone();
        Self {
            booking: BookingService::new(database.clone(), scheduling.clone(), notifier.clone()),
            availability: AvailabilityService::new(database.clone(), scheduling.clone()),
            plans: PlanService::new(database.clone(), scheduling, notifier),
            database,
            config,
        }
    }
}

/// Build the full application router
#[must_use]
pub fn router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .merge(health::HealthRoutes::routes())
        .merge(availability::AvailabilityRoutes::routes(resources.clone()))
        .merge(sessions::SessionRoutes::routes(resources.clone()))
        .merge(plans::PlanRoutes::routes(resources))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
