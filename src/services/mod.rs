// ABOUTME: Service layer sitting between HTTP routes and the database managers
// ABOUTME: Owns the business rules; routes stay thin and storage stays dumb
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Fitsched Contributors

//! Scheduling services.
//!
//! Each service borrows the shared [`Database`](crate::database::Database)
//! handle and a [`SchedulingConfig`](crate::config::SchedulingConfig); all
//! advisory checks run in memory against the pure `scheduling` functions,
//! and every commit that must survive a race goes through a guarded
//! database write.

pub mod availability;
pub mod booking;
pub mod plans;

pub use availability::AvailabilityService;
pub use booking::BookingService;
pub use plans::PlanService;
