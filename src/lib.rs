// ABOUTME: Main library entry point for the fitsched scheduling engine
// ABOUTME: Trainer availability, session booking, and workout plan generation for a coaching platform
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Fitsched Contributors

#![deny(unsafe_code)]

//! # Fitsched
//!
//! Trainer availability and session scheduling engine for a fitness
//! coaching platform. This service answers "is this trainer free",
//! computes bookable slots, runs the request/approve booking workflow,
//! and generates full workout plans with auto-placed sessions.
//!
//! ## Core rules
//!
//! - Sessions occupy half-open intervals `[start, start + duration)`;
//!   back-to-back bookings never conflict.
//! - Date-specific availability overrides replace the weekly recurring
//!   pattern for their date entirely; an empty override closes the day.
//! - Only `scheduled` sessions block a trainer's time. Requests are
//!   advisory until the trainer accepts.
//! - Availability windows are wall-clock times in one fixed operating
//!   timezone; all stored instants are UTC.
//!
//! ## Architecture
//!
//! - **scheduling**: pure interval, window, slot, and plan placement logic
//! - **database**: `SQLite` persistence with guarded conditional writes for
//!   race-safe booking commits
//! - **services**: booking, availability, and plan workflows
//! - **routes**: thin axum HTTP handlers
//! - **reconciler**: the daily session lifecycle sweep
//!
//! ## Example
//!
//! ```rust,no_run
//! use fitsched::config::ServerConfig;
//! use fitsched::errors::AppResult;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("scheduling in {} on port {}",
//!              config.scheduling.timezone, config.http_port);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod database;
pub mod errors;
pub mod logging;
pub mod models;
pub mod notifications;
pub mod reconciler;
pub mod routes;
pub mod scheduling;
pub mod services;
