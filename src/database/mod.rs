// ABOUTME: Database management for trainers, training sessions, and workout plans
// ABOUTME: Owns the SQLite pool, schema migrations, and per-area manager accessors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Fitsched Contributors

//! # Database Management
//!
//! SQLite-backed persistence for the scheduling engine. Session instants
//! are stored as normalized RFC3339 UTC text (`scheduled_at` plus a derived
//! `scheduled_end`) so overlap predicates can compare lexicographically
//! inside SQL; the conditional-write booking guard depends on this.

/// Workout plan storage with atomic plan+sessions creation
pub mod plans;

/// Training session storage, conditional booking commits, sweep updates
pub mod sessions;

/// Trainer profile and availability storage
pub mod trainers;

use anyhow::Result;
use sqlx::{Pool, Sqlite, SqlitePool};

pub use plans::PlansManager;
pub use sessions::SessionsManager;
pub use trainers::TrainersManager;

/// Database manager for scheduling storage
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or a migration fails
    pub async fn new(database_url: &str) -> Result<Self> {
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if database_url.starts_with("sqlite:") {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_string()
        };

        let pool = SqlitePool::connect(&connection_options).await?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Trainer storage operations
    #[must_use]
    pub fn trainers(&self) -> TrainersManager {
        TrainersManager::new(self.pool.clone())
    }

    /// Session storage operations
    #[must_use]
    pub fn sessions(&self) -> SessionsManager {
        SessionsManager::new(self.pool.clone())
    }

    /// Plan storage operations
    #[must_use]
    pub fn plans(&self) -> PlansManager {
        PlansManager::new(self.pool.clone())
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        self.migrate_trainers().await?;
        self.migrate_sessions().await?;
        self.migrate_plans().await?;
        Ok(())
    }

    async fn migrate_trainers(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS trainers (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                recurring_windows TEXT NOT NULL DEFAULT '{}',
                date_overrides TEXT NOT NULL DEFAULT '{}',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn migrate_sessions(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS training_sessions (
                id TEXT PRIMARY KEY,
                member_id TEXT NOT NULL,
                trainer_id TEXT NOT NULL,
                workout_plan_id TEXT,
                week_number INTEGER,
                status TEXT NOT NULL DEFAULT 'pending',
                scheduled_at TEXT NOT NULL,
                scheduled_end TEXT NOT NULL,
                duration_minutes INTEGER NOT NULL,
                actual_minutes_spent INTEGER NOT NULL DEFAULT 0,
                session_type TEXT NOT NULL DEFAULT 'TBD',
                note TEXT,
                attended INTEGER NOT NULL DEFAULT 0,
                needs_manual_scheduling INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_sessions_trainer_status
             ON training_sessions(trainer_id, status)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_sessions_member
             ON training_sessions(member_id)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_sessions_plan_week
             ON training_sessions(workout_plan_id, week_number)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_sessions_status_date
             ON training_sessions(status, scheduled_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn migrate_plans(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS workout_plans (
                id TEXT PRIMARY KEY,
                ref_id TEXT NOT NULL UNIQUE,
                trainer_id TEXT NOT NULL,
                member_id TEXT NOT NULL,
                goal TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                weekly_sessions TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'active',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_plans_member_status
             ON workout_plans(member_id, status)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
