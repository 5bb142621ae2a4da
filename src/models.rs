// ABOUTME: Domain data shapes for trainers, availability, sessions, and workout plans
// ABOUTME: Serde-friendly types shared by the engine, persistence layer, and routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Fitsched Contributors

//! Domain models for the scheduling engine.
//!
//! Availability is a tagged-union-like lookup: date overrides fully replace
//! the recurring weekly pattern for their date, never merging with it. The
//! two sources are kept as separate mappings with override-first resolution
//! (see [`crate::scheduling::availability`]).

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Day of week used as the key of the recurring availability mapping
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    /// Convert to database/display string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Sunday => "Sunday",
        }
    }

    /// Map a chrono weekday onto the domain enum
    #[must_use]
    pub const fn from_weekday(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => Self::Monday,
            Weekday::Tue => Self::Tuesday,
            Weekday::Wed => Self::Wednesday,
            Weekday::Thu => Self::Thursday,
            Weekday::Fri => Self::Friday,
            Weekday::Sat => Self::Saturday,
            Weekday::Sun => Self::Sunday,
        }
    }
}

/// A wall-clock `{start, end}` interval describing when a trainer is
/// nominally open on a given day. No date component; interpretation happens
/// in the configured operating timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    #[must_use]
    pub const fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }
}

/// A trainer's bookable time: recurring weekly windows plus date-specific
/// overrides. An override entry (even an empty list) makes the weekday's
/// recurring windows invisible for that date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainerAvailability {
    /// Recurring weekly pattern: weekday -> ordered open windows
    #[serde(default)]
    pub recurring: BTreeMap<DayOfWeek, Vec<TimeWindow>>,
    /// Per-date replacements: local calendar date -> ordered open windows
    #[serde(default)]
    pub date_overrides: BTreeMap<NaiveDate, Vec<TimeWindow>>,
}

/// Trainer profile as seen by the scheduling engine. The wider platform
/// profile (specializations, rating, reviews) lives with its own service;
/// only identity and availability matter here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trainer {
    pub id: Uuid,
    pub name: String,
    pub availability: TrainerAvailability,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Training session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Placeholder with no committed time (plan auto-generation)
    #[default]
    Pending,
    /// Member-proposed time awaiting trainer approval
    Requested,
    /// Trainer-committed time; the only status that blocks other bookings
    Scheduled,
    /// Terminal: session took place (or was swept past its date)
    Completed,
    /// Terminal: rejected, withdrawn, or swept stale
    Cancelled,
}

impl SessionStatus {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Requested => "requested",
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "requested" => Self::Requested,
            "scheduled" => Self::Scheduled,
            "completed" => Self::Completed,
            "cancelled" => Self::Cancelled,
            _ => Self::Pending,
        }
    }

    /// Whether no further transitions are possible
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// Session type for trainer planning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SessionType {
    /// Not yet decided by the trainer
    #[default]
    #[serde(rename = "TBD")]
    Tbd,
    Cardio,
    Strength,
    Flexibility,
    Yoga,
    #[serde(rename = "HIIT")]
    Hiit,
    Core,
    Mobility,
    Swimming,
    Endurance,
}

impl SessionType {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tbd => "TBD",
            Self::Cardio => "Cardio",
            Self::Strength => "Strength",
            Self::Flexibility => "Flexibility",
            Self::Yoga => "Yoga",
            Self::Hiit => "HIIT",
            Self::Core => "Core",
            Self::Mobility => "Mobility",
            Self::Swimming => "Swimming",
            Self::Endurance => "Endurance",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "Cardio" => Self::Cardio,
            "Strength" => Self::Strength,
            "Flexibility" => Self::Flexibility,
            "Yoga" => Self::Yoga,
            "HIIT" => Self::Hiit,
            "Core" => Self::Core,
            "Mobility" => Self::Mobility,
            "Swimming" => Self::Swimming,
            "Endurance" => Self::Endurance,
            _ => Self::Tbd,
        }
    }
}

/// A training session between a member and a trainer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSession {
    pub id: Uuid,
    pub member_id: Uuid,
    pub trainer_id: Uuid,
    /// Plan this session belongs to; `week_number` is required alongside
    pub workout_plan_id: Option<Uuid>,
    /// 1-based plan week the session belongs to
    pub week_number: Option<u32>,
    pub status: SessionStatus,
    /// Absolute instant; converted to the operating zone for window checks
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: u32,
    /// Filled on completion; the sweep approximates it with the planned duration
    pub actual_minutes_spent: u32,
    pub session_type: SessionType,
    pub note: Option<String>,
    pub attended: bool,
    /// Set on fallback placements that ignored declared availability and
    /// need trainer follow-up before they can become `scheduled`
    pub needs_manual_scheduling: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TrainingSession {
    /// End instant of the session interval
    #[must_use]
    pub fn end_at(&self) -> DateTime<Utc> {
        self.scheduled_at + Duration::minutes(i64::from(self.duration_minutes))
    }
}

/// Insertable session record, produced by the services and the planner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDraft {
    pub member_id: Uuid,
    pub trainer_id: Uuid,
    pub workout_plan_id: Option<Uuid>,
    pub week_number: Option<u32>,
    pub status: SessionStatus,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: u32,
    pub session_type: SessionType,
    pub note: Option<String>,
    pub needs_manual_scheduling: bool,
}

/// Workout plan lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    #[default]
    Active,
    Completed,
    Cancelled,
}

impl PlanStatus {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "completed" => Self::Completed,
            "cancelled" => Self::Cancelled,
            _ => Self::Active,
        }
    }
}

/// Declared session count for one plan week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySessionTarget {
    /// 1-based week index from the plan's start date
    pub week_number: u32,
    pub session_count: u32,
}

/// A structured multi-week training plan owning its generated sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutPlan {
    pub id: Uuid,
    /// Human-readable sequential reference, e.g. `WKP-007`
    pub ref_id: String,
    pub trainer_id: Uuid,
    pub member_id: Uuid,
    pub goal: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub weekly_sessions: Vec<WeeklySessionTarget>,
    pub status: PlanStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_status_round_trip() {
        for status in [
            SessionStatus::Pending,
            SessionStatus::Requested,
            SessionStatus::Scheduled,
            SessionStatus::Completed,
            SessionStatus::Cancelled,
        ] {
            assert_eq!(SessionStatus::parse(status.as_str()), status);
        }
        assert_eq!(SessionStatus::parse("garbage"), SessionStatus::Pending);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(SessionStatus::Completed.is_terminal());
        assert!(SessionStatus::Cancelled.is_terminal());
        assert!(!SessionStatus::Scheduled.is_terminal());
        assert!(!SessionStatus::Requested.is_terminal());
        assert!(!SessionStatus::Pending.is_terminal());
    }

    #[test]
    fn test_day_of_week_from_weekday() {
        assert_eq!(DayOfWeek::from_weekday(Weekday::Mon), DayOfWeek::Monday);
        assert_eq!(DayOfWeek::from_weekday(Weekday::Sun), DayOfWeek::Sunday);
    }
}
