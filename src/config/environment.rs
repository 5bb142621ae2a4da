// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables, typed enums, and scheduling engine parameters
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Fitsched Contributors

//! Environment-based configuration management.
//!
//! The operating timezone is an explicit configuration value threaded
//! through the engine's entry points; there is no process-wide mutable
//! timezone default.

use crate::errors::{AppError, AppResult};
use chrono::NaiveTime;
use chrono_tz::Tz;
use std::env;
use tracing::warn;

/// Default IANA operating timezone for wall-clock window interpretation
pub const DEFAULT_TIMEZONE: &str = "Europe/London";

/// Default bookable sub-slot granularity in minutes
pub const DEFAULT_SLOT_GRANULARITY_MINUTES: u32 = 30;

/// Default duration for auto-placed plan sessions in minutes
pub const DEFAULT_SESSION_DURATION_MINUTES: u32 = 60;

/// Strongly typed log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to `tracing::Level`
    #[must_use]
    pub const fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Error => tracing::Level::ERROR,
            Self::Warn => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
            Self::Trace => tracing::Level::TRACE,
        }
    }

    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Environment type for logging format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }
}

/// Scheduling engine parameters threaded through every entry point
#[derive(Debug, Clone, Copy)]
pub struct SchedulingConfig {
    /// Fixed operating timezone for wall-clock window interpretation
    pub timezone: Tz,
    /// Bookable sub-slot granularity in minutes
    pub slot_granularity_minutes: u32,
    /// Duration given to auto-placed plan sessions in minutes
    pub default_session_duration_minutes: u32,
    /// Local wall-clock time of the daily lifecycle sweep
    pub sweep_time: NaiveTime,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            // Operating zone the original deployment runs in
            timezone: chrono_tz::Europe::London,
            slot_granularity_minutes: DEFAULT_SLOT_GRANULARITY_MINUTES,
            default_session_duration_minutes: DEFAULT_SESSION_DURATION_MINUTES,
            // One minute past local midnight, after the day's cutoff moves
            sweep_time: NaiveTime::from_hms_opt(0, 1, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// Database connection URL
    pub database_url: String,
    /// Log level
    pub log_level: LogLevel,
    /// Deployment environment
    pub environment: Environment,
    /// Scheduling engine parameters
    pub scheduling: SchedulingConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but unparseable
    /// (port, timezone, granularity, sweep time).
    pub fn from_env() -> AppResult<Self> {
        let http_port = parse_env("HTTP_PORT", 8081_u16)?;
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:./data/fitsched.db".into());

        let log_level = LogLevel::from_str_or_default(
            &env::var("RUST_LOG").unwrap_or_default(),
        );
        let environment = Environment::from_str_or_default(
            &env::var("ENVIRONMENT").unwrap_or_default(),
        );

        let timezone = match env::var("SCHEDULER_TIMEZONE") {
            Ok(name) => name
                .parse::<Tz>()
                .map_err(|e| AppError::config(format!("invalid SCHEDULER_TIMEZONE '{name}': {e}")))?,
            Err(_) => DEFAULT_TIMEZONE
                .parse::<Tz>()
                .map_err(|e| AppError::config(format!("invalid default timezone: {e}")))?,
        };

        let slot_granularity_minutes =
            parse_env("SLOT_GRANULARITY_MINUTES", DEFAULT_SLOT_GRANULARITY_MINUTES)?;
        if slot_granularity_minutes == 0 {
            return Err(AppError::config("SLOT_GRANULARITY_MINUTES must be positive"));
        }
        let default_session_duration_minutes = parse_env(
            "DEFAULT_SESSION_DURATION_MINUTES",
            DEFAULT_SESSION_DURATION_MINUTES,
        )?;

        let sweep_time = match env::var("SWEEP_TIME") {
            Ok(raw) => NaiveTime::parse_from_str(&raw, "%H:%M")
                .map_err(|e| AppError::config(format!("invalid SWEEP_TIME '{raw}': {e}")))?,
            Err(_) => SchedulingConfig::default().sweep_time,
        };

        Ok(Self {
            http_port,
            database_url,
            log_level,
            environment,
            scheduling: SchedulingConfig {
                timezone,
                slot_granularity_minutes,
                default_session_duration_minutes,
                sweep_time,
            },
        })
    }
}

/// Parse an environment variable, falling back to a default when unset
fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> AppResult<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.parse::<T>().map_err(|e| {
            warn!("Failed to parse {name}='{raw}': {e}");
            AppError::config(format!("invalid {name}: {e}"))
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str_or_default("DEBUG"), LogLevel::Debug);
        assert_eq!(LogLevel::from_str_or_default("bogus"), LogLevel::Info);
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            Environment::from_str_or_default("production"),
            Environment::Production
        );
        assert_eq!(
            Environment::from_str_or_default(""),
            Environment::Development
        );
    }

    #[test]
    fn test_default_scheduling_config() {
        let config = SchedulingConfig::default();
        assert_eq!(config.timezone, chrono_tz::Europe::London);
        assert_eq!(config.slot_granularity_minutes, 30);
        assert_eq!(config.default_session_duration_minutes, 60);
    }
}
