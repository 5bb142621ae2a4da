// ABOUTME: Configuration module for environment-driven server and engine settings
// ABOUTME: Re-exports the environment configuration types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Fitsched Contributors

/// Environment-based configuration management
pub mod environment;

pub use environment::{Environment, LogLevel, SchedulingConfig, ServerConfig};
