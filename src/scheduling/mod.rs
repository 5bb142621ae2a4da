// ABOUTME: Pure scheduling engine core: intervals, availability, conflicts, slots, planning
// ABOUTME: No persistence or I/O; services thread storage state through these functions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Fitsched Contributors

//! The scheduling engine core.
//!
//! Everything in this module is a pure function over domain values; the
//! service layer owns loading state and committing results. The operating
//! timezone is always passed in explicitly.

/// Timezone-normalized interval construction and overlap testing
pub mod intervals;

/// Override-first availability window resolution
pub mod availability;

/// Booking admissibility predicates
pub mod conflicts;

/// Free-slot enumeration over a date or date range
pub mod slots;

/// Multi-week plan session placement
pub mod planner;
