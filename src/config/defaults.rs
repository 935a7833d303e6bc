// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for toast timing.
//!
//! # Categories
//!
//! - **Lifetime**: How long a toast stays before closing on its own
//! - **Animation**: Enter settle and exit durations

// ==========================================================================
// Lifetime Defaults
// ==========================================================================

/// Default time-to-live of a toast (in milliseconds).
/// Zero means the toast never auto-closes.
pub const DEFAULT_DURATION_MS: u64 = 3000;

// ==========================================================================
// Animation Defaults
// ==========================================================================

/// Delay after creation before a toast is marked fully visible (in milliseconds).
pub const DEFAULT_OPEN_SETTLE_MS: u64 = 50;

/// Length of the exit animation between close and removal (in milliseconds).
pub const DEFAULT_CLOSE_DURATION_MS: u64 = 200;

/// Upper bound accepted for the animation durations (in milliseconds).
pub const MAX_ANIMATION_MS: u64 = 10_000;
