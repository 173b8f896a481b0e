// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all tunable constants.
//!
//! This module is the single source of truth for default values used across
//! the engine. Constants are organized by category.
//!
//! # Categories
//!
//! - **Timing**: Per-item display duration and sheet animation timings
//! - **Gesture**: Drag classification and dismiss thresholds
//! - **Prefetch**: Media cache limits and look-ahead depth
//! - **Reporting**: View-meta fetch limits

// ==========================================================================
// Timing Defaults
// ==========================================================================

/// Default display duration for a story item (in milliseconds).
pub const DEFAULT_ITEM_DURATION_MS: u64 = 5000;

/// Duration of the snap-back animation after a released drag (in milliseconds).
pub const SHEET_SNAP_DURATION_MS: u64 = 220;

/// Duration of the off-screen animation when a drag dismisses the sheet
/// (in milliseconds).
pub const SHEET_DISMISS_DURATION_MS: u64 = 180;

// ==========================================================================
// Gesture Defaults
// ==========================================================================

/// Minimum vertical travel before a gesture is classified as a vertical drag
/// (in pixels). Below this a gesture stays a candidate tap.
pub const VERTICAL_DRAG_MIN_DY_PX: f32 = 8.0;

/// A gesture is only classified as a vertical drag once |dy| exceeds this
/// multiple of |dx|, so it never steals a tap intended for next/prev.
pub const VERTICAL_DRAG_AXIS_RATIO: f32 = 1.5;

/// Minimum downward travel for a release to dismiss the sheet (in pixels).
pub const DISMISS_MIN_TRAVEL_PX: f32 = 120.0;

/// Minimum downward velocity for a release to dismiss the sheet
/// (in pixels per millisecond).
pub const DISMISS_MIN_VELOCITY_PX_PER_MS: f32 = 0.25;

// ==========================================================================
// Prefetch Defaults
// ==========================================================================

/// Default prefetch cache size in bytes (16 MB).
/// Enough for several full-screen story images.
pub const DEFAULT_PREFETCH_CACHE_BYTES: usize = 16 * 1024 * 1024;

/// Minimum prefetch cache size in bytes (4 MB).
pub const MIN_PREFETCH_CACHE_BYTES: usize = 4 * 1024 * 1024;

/// Maximum prefetch cache size in bytes (64 MB).
pub const MAX_PREFETCH_CACHE_BYTES: usize = 64 * 1024 * 1024;

/// Default maximum number of media items to cache.
pub const DEFAULT_MAX_CACHED_ITEMS: usize = 12;

/// Minimum items to cache.
pub const MIN_MAX_CACHED_ITEMS: usize = 2;

/// Maximum items to cache.
pub const MAX_MAX_CACHED_ITEMS: usize = 32;

/// Default number of upcoming items to prefetch beyond the active one.
pub const DEFAULT_LOOK_AHEAD: usize = 1;

// ==========================================================================
// Reporting Defaults
// ==========================================================================

/// Default number of recent viewers returned by a view-meta fetch.
pub const DEFAULT_VIEW_META_LIMIT: usize = 12;

/// Maximum number of recent viewers a view-meta fetch may request.
pub const MAX_VIEW_META_LIMIT: usize = 100;
