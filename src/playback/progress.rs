// SPDX-License-Identifier: MPL-2.0
//! Linear progress ramp for the visual timeline bar.
//!
//! A ramp belongs to exactly one item: the controller restarts it on every
//! item change, so a ramp can never report progress for a position that has
//! moved on. Sampling takes an explicit `Instant` so the ramp can be driven
//! headlessly in tests without sleeping.

use std::time::{Duration, Instant};

/// Per-item progress value advancing linearly from 0 to 1 over the item's
/// display duration.
///
/// While running, the value is derived from the anchor instant; while frozen
/// (paused, or before the first start) it holds a pinned value. Resuming
/// re-anchors the ramp so the value continues from where it froze rather
/// than jumping backward.
#[derive(Debug, Clone)]
pub struct ProgressRamp {
    /// Display duration of the item this ramp tracks.
    duration: Duration,
    /// Start instant while the ramp is running; `None` while frozen.
    anchor: Option<Instant>,
    /// Pinned value while frozen.
    frozen: f32,
}

impl Default for ProgressRamp {
    fn default() -> Self {
        Self {
            duration: Duration::ZERO,
            anchor: None,
            frozen: 0.0,
        }
    }
}

impl ProgressRamp {
    /// Starts a fresh 0→1 ramp for a new item.
    pub fn restart(&mut self, duration: Duration, now: Instant) {
        self.duration = duration;
        self.anchor = Some(now);
        self.frozen = 0.0;
    }

    /// Freezes the ramp at its current value. Idempotent.
    pub fn freeze(&mut self, now: Instant) {
        if self.anchor.is_some() {
            self.frozen = self.value_at(now);
            self.anchor = None;
        }
    }

    /// Resumes a frozen ramp, continuing from the frozen value.
    pub fn resume(&mut self, now: Instant) {
        if self.anchor.is_none() && !self.duration.is_zero() {
            self.anchor = Some(now - self.duration.mul_f32(self.frozen));
        }
    }

    /// Stops the ramp and resets the value to 0.
    pub fn reset(&mut self) {
        self.anchor = None;
        self.frozen = 0.0;
    }

    /// Samples the progress value in `[0, 1]` at the given instant.
    #[must_use]
    pub fn value_at(&self, now: Instant) -> f32 {
        match self.anchor {
            Some(anchor) => {
                if self.duration.is_zero() {
                    return 1.0;
                }
                let elapsed = now.saturating_duration_since(anchor);
                (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
            }
            None => self.frozen,
        }
    }

    /// Remaining display time at the given instant.
    ///
    /// This is what `resume()` must reschedule so the visible progress
    /// continues smoothly instead of restarting the full duration.
    #[must_use]
    pub fn remaining_at(&self, now: Instant) -> Duration {
        self.duration.mul_f32(1.0 - self.value_at(now))
    }

    /// Whether the ramp is currently advancing.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.anchor.is_some()
    }
}

/// Computes the per-item fill values for a collection's timeline bar.
///
/// Completed items render fully filled, the active item renders the live
/// ramp value, and future items render empty.
#[must_use]
pub fn timeline_fill(item_count: usize, active_index: usize, active_value: f32) -> Vec<f32> {
    (0..item_count)
        .map(|i| {
            if i < active_index {
                1.0
            } else if i == active_index {
                active_value
            } else {
                0.0
            }
        })
        .collect()
}
