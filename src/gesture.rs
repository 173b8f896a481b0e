// SPDX-License-Identifier: MPL-2.0
//! Vertical drag classification and resolution for the playback sheet.
//!
//! The sheet rests at one of two offsets, Expanded (0) and Collapsed
//! (`range`). A gesture stays a candidate tap until it travels far enough
//! and vertically enough to be classified as a drag; only then does the
//! coordinator start consuming it. Classification emits
//! [`Effect::DragStarted`] exactly once, and a non-dismissing release emits
//! exactly one [`Effect::Snap`], so the orchestrator can map them 1:1 onto
//! `pause()` and `resume()`.

use crate::config::defaults::{
    DISMISS_MIN_TRAVEL_PX, DISMISS_MIN_VELOCITY_PX_PER_MS, VERTICAL_DRAG_AXIS_RATIO,
    VERTICAL_DRAG_MIN_DY_PX,
};
use std::time::Duration;

/// One of the two stable sheet heights a drag snaps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestPosition {
    /// Sheet fully up (offset 0).
    Expanded,
    /// Sheet pulled down to its lower rest offset (`range`).
    Collapsed,
}

/// Which half of the screen an unconsumed tap landed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapZone {
    /// Left half: step to the previous item.
    Left,
    /// Right half: advance to the next item.
    Right,
}

/// Pointer messages fed by the host's gesture source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Message {
    /// Finger down.
    Began { x: f32, y: f32 },
    /// Finger moved.
    Moved { x: f32, y: f32 },
    /// Finger up. `velocity_y` is in px/ms, positive downward.
    Ended { velocity_y: f32 },
    /// The host canceled the gesture (e.g. an incoming call sheet).
    Canceled,
}

/// Effects produced by gesture resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// No effect.
    None,
    /// The gesture was just classified as a vertical drag. The orchestrator
    /// must pause playback — emitted exactly once per drag.
    DragStarted,
    /// Live drag: apply this sheet offset.
    SheetOffset(f32),
    /// Non-dismissing release: animate to this rest position and resume —
    /// emitted exactly once per drag.
    Snap(RestPosition),
    /// Dismissing release: animate the sheet off-screen and close.
    Dismiss,
    /// The gesture was a tap; forward it to the tap-zone handler.
    Tap(TapZone),
}

/// Classifies and resolves vertical drags on the playback sheet.
#[derive(Debug, Clone)]
pub struct GestureCoordinator {
    /// Distance between the two rest offsets (maxHeight − minHeight).
    range: f32,
    /// Screen width, for tap-zone resolution.
    screen_width: f32,
    /// Offset of the current rest position (0 or `range`).
    rest_offset: f32,
    /// Touch-down point of the in-flight gesture.
    start: Option<(f32, f32)>,
    /// Raw vertical travel since touch-down, unclamped.
    travel: f32,
    /// Live sheet offset, clamped to `[0, range]`.
    offset: f32,
    /// Whether the in-flight gesture has been classified as a vertical drag.
    classified: bool,
}

impl GestureCoordinator {
    #[must_use]
    pub fn new(range: f32, screen_width: f32) -> Self {
        Self {
            range: range.max(0.0),
            screen_width,
            rest_offset: 0.0,
            start: None,
            travel: 0.0,
            offset: 0.0,
            classified: false,
        }
    }

    /// Handle a pointer message.
    pub fn handle(&mut self, msg: Message) -> Effect {
        match msg {
            Message::Began { x, y } => {
                self.start = Some((x, y));
                self.travel = 0.0;
                self.classified = false;
                Effect::None
            }
            Message::Moved { x, y } => {
                let Some((start_x, start_y)) = self.start else {
                    return Effect::None;
                };
                let dx = x - start_x;
                let dy = y - start_y;
                self.travel = dy;

                if !self.classified {
                    // Defer classification so a tap aimed at next/prev is
                    // never stolen by a wobbly finger.
                    if dy.abs() > VERTICAL_DRAG_MIN_DY_PX
                        && dy.abs() > VERTICAL_DRAG_AXIS_RATIO * dx.abs()
                    {
                        self.classified = true;
                        self.offset = self.clamp_offset(self.rest_offset + dy);
                        return Effect::DragStarted;
                    }
                    return Effect::None;
                }

                self.offset = self.clamp_offset(self.rest_offset + dy);
                Effect::SheetOffset(self.offset)
            }
            Message::Ended { velocity_y } => {
                let Some((start_x, _)) = self.start.take() else {
                    return Effect::None;
                };
                if !self.classified {
                    // A tap, not a drag: forward to the tap-zone handler.
                    return if start_x < self.screen_width / 2.0 {
                        Effect::Tap(TapZone::Left)
                    } else {
                        Effect::Tap(TapZone::Right)
                    };
                }

                self.classified = false;
                if self.travel > DISMISS_MIN_TRAVEL_PX
                    && velocity_y > DISMISS_MIN_VELOCITY_PX_PER_MS
                {
                    return Effect::Dismiss;
                }
                Effect::Snap(self.snap_home())
            }
            Message::Canceled => {
                let was_drag = self.classified;
                self.start = None;
                self.classified = false;
                if was_drag {
                    // Treated like a non-dismissing release.
                    Effect::Snap(self.snap_home())
                } else {
                    Effect::None
                }
            }
        }
    }

    /// Whether a classified drag is in flight.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.classified
    }

    /// Current sheet offset.
    #[must_use]
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// The rest position the sheet currently belongs to.
    #[must_use]
    pub fn rest_position(&self) -> RestPosition {
        if self.rest_offset <= self.range / 2.0 {
            RestPosition::Expanded
        } else {
            RestPosition::Collapsed
        }
    }

    /// The offset a rest position corresponds to.
    #[must_use]
    pub fn offset_for(&self, rest: RestPosition) -> f32 {
        match rest {
            RestPosition::Expanded => 0.0,
            RestPosition::Collapsed => self.range,
        }
    }

    /// Resolves the nearer rest position by the midpoint rule and settles
    /// the coordinator on it.
    fn snap_home(&mut self) -> RestPosition {
        let target = if self.offset <= self.range / 2.0 {
            RestPosition::Expanded
        } else {
            RestPosition::Collapsed
        };
        self.rest_offset = self.offset_for(target);
        self.offset = self.rest_offset;
        target
    }

    fn clamp_offset(&self, offset: f32) -> f32 {
        offset.clamp(0.0, self.range)
    }
}

/// Minimal animatable scalar the sheet offset is rendered through, so the
/// engine can be unit-tested without a live UI tree. Hosts wrap their
/// animation runtime's value in this.
pub trait AnimatedScalar {
    /// Jump to a value immediately (live drag tracking).
    fn set(&mut self, value: f32);
    /// Animate toward a target over a duration (snap/dismiss).
    fn animate_to(&mut self, target: f32, duration: Duration);
    /// Stop any in-flight animation at the current value.
    fn stop(&mut self);
    /// Current value.
    fn value(&self) -> f32;
}

/// Headless [`AnimatedScalar`]: `animate_to` lands on the target
/// immediately. Useful for tests and non-animated hosts.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantScalar {
    value: f32,
}

impl AnimatedScalar for InstantScalar {
    fn set(&mut self, value: f32) {
        self.value = value;
    }

    fn animate_to(&mut self, target: f32, _duration: Duration) {
        self.value = target;
    }

    fn stop(&mut self) {}

    fn value(&self) -> f32 {
        self.value
    }
}
