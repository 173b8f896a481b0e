// SPDX-License-Identifier: MPL-2.0
//! Timer-driven playback: the state machine, the progress ramp, and the
//! tokio timer that drives auto-advance.

pub mod controller;
pub mod progress;
pub mod scheduler;

pub use controller::{AdvanceToken, Effect, PlaybackController, PlaybackPosition, PlaybackState};
pub use progress::{timeline_fill, ProgressRamp};
pub use scheduler::{AdvanceScheduler, PlaybackEvent};
