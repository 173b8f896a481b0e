// SPDX-License-Identifier: MPL-2.0
//! Playback state machine for the story viewer.
//!
//! Manages the lifecycle of a playback session with clear state transitions:
//! - Idle: constructed, nothing opened yet
//! - Playing: auto-advance timer armed for the current item
//! - Paused: timer canceled, progress frozen (a drag gesture is active)
//! - Dismissing: drag-to-dismiss in flight, pending work canceled
//! - Closed: session over, completion callback fired
//!
//! The controller is a pure state machine: it never arms a timer itself.
//! Every operation returns an [`Effect`] the orchestrator interprets, and
//! every schedule carries a fresh [`AdvanceToken`]. Scheduling structurally
//! cancels whatever was armed before — a fired timer whose token no longer
//! matches is ignored — so two auto-advances can never race and double-skip
//! an item.

use super::progress::{self, ProgressRamp};
use crate::config::defaults::DEFAULT_ITEM_DURATION_MS;
use crate::error::{Error, Result};
use crate::story::{StoryCollection, StoryItem};
use std::time::{Duration, Instant};

/// Playback session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Constructed but not opened.
    Idle,
    /// Auto-advance timer armed for the current item.
    Playing,
    /// Timer canceled and progress frozen; resumable.
    Paused,
    /// A dismiss gesture is animating the sheet off-screen.
    Dismissing,
    /// Session over. Terminal.
    Closed,
}

impl PlaybackState {
    /// Returns true while the auto-advance timer should be armed.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }

    /// Returns true while a pause (typically a drag) is in effect.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused)
    }

    /// Returns true once the session has ended.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// Identifies one armed auto-advance timer.
///
/// Tokens are issued monotonically; only the most recently issued token is
/// live. A timer that fires with a stale token was canceled after being
/// armed and must be ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AdvanceToken(u64);

/// A pointer into the ordered collections.
///
/// While the session is not Closed: `collection < N` and
/// `item < items(collection).len()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackPosition {
    pub collection: usize,
    pub item: usize,
}

impl PlaybackPosition {
    #[must_use]
    pub fn new(collection: usize, item: usize) -> Self {
        Self { collection, item }
    }
}

/// Effects produced by controller operations, interpreted by the session
/// orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// No effect.
    None,
    /// Disarm any armed timer. The token it carried is already stale.
    Cancel,
    /// Arm the auto-advance timer. Any previous timer is already stale.
    Schedule {
        token: AdvanceToken,
        duration: Duration,
    },
    /// The position moved to a new item; arm its timer.
    Advanced {
        position: PlaybackPosition,
        token: AdvanceToken,
        duration: Duration,
    },
    /// The session closed; the completion callback has fired.
    Closed,
}

/// The central state machine of one playback session.
///
/// Owns the position, the progress ramp, and the timer token. Each session
/// owns an independent controller; sessions never share mutable state.
pub struct PlaybackController {
    collections: Vec<StoryCollection>,
    state: PlaybackState,
    position: PlaybackPosition,
    ramp: ProgressRamp,
    /// Last issued token value. Incremented on every schedule.
    next_token: u64,
    /// The currently live token, if a timer is armed.
    armed: Option<AdvanceToken>,
    /// Fallback display duration for items carrying no usable duration.
    default_duration_ms: u64,
    /// Completion callback. Taken out on first close so it can only fire once.
    on_close: Option<Box<dyn FnOnce() + Send>>,
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("state", &self.state)
            .field("position", &self.position)
            .field("collections", &self.collections.len())
            .field("armed", &self.armed)
            .field("has_on_close", &self.on_close.is_some())
            .finish()
    }
}

impl PlaybackController {
    /// Creates a controller over a read-only, caller-supplied list of
    /// collections. Emptiness is rejected at `open()`, not here, so a host
    /// can construct the controller before its data arrives.
    #[must_use]
    pub fn new(collections: Vec<StoryCollection>) -> Self {
        Self {
            collections,
            state: PlaybackState::Idle,
            position: PlaybackPosition::new(0, 0),
            ramp: ProgressRamp::default(),
            next_token: 0,
            armed: None,
            default_duration_ms: DEFAULT_ITEM_DURATION_MS,
            on_close: None,
        }
    }

    /// Sets the completion callback, invoked exactly once when the session
    /// closes — by natural completion, explicit `close()`, or a dismiss.
    #[must_use]
    pub fn with_on_close(mut self, on_close: impl FnOnce() + Send + 'static) -> Self {
        self.on_close = Some(Box::new(on_close));
        self
    }

    /// Overrides the fallback display duration applied to items carrying no
    /// usable duration. Zero keeps the built-in default.
    #[must_use]
    pub fn with_default_duration_ms(mut self, ms: u64) -> Self {
        if ms > 0 {
            self.default_duration_ms = ms;
        }
        self
    }

    /// Opens the session at `(initial_index, 0)` and starts playback.
    ///
    /// Fails fast with [`Error::InvalidPosition`] if the collections list is
    /// empty, the index is out of range, or the session is not Idle.
    pub fn open(&mut self, initial_index: usize, now: Instant) -> Result<Effect> {
        if self.state != PlaybackState::Idle {
            return Err(Error::InvalidPosition(format!(
                "open() called in state {:?}",
                self.state
            )));
        }
        if self.collections.is_empty() {
            return Err(Error::InvalidPosition(
                "open() called with an empty collection list".to_string(),
            ));
        }
        if initial_index >= self.collections.len() {
            return Err(Error::InvalidPosition(format!(
                "initial index {initial_index} out of range (0..{})",
                self.collections.len()
            )));
        }

        self.state = PlaybackState::Playing;
        self.position = PlaybackPosition::new(initial_index, 0);
        Ok(self.begin_item(now))
    }

    /// A fired auto-advance timer. Behaves as `next()` if the token is still
    /// live; a stale token (canceled after arming) is a no-op.
    pub fn advance_elapsed(&mut self, token: AdvanceToken, now: Instant) -> Effect {
        if self.armed != Some(token) || !self.state.is_playing() {
            return Effect::None;
        }
        self.next(now)
    }

    /// Advances to the next item, the next collection's first item, or —
    /// past the last item of the last collection — closes the session.
    /// Cancels any pending timer before computing the new state.
    pub fn next(&mut self, now: Instant) -> Effect {
        self.cancel_scheduled();
        if !self.can_navigate() {
            return Effect::None;
        }

        let item_count = self.collections[self.position.collection].len();
        if self.position.item + 1 < item_count {
            self.position.item += 1;
        } else if self.position.collection + 1 < self.collections.len() {
            self.position = PlaybackPosition::new(self.position.collection + 1, 0);
        } else {
            return self.close();
        }

        self.state = PlaybackState::Playing;
        self.begin_item(now)
    }

    /// Steps back to the previous item, the previous collection's last item,
    /// or — already at the very first item — closes the session (a backward
    /// step there is a dismiss, never a wrap).
    pub fn prev(&mut self, now: Instant) -> Effect {
        self.cancel_scheduled();
        if !self.can_navigate() {
            return Effect::None;
        }

        if self.position.item > 0 {
            self.position.item -= 1;
        } else if self.position.collection > 0 {
            let collection = self.position.collection - 1;
            let last = self.collections[collection].len() - 1;
            self.position = PlaybackPosition::new(collection, last);
        } else {
            return self.close();
        }

        self.state = PlaybackState::Playing;
        self.begin_item(now)
    }

    /// Pauses playback: cancels the timer and freezes the progress value in
    /// place. Used while a drag gesture is active. Idempotent outside
    /// Playing.
    pub fn pause(&mut self, now: Instant) -> Effect {
        if !self.state.is_playing() {
            return Effect::None;
        }
        self.cancel_scheduled();
        self.ramp.freeze(now);
        self.state = PlaybackState::Paused;
        Effect::Cancel
    }

    /// Resumes playback, scheduling the **remaining** duration of the current
    /// item so the visible progress continues instead of restarting.
    pub fn resume(&mut self, now: Instant) -> Effect {
        if !self.state.is_paused() {
            return Effect::None;
        }
        self.state = PlaybackState::Playing;
        self.ramp.resume(now);
        let token = self.schedule_advance();
        Effect::Schedule {
            token,
            duration: self.ramp.remaining_at(now),
        }
    }

    /// Enters the Dismissing state while the sheet animates off-screen.
    /// Cancels pending work; `close()` completes the transition.
    pub fn dismiss(&mut self, now: Instant) -> Effect {
        match self.state {
            PlaybackState::Playing | PlaybackState::Paused => {
                self.cancel_scheduled();
                self.ramp.freeze(now);
                self.state = PlaybackState::Dismissing;
                Effect::Cancel
            }
            _ => Effect::None,
        }
    }

    /// Closes the session from any state and fires the completion callback
    /// exactly once. A second call is a no-op.
    pub fn close(&mut self) -> Effect {
        if self.state.is_closed() {
            return Effect::None;
        }
        self.cancel_scheduled();
        self.ramp.reset();
        self.state = PlaybackState::Closed;
        if let Some(on_close) = self.on_close.take() {
            on_close();
        }
        Effect::Closed
    }

    /// Current playback state.
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Current position. Meaningful only while not Idle/Closed.
    #[must_use]
    pub fn position(&self) -> PlaybackPosition {
        self.position
    }

    /// Progress of the active item in `[0, 1]` at the given instant.
    #[must_use]
    pub fn progress(&self, now: Instant) -> f32 {
        self.ramp.value_at(now)
    }

    /// Per-item fill values for the current collection's timeline bar.
    /// Empty once the session is Idle or Closed.
    #[must_use]
    pub fn timeline_fill(&self, now: Instant) -> Vec<f32> {
        match self.state {
            PlaybackState::Idle | PlaybackState::Closed => Vec::new(),
            _ => {
                let count = self.collections[self.position.collection].len();
                progress::timeline_fill(count, self.position.item, self.ramp.value_at(now))
            }
        }
    }

    /// The collections this session plays.
    #[must_use]
    pub fn collections(&self) -> &[StoryCollection] {
        &self.collections
    }

    /// The collection at `position`, if in range.
    #[must_use]
    pub fn collection_at(&self, position: PlaybackPosition) -> Option<&StoryCollection> {
        self.collections.get(position.collection)
    }

    /// The item at `position`, if in range.
    #[must_use]
    pub fn item_at(&self, position: PlaybackPosition) -> Option<&StoryItem> {
        self.collections
            .get(position.collection)?
            .item(position.item)
    }

    /// The item currently being displayed.
    #[must_use]
    pub fn current_item(&self) -> Option<&StoryItem> {
        self.item_at(self.position)
    }

    /// The position following `position` in playback order, if any.
    #[must_use]
    pub fn next_position(&self, position: PlaybackPosition) -> Option<PlaybackPosition> {
        let collection = self.collections.get(position.collection)?;
        if position.item + 1 < collection.len() {
            Some(PlaybackPosition::new(position.collection, position.item + 1))
        } else if position.collection + 1 < self.collections.len() {
            Some(PlaybackPosition::new(position.collection + 1, 0))
        } else {
            None
        }
    }

    fn can_navigate(&self) -> bool {
        matches!(self.state, PlaybackState::Playing | PlaybackState::Paused)
    }

    /// Restarts the progress ramp and arms a fresh timer for the item at the
    /// current position.
    fn begin_item(&mut self, now: Instant) -> Effect {
        let duration = self
            .current_item()
            .map(|item| item.duration_or(self.default_duration_ms))
            .unwrap_or(Duration::from_millis(self.default_duration_ms));
        self.ramp.restart(duration, now);
        let token = self.schedule_advance();
        Effect::Advanced {
            position: self.position,
            token,
            duration,
        }
    }

    /// Issues a fresh live token. Always cancels first: the previous token
    /// goes stale before a new one exists, so at most one timer is ever live.
    fn schedule_advance(&mut self) -> AdvanceToken {
        self.cancel_scheduled();
        self.next_token += 1;
        let token = AdvanceToken(self.next_token);
        self.armed = Some(token);
        token
    }

    fn cancel_scheduled(&mut self) {
        self.armed = None;
    }
}
