// SPDX-License-Identifier: MPL-2.0
//! Per-session orchestrator wiring the playback engine together.
//!
//! A [`ViewerSession`] owns one controller, one gesture coordinator, one
//! prefetch cache, one reporter, and one timer. Sessions share no mutable
//! state, so two sessions can never interfere. The session is driven from
//! the outside: the host forwards pointer input to [`handle_gesture`] and
//! pumps the event channel returned by [`new`] into [`handle_event`].
//!
//! [`new`]: ViewerSession::new
//! [`handle_gesture`]: ViewerSession::handle_gesture
//! [`handle_event`]: ViewerSession::handle_event

use crate::config::defaults::{SHEET_DISMISS_DURATION_MS, SHEET_SNAP_DURATION_MS};
use crate::config::Config;
use crate::error::Result;
use crate::gesture::{self, AnimatedScalar, GestureCoordinator, TapZone};
use crate::playback::{
    AdvanceScheduler, Effect, PlaybackController, PlaybackEvent, PlaybackPosition, PlaybackState,
};
use crate::prefetch::{load_media_for_prefetch, MediaCache, MediaCacheConfig, MediaData, MediaSource};
use crate::reporting::{ReportingClient, ViewMeta, ViewReporter};
use crate::story::{StoryCollection, StoryItem};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::warn;

/// Layout facts the session needs to resolve gestures and animate the sheet.
#[derive(Debug, Clone, Copy)]
pub struct SheetGeometry {
    /// Distance between the expanded and collapsed rest offsets.
    pub drag_range: f32,
    /// Screen width, for tap-zone resolution.
    pub screen_width: f32,
    /// Offset at which the sheet is fully off-screen (dismiss target).
    pub offscreen_offset: f32,
}

/// Per-session construction options.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub geometry: SheetGeometry,
    pub cache: MediaCacheConfig,
    /// The viewer this session reports seen-state as.
    pub viewer_id: String,
    /// Viewer list size requested per view-meta fetch.
    pub view_meta_limit: usize,
    /// Display duration applied to items carrying no usable duration
    /// (in milliseconds).
    pub default_item_duration_ms: u64,
}

impl SessionOptions {
    /// Derives session options from user settings, falling back to defaults.
    #[must_use]
    pub fn from_settings(
        geometry: SheetGeometry,
        viewer_id: impl Into<String>,
        settings: &Config,
    ) -> Self {
        Self {
            geometry,
            cache: MediaCacheConfig::from_settings(settings),
            viewer_id: viewer_id.into(),
            view_meta_limit: settings.effective_view_meta_limit(),
            default_item_duration_ms: settings.effective_default_duration_ms(),
        }
    }
}

/// One playback session over a list of story collections.
///
/// Explicitly constructed per presentation; nothing here is global.
pub struct ViewerSession<S: AnimatedScalar> {
    controller: PlaybackController,
    scheduler: AdvanceScheduler,
    gesture: GestureCoordinator,
    sheet: S,
    cache: MediaCache,
    source: Arc<dyn MediaSource>,
    reporter: ViewReporter,
    geometry: SheetGeometry,
    events_tx: UnboundedSender<PlaybackEvent>,
    /// URIs with a fetch already in flight.
    inflight: HashSet<String>,
    /// Position of the previously displayed item, for failure-flag clearing.
    last_position: Option<PlaybackPosition>,
}

impl<S: AnimatedScalar> ViewerSession<S> {
    /// Creates a session and the event channel the host must pump into
    /// [`handle_event`](Self::handle_event).
    #[must_use]
    pub fn new(
        collections: Vec<StoryCollection>,
        options: SessionOptions,
        source: Arc<dyn MediaSource>,
        reporting: Arc<dyn ReportingClient>,
        sheet: S,
    ) -> (Self, UnboundedReceiver<PlaybackEvent>) {
        let (events_tx, events_rx) = unbounded_channel();
        let session = Self {
            controller: PlaybackController::new(collections)
                .with_default_duration_ms(options.default_item_duration_ms),
            scheduler: AdvanceScheduler::new(),
            gesture: GestureCoordinator::new(options.geometry.drag_range, options.geometry.screen_width),
            sheet,
            cache: MediaCache::new(options.cache),
            source,
            reporter: ViewReporter::with_limit(reporting, options.viewer_id, options.view_meta_limit),
            geometry: options.geometry,
            events_tx,
            inflight: HashSet::new(),
            last_position: None,
        };
        (session, events_rx)
    }

    /// Sets the completion callback, fired exactly once when the session
    /// closes by any path.
    #[must_use]
    pub fn with_on_close(mut self, on_close: impl FnOnce() + Send + 'static) -> Self {
        self.controller = self.controller.with_on_close(on_close);
        self
    }

    /// Opens the session at `(initial_index, 0)` and starts playback.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPosition`](crate::error::Error::InvalidPosition)
    /// if the collections list is empty, the index is out of range, or the
    /// session was already opened.
    pub fn open(&mut self, initial_index: usize, now: Instant) -> Result<()> {
        let effect = self.controller.open(initial_index, now)?;
        self.apply(effect, now);
        Ok(())
    }

    /// Handles one event from the session's channel.
    pub fn handle_event(&mut self, event: PlaybackEvent, now: Instant) {
        match event {
            PlaybackEvent::AdvanceElapsed { token } => {
                let effect = self.controller.advance_elapsed(token, now);
                self.apply(effect, now);
            }
            PlaybackEvent::MediaFetched {
                item_id,
                uri,
                result,
            } => {
                self.inflight.remove(&uri);
                match result {
                    Ok(media) => {
                        self.cache.insert(uri, media);
                    }
                    // The timeline stays on schedule; the renderer shows
                    // fallback art until the item is revisited.
                    Err(e) => {
                        warn!(item = %item_id, error = %e, "media prefetch failed");
                        self.cache.mark_failed(&item_id);
                    }
                }
            }
        }
    }

    /// Handles one pointer message from the host's gesture source.
    pub fn handle_gesture(&mut self, msg: gesture::Message, now: Instant) {
        match self.gesture.handle(msg) {
            gesture::Effect::None => {}
            gesture::Effect::DragStarted => {
                let effect = self.controller.pause(now);
                self.apply(effect, now);
            }
            gesture::Effect::SheetOffset(offset) => {
                self.sheet.stop();
                self.sheet.set(offset);
            }
            gesture::Effect::Snap(rest) => {
                self.sheet.animate_to(
                    self.gesture.offset_for(rest),
                    Duration::from_millis(SHEET_SNAP_DURATION_MS),
                );
                let effect = self.controller.resume(now);
                self.apply(effect, now);
            }
            gesture::Effect::Dismiss => {
                let effect = self.controller.dismiss(now);
                self.apply(effect, now);
                self.sheet.animate_to(
                    self.geometry.offscreen_offset,
                    Duration::from_millis(SHEET_DISMISS_DURATION_MS),
                );
                let effect = self.controller.close();
                self.apply(effect, now);
            }
            gesture::Effect::Tap(TapZone::Left) => {
                let effect = self.controller.prev(now);
                self.apply(effect, now);
            }
            gesture::Effect::Tap(TapZone::Right) => {
                let effect = self.controller.next(now);
                self.apply(effect, now);
            }
        }
    }

    /// Records a render-time load failure for an item whose bytes fetched
    /// but could not be displayed.
    pub fn media_load_failed(&mut self, item_id: &str) {
        warn!(item = %item_id, "renderer signaled a media failure");
        self.cache.mark_failed(item_id);
    }

    /// Refreshes the cached view metadata for an owned collection. On
    /// failure the previous value stays visible.
    pub async fn refresh_view_meta(&mut self, collection_id: &str) {
        self.reporter.refresh_view_meta(collection_id).await;
    }

    /// Last known view metadata for `collection_id`.
    #[must_use]
    pub fn view_meta(&self, collection_id: &str) -> Option<&ViewMeta> {
        self.reporter.view_meta(collection_id)
    }

    /// Whether `collection_id` has been reported seen this session.
    #[must_use]
    pub fn is_seen_reported(&self, collection_id: &str) -> bool {
        self.reporter.is_reported(collection_id)
    }

    /// Current playback state.
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.controller.state()
    }

    /// Current position.
    #[must_use]
    pub fn position(&self) -> PlaybackPosition {
        self.controller.position()
    }

    /// Progress of the active item in `[0, 1]` at the given instant.
    #[must_use]
    pub fn progress(&self, now: Instant) -> f32 {
        self.controller.progress(now)
    }

    /// Per-item fill values for the current collection's timeline bar.
    #[must_use]
    pub fn timeline_fill(&self, now: Instant) -> Vec<f32> {
        self.controller.timeline_fill(now)
    }

    /// The item currently being displayed.
    #[must_use]
    pub fn current_item(&self) -> Option<&StoryItem> {
        self.controller.current_item()
    }

    /// Cached media for the current item, if prefetch has landed.
    pub fn current_media(&mut self) -> Option<MediaData> {
        let uri = self.controller.current_item()?.uri.clone();
        self.cache.get(&uri)
    }

    /// Whether the current item's media is flagged as failed.
    #[must_use]
    pub fn is_current_failed(&self) -> bool {
        self.controller
            .current_item()
            .is_some_and(|item| self.cache.is_failed(&item.id))
    }

    /// Current sheet offset.
    #[must_use]
    pub fn sheet_offset(&self) -> f32 {
        self.sheet.value()
    }

    /// Whether the auto-advance timer task is pending.
    #[must_use]
    pub fn is_timer_armed(&self) -> bool {
        self.scheduler.is_armed()
    }

    /// Interprets a controller effect: timers, position bookkeeping,
    /// teardown.
    fn apply(&mut self, effect: Effect, _now: Instant) {
        match effect {
            Effect::None => {}
            Effect::Cancel => self.scheduler.disarm(),
            Effect::Schedule { token, duration } => {
                self.scheduler.arm(token, duration, self.events_tx.clone());
            }
            Effect::Advanced {
                position,
                token,
                duration,
            } => {
                self.scheduler.arm(token, duration, self.events_tx.clone());
                self.enter_position(position);
            }
            Effect::Closed => self.scheduler.disarm(),
        }
    }

    /// Position-change bookkeeping: failure-flag clearing, seen reporting,
    /// and the prefetch kick.
    fn enter_position(&mut self, position: PlaybackPosition) {
        if let Some(last) = self.last_position {
            if last != position {
                // Leaving an item clears its failure flag so revisiting
                // retries the fetch.
                if let Some(departed) = self.controller.item_at(last) {
                    let id = departed.id.clone();
                    self.cache.clear_failed(&id);
                }
            }
        }
        self.last_position = Some(position);

        // A collection counts as seen only once its first item is shown;
        // stepping backward onto its last item does not qualify.
        if position.item == 0 {
            if let Some(collection) = self.controller.collection_at(position) {
                let id = collection.id.clone();
                let _report = self.reporter.mark_seen(&id);
            }
        }

        self.kick_prefetch(position);
    }

    /// Requests the active item and the look-ahead window, skipping anything
    /// cached, in flight, or currently flagged as failed.
    fn kick_prefetch(&mut self, position: PlaybackPosition) {
        let mut window = Vec::new();
        let mut cursor = Some(position);
        for _ in 0..=self.cache.look_ahead() {
            let Some(at) = cursor else { break };
            if let Some(item) = self.controller.item_at(at) {
                window.push((item.id.clone(), item.uri.clone()));
            }
            cursor = self.controller.next_position(at);
        }

        // Empty when the cache is disabled or everything is already held.
        let uris: Vec<String> = window.iter().map(|(_, uri)| uri.clone()).collect();
        let wanted = self.cache.uris_to_prefetch(&uris);

        for (item_id, uri) in window {
            if !wanted.contains(&uri)
                || self.inflight.contains(&uri)
                || self.cache.is_failed(&item_id)
            {
                continue;
            }
            self.inflight.insert(uri.clone());

            let source = Arc::clone(&self.source);
            let events = self.events_tx.clone();
            tokio::spawn(async move {
                let result = load_media_for_prefetch(source, uri.clone()).await;
                // The receiver disappearing just means the session is gone.
                let _ = events.send(PlaybackEvent::MediaFetched {
                    item_id,
                    uri,
                    result,
                });
            });
        }
    }
}

impl<S: AnimatedScalar> std::fmt::Debug for ViewerSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewerSession")
            .field("state", &self.controller.state())
            .field("position", &self.controller.position())
            .field("cache", &self.cache)
            .field("inflight", &self.inflight.len())
            .field("reporter", &self.reporter)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MediaLoadError, Result as CrateResult};
    use crate::gesture::{InstantScalar, Message};
    use crate::story::{MediaType, StoryAuthor};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::io::Cursor;
    use std::sync::Mutex;

    const GEOMETRY: SheetGeometry = SheetGeometry {
        drag_range: 400.0,
        screen_width: 390.0,
        offscreen_offset: 900.0,
    };

    fn png_bytes() -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(4, 4, image::Rgba([1, 2, 3, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    /// Serves a valid PNG for every URI, or fails every fetch.
    struct FakeSource {
        fail: bool,
    }

    #[async_trait]
    impl MediaSource for FakeSource {
        async fn fetch(&self, _uri: &str) -> std::result::Result<Vec<u8>, MediaLoadError> {
            if self.fail {
                Err(MediaLoadError::Network("connection refused".to_string()))
            } else {
                Ok(png_bytes())
            }
        }
    }

    struct FakeReporting {
        seen: Mutex<Vec<(String, String)>>,
        meta_limits: Mutex<Vec<usize>>,
    }

    impl FakeReporting {
        fn new() -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
                meta_limits: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ReportingClient for FakeReporting {
        async fn report_seen(&self, collection_id: &str, viewer_id: &str) -> CrateResult<()> {
            self.seen
                .lock()
                .unwrap()
                .push((collection_id.to_string(), viewer_id.to_string()));
            Ok(())
        }

        async fn view_meta(&self, _collection_id: &str, limit: usize) -> CrateResult<ViewMeta> {
            self.meta_limits.lock().unwrap().push(limit);
            Ok(ViewMeta {
                views_count: 9,
                recent_viewers: vec![],
            })
        }
    }

    fn item(id: &str, duration_ms: u64) -> StoryItem {
        StoryItem {
            id: id.to_string(),
            media_type: MediaType::Image,
            uri: format!("https://cdn.example/{id}.jpg"),
            duration_ms,
            caption: None,
            poll: None,
        }
    }

    fn collections() -> Vec<StoryCollection> {
        let author = StoryAuthor {
            id: "author-1".to_string(),
            name: "Alex".to_string(),
            avatar_url: None,
        };
        vec![
            StoryCollection::new(
                "A",
                author.clone(),
                Utc::now(),
                vec![item("a1", 5000), item("a2", 5000)],
            )
            .unwrap(),
            StoryCollection::new("B", author, Utc::now(), vec![item("b1", 6000)]).unwrap(),
        ]
    }

    fn session_with_options(
        fail_media: bool,
        options: SessionOptions,
    ) -> (
        ViewerSession<InstantScalar>,
        UnboundedReceiver<PlaybackEvent>,
        Arc<FakeReporting>,
    ) {
        let reporting = Arc::new(FakeReporting::new());
        let (session, events) = ViewerSession::new(
            collections(),
            options,
            Arc::new(FakeSource { fail: fail_media }),
            Arc::clone(&reporting) as Arc<dyn ReportingClient>,
            InstantScalar::default(),
        );
        (session, events, reporting)
    }

    fn session(
        fail_media: bool,
    ) -> (
        ViewerSession<InstantScalar>,
        UnboundedReceiver<PlaybackEvent>,
        Arc<FakeReporting>,
    ) {
        session_with_options(
            fail_media,
            SessionOptions::from_settings(GEOMETRY, "me", &Config::default()),
        )
    }

    /// Lets spawned fetch/report tasks run to completion under a paused
    /// clock, feeding any media events back into the session.
    async fn drain_ready_events(
        session: &mut ViewerSession<InstantScalar>,
        events: &mut UnboundedReceiver<PlaybackEvent>,
        now: Instant,
    ) {
        tokio::time::sleep(Duration::from_millis(1)).await;
        while let Ok(event) = events.try_recv() {
            session.handle_event(event, now);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn open_starts_playback_and_reports_seen() {
        let (mut session, mut events, reporting) = session(false);
        let t0 = Instant::now();
        session.open(0, t0).unwrap();

        assert_eq!(session.state(), PlaybackState::Playing);
        assert_eq!(session.position(), PlaybackPosition::new(0, 0));
        assert!(session.is_timer_armed());
        assert!(session.is_seen_reported("A"));

        drain_ready_events(&mut session, &mut events, t0).await;
        let seen = reporting.seen.lock().unwrap();
        assert_eq!(seen.as_slice(), [("A".to_string(), "me".to_string())]);
    }

    #[tokio::test(start_paused = true)]
    async fn prefetch_lands_media_for_active_and_next_item() {
        let (mut session, mut events, _) = session(false);
        let t0 = Instant::now();
        session.open(0, t0).unwrap();

        drain_ready_events(&mut session, &mut events, t0).await;
        assert!(session.current_media().is_some());
        // Look-ahead covered a2 as well.
        assert_eq!(session.cache.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_prefetch_flags_item_but_keeps_the_timer() {
        let (mut session, mut events, _) = session(true);
        let t0 = Instant::now();
        session.open(0, t0).unwrap();

        drain_ready_events(&mut session, &mut events, t0).await;
        assert!(session.is_current_failed());
        assert!(session.current_media().is_none());
        assert_eq!(session.state(), PlaybackState::Playing);
        assert!(session.is_timer_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn timer_event_advances_the_position() {
        let (mut session, mut events, _) = session(false);
        let t0 = Instant::now();
        session.open(0, t0).unwrap();

        // Wait out the 5s item under the paused clock; skip media events.
        loop {
            let event = events.recv().await.expect("channel open");
            if matches!(event, PlaybackEvent::AdvanceElapsed { .. }) {
                session.handle_event(event, t0 + Duration::from_millis(5000));
                break;
            }
            session.handle_event(event, t0);
        }

        assert_eq!(session.position(), PlaybackPosition::new(0, 1));
        assert!(session.is_timer_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn tap_zones_navigate() {
        let (mut session, _events, _) = session(false);
        let t0 = Instant::now();
        session.open(0, t0).unwrap();

        session.handle_gesture(Message::Began { x: 300.0, y: 400.0 }, t0);
        session.handle_gesture(Message::Ended { velocity_y: 0.0 }, t0);
        assert_eq!(session.position(), PlaybackPosition::new(0, 1));

        session.handle_gesture(Message::Began { x: 50.0, y: 400.0 }, t0);
        session.handle_gesture(Message::Ended { velocity_y: 0.0 }, t0);
        assert_eq!(session.position(), PlaybackPosition::new(0, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn drag_pauses_and_snap_release_resumes() {
        let (mut session, _events, _) = session(false);
        let t0 = Instant::now();
        session.open(0, t0).unwrap();

        session.handle_gesture(Message::Began { x: 200.0, y: 100.0 }, t0);
        let t1 = t0 + Duration::from_millis(2000);
        session.handle_gesture(Message::Moved { x: 200.0, y: 160.0 }, t1);
        assert_eq!(session.state(), PlaybackState::Paused);
        assert!(!session.is_timer_armed());

        session.handle_gesture(Message::Moved { x: 200.0, y: 200.0 }, t1);
        assert_eq!(session.sheet_offset(), 100.0);

        session.handle_gesture(Message::Ended { velocity_y: 0.05 }, t1);
        assert_eq!(session.state(), PlaybackState::Playing);
        assert!(session.is_timer_armed());
        // Snapped back to the expanded rest offset.
        assert_eq!(session.sheet_offset(), 0.0);
        // Progress was preserved across the pause.
        assert!((session.progress(t1) - 0.4).abs() < 0.001);
    }

    #[tokio::test(start_paused = true)]
    async fn dismiss_gesture_closes_the_session() {
        let (mut session, _events, _) = session(false);
        let t0 = Instant::now();
        session.open(0, t0).unwrap();

        session.handle_gesture(Message::Began { x: 200.0, y: 100.0 }, t0);
        session.handle_gesture(Message::Moved { x: 200.0, y: 180.0 }, t0);
        session.handle_gesture(Message::Moved { x: 200.0, y: 250.0 }, t0);
        session.handle_gesture(Message::Ended { velocity_y: 0.4 }, t0);

        assert_eq!(session.state(), PlaybackState::Closed);
        assert!(!session.is_timer_armed());
        assert_eq!(session.sheet_offset(), GEOMETRY.offscreen_offset);
    }

    #[tokio::test(start_paused = true)]
    async fn on_close_fires_once_through_the_session() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let closes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&closes);

        let (session, _events, _) = session(false);
        let mut session = session.with_on_close(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let t0 = Instant::now();
        session.open(0, t0).unwrap();

        // Walk backward off the very first item: closes, never wraps.
        session.handle_gesture(Message::Began { x: 50.0, y: 400.0 }, t0);
        session.handle_gesture(Message::Ended { velocity_y: 0.0 }, t0);
        assert_eq!(session.state(), PlaybackState::Closed);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn render_failure_flag_clears_when_the_position_moves_on() {
        let (mut session, _events, _) = session(false);
        let t0 = Instant::now();
        session.open(0, t0).unwrap();

        session.media_load_failed("a1");
        assert!(session.is_current_failed());

        // Advance away and back; the flag was cleared on departure.
        session.handle_gesture(Message::Began { x: 300.0, y: 400.0 }, t0);
        session.handle_gesture(Message::Ended { velocity_y: 0.0 }, t0);
        session.handle_gesture(Message::Began { x: 50.0, y: 400.0 }, t0);
        session.handle_gesture(Message::Ended { velocity_y: 0.0 }, t0);

        assert_eq!(session.position(), PlaybackPosition::new(0, 0));
        assert!(!session.is_current_failed());
    }

    #[tokio::test(start_paused = true)]
    async fn view_meta_refresh_is_exposed() {
        let (mut session, _events, _) = session(false);
        session.refresh_view_meta("A").await;
        assert_eq!(session.view_meta("A").unwrap().views_count, 9);
    }

    #[tokio::test(start_paused = true)]
    async fn backward_crossing_does_not_report_the_previous_collection() {
        let (mut session, _events, _) = session(false);
        let t0 = Instant::now();
        session.open(1, t0).unwrap();
        assert!(session.is_seen_reported("B"));
        assert!(!session.is_seen_reported("A"));

        // Stepping back lands on A's last item; A's first item was never
        // shown, so A must not be reported yet.
        session.handle_gesture(Message::Began { x: 50.0, y: 400.0 }, t0);
        session.handle_gesture(Message::Ended { velocity_y: 0.0 }, t0);
        assert_eq!(session.position(), PlaybackPosition::new(0, 1));
        assert!(!session.is_seen_reported("A"));

        // One more step back shows A's first item.
        session.handle_gesture(Message::Began { x: 50.0, y: 400.0 }, t0);
        session.handle_gesture(Message::Ended { velocity_y: 0.0 }, t0);
        assert_eq!(session.position(), PlaybackPosition::new(0, 0));
        assert!(session.is_seen_reported("A"));
    }

    #[tokio::test(start_paused = true)]
    async fn session_options_wire_user_settings_through() {
        let settings = Config {
            view_meta_limit: Some(5),
            default_item_duration_ms: Some(7000),
            ..Config::default()
        };
        let options = SessionOptions::from_settings(GEOMETRY, "me", &settings);
        assert_eq!(options.view_meta_limit, 5);
        assert_eq!(options.default_item_duration_ms, 7000);

        let (mut session, _events, reporting) = session_with_options(false, options);
        session.refresh_view_meta("A").await;
        assert_eq!(reporting.meta_limits.lock().unwrap().as_slice(), [5]);
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_prefetch_spawns_no_fetches() {
        let mut options = SessionOptions::from_settings(GEOMETRY, "me", &Config::default());
        options.cache = MediaCacheConfig::disabled();

        let (mut session, mut events, _) = session_with_options(false, options);
        let t0 = Instant::now();
        session.open(0, t0).unwrap();

        assert!(session.inflight.is_empty());
        drain_ready_events(&mut session, &mut events, t0).await;
        assert!(session.current_media().is_none());
        assert_eq!(session.state(), PlaybackState::Playing);
    }
}
