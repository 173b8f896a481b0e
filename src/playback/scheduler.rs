// SPDX-License-Identifier: MPL-2.0
//! Tokio-backed auto-advance timer and the session event channel payload.
//!
//! The controller only issues tokens; this is where a token becomes a real
//! timer. Arming always aborts the previous task first, so the host runtime
//! carries at most one live timer per session — the same guarantee the
//! controller enforces logically with stale tokens.

use super::controller::AdvanceToken;
use crate::error::Error;
use crate::prefetch::MediaData;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Events delivered to the session's event loop.
#[derive(Debug)]
pub enum PlaybackEvent {
    /// The auto-advance timer for `token` elapsed. The controller decides
    /// whether the token is still live.
    AdvanceElapsed { token: AdvanceToken },
    /// A background media fetch finished for `item_id`.
    MediaFetched {
        item_id: String,
        uri: String,
        result: Result<MediaData, Error>,
    },
}

/// Arms and disarms the single auto-advance timer of a session.
#[derive(Debug, Default)]
pub struct AdvanceScheduler {
    task: Option<JoinHandle<()>>,
}

impl AdvanceScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self { task: None }
    }

    /// Arms the timer: after `duration`, `AdvanceElapsed { token }` is sent
    /// on `events`. Any previously armed timer is aborted first.
    pub fn arm(
        &mut self,
        token: AdvanceToken,
        duration: std::time::Duration,
        events: UnboundedSender<PlaybackEvent>,
    ) {
        self.disarm();
        self.task = Some(tokio::spawn(async move {
            sleep(duration).await;
            // The receiver disappearing just means the session is gone.
            let _ = events.send(PlaybackEvent::AdvanceElapsed { token });
        }));
    }

    /// Aborts the armed timer, if any.
    pub fn disarm(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Whether a timer task is currently pending.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for AdvanceScheduler {
    fn drop(&mut self) {
        self.disarm();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::controller::PlaybackController;
    use std::time::Duration;
    use tokio::sync::mpsc::unbounded_channel;
    use tokio::time::timeout;

    fn token_for_test() -> AdvanceToken {
        // Tokens are only minted by a controller; borrow one from a dummy.
        let mut controller = PlaybackController::new(vec![sample_collection()]);
        match controller.open(0, std::time::Instant::now()).unwrap() {
            crate::playback::Effect::Advanced { token, .. } => token,
            other => panic!("unexpected effect {other:?}"),
        }
    }

    fn sample_collection() -> crate::story::StoryCollection {
        crate::story::StoryCollection::new(
            "c1",
            crate::story::StoryAuthor {
                id: "author-1".to_string(),
                name: "Alex".to_string(),
                avatar_url: None,
            },
            chrono::Utc::now(),
            vec![crate::story::StoryItem {
                id: "a1".to_string(),
                media_type: crate::story::MediaType::Image,
                uri: "https://cdn.example/a1.jpg".to_string(),
                duration_ms: 5000,
                caption: None,
                poll: None,
            }],
        )
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn armed_timer_delivers_its_token() {
        let (tx, mut rx) = unbounded_channel();
        let mut scheduler = AdvanceScheduler::new();
        let token = token_for_test();

        scheduler.arm(token, Duration::from_millis(5000), tx);
        let event = rx.recv().await.expect("timer event should arrive");
        assert!(matches!(
            event,
            PlaybackEvent::AdvanceElapsed { token: fired } if fired == token
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_aborts_the_previous_timer() {
        let (tx, mut rx) = unbounded_channel();
        let mut scheduler = AdvanceScheduler::new();
        let first = token_for_test();
        let second = token_for_test();

        scheduler.arm(first, Duration::from_millis(5000), tx.clone());
        scheduler.arm(second, Duration::from_millis(3000), tx);

        let event = rx.recv().await.expect("timer event should arrive");
        assert!(matches!(
            event,
            PlaybackEvent::AdvanceElapsed { token } if token == second
        ));

        // The aborted timer must never deliver.
        let extra = timeout(Duration::from_millis(10_000), rx.recv()).await;
        assert!(extra.is_err() || extra.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn disarm_prevents_delivery() {
        let (tx, mut rx) = unbounded_channel();
        let mut scheduler = AdvanceScheduler::new();

        scheduler.arm(token_for_test(), Duration::from_millis(1000), tx);
        scheduler.disarm();
        assert!(!scheduler.is_armed());

        let extra = timeout(Duration::from_millis(5000), rx.recv()).await;
        assert!(extra.is_err() || extra.unwrap().is_none());
    }
}
