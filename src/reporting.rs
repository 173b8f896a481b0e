// SPDX-License-Identifier: MPL-2.0
//! Seen-state reporting and view metadata for owned stories.
//!
//! Reporting is best-effort: a collection is reported seen at most once per
//! (collection, viewer) pair per session, the report runs in the background,
//! and a failed report or metadata refresh never disturbs playback. Stale
//! metadata stays visible when a refresh fails.

use crate::config::defaults::{DEFAULT_VIEW_META_LIMIT, MAX_VIEW_META_LIMIT};
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// One entry of the "seen by" list of an owned story.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecentViewer {
    pub viewer_id: String,
    pub viewed_at: DateTime<Utc>,
}

/// View metadata for one story collection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ViewMeta {
    /// Total number of distinct viewers.
    pub views_count: u64,
    /// Most recent viewers, newest first, truncated to the requested limit.
    #[serde(default)]
    pub recent_viewers: Vec<RecentViewer>,
}

/// Backend the reporter talks to, abstracted so tests can run without a
/// server.
#[async_trait]
pub trait ReportingClient: Send + Sync {
    /// Records that `viewer_id` has seen `collection_id`.
    async fn report_seen(&self, collection_id: &str, viewer_id: &str) -> Result<()>;

    /// Fetches view metadata for an owned collection.
    async fn view_meta(&self, collection_id: &str, limit: usize) -> Result<ViewMeta>;
}

/// [`ReportingClient`] backed by the stories HTTP API.
#[derive(Debug, Clone)]
pub struct HttpReportingClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpReportingClient {
    /// Creates a client for the API rooted at `base_url` (no trailing slash).
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { client, base_url }
    }
}

#[async_trait]
impl ReportingClient for HttpReportingClient {
    async fn report_seen(&self, collection_id: &str, viewer_id: &str) -> Result<()> {
        let url = format!("{}/stories/{collection_id}/seen", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "viewer_id": viewer_id }))
            .send()
            .await
            .map_err(|e| Error::Reporting(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Reporting(format!(
                "seen report for {collection_id} returned HTTP {status}"
            )));
        }
        Ok(())
    }

    async fn view_meta(&self, collection_id: &str, limit: usize) -> Result<ViewMeta> {
        let url = format!(
            "{}/stories/{collection_id}/views?limit={limit}",
            self.base_url
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Reporting(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Reporting(format!(
                "view meta for {collection_id} returned HTTP {status}"
            )));
        }

        response
            .json::<ViewMeta>()
            .await
            .map_err(|e| Error::Reporting(e.to_string()))
    }
}

/// Deduplicates seen reports and caches view metadata for one session.
pub struct ViewReporter {
    client: Arc<dyn ReportingClient>,
    /// The viewer this session reports as.
    viewer_id: String,
    /// (collection, viewer) pairs already reported this session.
    reported: HashSet<(String, String)>,
    /// Last successfully fetched metadata per owned collection.
    meta: HashMap<String, ViewMeta>,
    /// Viewer list size requested from the backend.
    limit: usize,
}

impl ViewReporter {
    #[must_use]
    pub fn new(client: Arc<dyn ReportingClient>, viewer_id: impl Into<String>) -> Self {
        Self::with_limit(client, viewer_id, DEFAULT_VIEW_META_LIMIT)
    }

    #[must_use]
    pub fn with_limit(
        client: Arc<dyn ReportingClient>,
        viewer_id: impl Into<String>,
        limit: usize,
    ) -> Self {
        Self {
            client,
            viewer_id: viewer_id.into(),
            reported: HashSet::new(),
            meta: HashMap::new(),
            limit: limit.clamp(1, MAX_VIEW_META_LIMIT),
        }
    }

    /// Reports `collection_id` as seen, at most once per session.
    ///
    /// The report runs in the background; the returned handle is only for
    /// callers that want to await completion (tests do). Returns `None` when
    /// the collection was already reported.
    pub fn mark_seen(&mut self, collection_id: &str) -> Option<JoinHandle<()>> {
        let key = (collection_id.to_string(), self.viewer_id.clone());
        if !self.reported.insert(key) {
            return None;
        }

        let client = Arc::clone(&self.client);
        let id = collection_id.to_string();
        let viewer = self.viewer_id.clone();
        Some(tokio::spawn(async move {
            match client.report_seen(&id, &viewer).await {
                Ok(()) => debug!(collection = %id, "seen report delivered"),
                // Dedup state is kept; a lost report is acceptable.
                Err(e) => warn!(collection = %id, error = %e, "seen report failed"),
            }
        }))
    }

    /// Whether `collection_id` has been reported seen this session.
    #[must_use]
    pub fn is_reported(&self, collection_id: &str) -> bool {
        self.reported
            .contains(&(collection_id.to_string(), self.viewer_id.clone()))
    }

    /// Refreshes the cached view metadata for an owned collection.
    ///
    /// On failure the previous value (if any) stays cached and visible.
    pub async fn refresh_view_meta(&mut self, collection_id: &str) {
        match self.client.view_meta(collection_id, self.limit).await {
            Ok(meta) => {
                self.meta.insert(collection_id.to_string(), meta);
            }
            Err(e) => {
                debug!(collection = %collection_id, error = %e, "view meta refresh failed");
            }
        }
    }

    /// Last known view metadata for `collection_id`, if any fetch has
    /// succeeded this session.
    #[must_use]
    pub fn view_meta(&self, collection_id: &str) -> Option<&ViewMeta> {
        self.meta.get(collection_id)
    }
}

impl std::fmt::Debug for ViewReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewReporter")
            .field("viewer_id", &self.viewer_id)
            .field("reported", &self.reported.len())
            .field("cached_meta", &self.meta.keys().collect::<Vec<_>>())
            .field("limit", &self.limit)
            .finish()
    }
}
