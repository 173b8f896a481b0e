// SPDX-License-Identifier: MPL-2.0
//! Media prefetch cache for gapless item transitions.
//!
//! This module provides background preloading of upcoming story media,
//! reducing perceived latency when playback advances.
//!
//! # Design
//!
//! - **LRU eviction**: Least recently used media is evicted first
//! - **Memory-bounded**: Total cache size limited by configurable byte limit
//! - **URI-keyed**: Media indexed by its remote URI
//! - **Async loading**: Prefetching runs in background without blocking
//!   playback, and a failed fetch never stalls the auto-advance timer
//!
//! # Usage
//!
//! ```ignore
//! let mut cache = MediaCache::new(config);
//!
//! // Check if media is already cached
//! if let Some(media) = cache.get(&uri) {
//!     // Render from cache
//! }
//!
//! // Fetch whatever the look-ahead window still misses
//! for uri in cache.uris_to_prefetch(&window) { /* spawn a fetch */ }
//! ```

use crate::config::defaults::{
    DEFAULT_MAX_CACHED_ITEMS, DEFAULT_PREFETCH_CACHE_BYTES, MAX_MAX_CACHED_ITEMS,
    MAX_PREFETCH_CACHE_BYTES, MIN_MAX_CACHED_ITEMS, MIN_PREFETCH_CACHE_BYTES,
};
use crate::error::{Error, MediaLoadError};
use async_trait::async_trait;
use lru::LruCache;
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

/// Decoded media ready for the host to render.
///
/// Pixels are RGBA8, row-major. The pixel buffer is reference-counted so
/// clones handed to the renderer stay cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaData {
    pub width: u32,
    pub height: u32,
    pub pixels: Arc<Vec<u8>>,
}

impl MediaData {
    #[must_use]
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels: Arc::new(pixels),
        }
    }

    /// Approximate memory footprint (width * height * 4 for RGBA).
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        (self.width as usize) * (self.height as usize) * 4
    }
}

/// Source of raw media bytes, abstracted so tests can run without a network.
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Fetches the raw encoded bytes behind `uri`.
    async fn fetch(&self, uri: &str) -> Result<Vec<u8>, MediaLoadError>;
}

/// [`MediaSource`] backed by an HTTP client.
#[derive(Debug, Clone)]
pub struct HttpMediaSource {
    client: reqwest::Client,
}

/// Per-request timeout for media fetches.
const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

impl HttpMediaSource {
    /// Creates a source with its own client and a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MediaLoad`] if the client cannot be constructed.
    pub fn new() -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| Error::MediaLoad(MediaLoadError::Other(e.to_string())))?;
        Ok(Self { client })
    }

    /// Creates a source reusing an existing client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MediaSource for HttpMediaSource {
    async fn fetch(&self, uri: &str) -> Result<Vec<u8>, MediaLoadError> {
        let response = self
            .client
            .get(uri)
            .send()
            .await
            .map_err(|e| MediaLoadError::from_message(&e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MediaLoadError::Network(format!(
                "HTTP status {status} for {uri}"
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| MediaLoadError::from_message(&e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Decodes encoded media bytes into renderable RGBA data.
///
/// # Errors
///
/// Returns [`MediaLoadError::Decode`] when the bytes are not a supported
/// image format.
pub fn decode_media(bytes: &[u8]) -> Result<MediaData, MediaLoadError> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| MediaLoadError::Decode(e.to_string()))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    Ok(MediaData::from_rgba(width, height, image.into_raw()))
}

/// Fetches and decodes one media item for prefetching.
///
/// Decoding runs on the blocking pool so large images never stall the
/// session's event loop.
///
/// # Errors
///
/// Returns [`Error::MediaLoad`] when the fetch or decode fails; the caller
/// records the failure but keeps playback running.
pub async fn load_media_for_prefetch(
    source: Arc<dyn MediaSource>,
    uri: String,
) -> Result<MediaData, Error> {
    let bytes = source.fetch(&uri).await.map_err(Error::MediaLoad)?;
    let decoded = tokio::task::spawn_blocking(move || decode_media(&bytes))
        .await
        .map_err(|e| Error::MediaLoad(MediaLoadError::Other(format!("decode task failed: {e}"))))?;
    decoded.map_err(Error::MediaLoad)
}

/// Configuration for the media cache.
#[derive(Debug, Clone, Copy)]
pub struct MediaCacheConfig {
    /// Maximum cache size in bytes.
    pub max_bytes: usize,

    /// Maximum number of media items to cache.
    pub max_items: usize,

    /// Number of upcoming items to prefetch beyond the active one.
    pub look_ahead: usize,

    /// Whether prefetching is enabled.
    pub enabled: bool,
}

impl Default for MediaCacheConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_PREFETCH_CACHE_BYTES,
            max_items: DEFAULT_MAX_CACHED_ITEMS,
            look_ahead: crate::config::defaults::DEFAULT_LOOK_AHEAD,
            enabled: true,
        }
    }
}

impl MediaCacheConfig {
    /// Creates a configuration with the given limits, clamped to sane bounds.
    #[must_use]
    pub fn new(max_bytes: usize, max_items: usize, look_ahead: usize) -> Self {
        Self {
            max_bytes: max_bytes.clamp(MIN_PREFETCH_CACHE_BYTES, MAX_PREFETCH_CACHE_BYTES),
            max_items: max_items.clamp(MIN_MAX_CACHED_ITEMS, MAX_MAX_CACHED_ITEMS),
            look_ahead,
            enabled: true,
        }
    }

    /// Creates a disabled configuration.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Derives cache limits from user settings, falling back to defaults.
    #[must_use]
    pub fn from_settings(config: &crate::config::Config) -> Self {
        let defaults = Self::default();
        let mut derived = Self::new(
            config.prefetch_max_bytes.unwrap_or(defaults.max_bytes),
            config.prefetch_max_items.unwrap_or(defaults.max_items),
            config.prefetch_look_ahead.unwrap_or(defaults.look_ahead),
        );
        derived.enabled = config.prefetch_enabled.unwrap_or(true);
        derived
    }
}

/// Cached media entry with its byte footprint.
#[derive(Debug, Clone)]
struct CacheEntry {
    media: MediaData,
    size_bytes: usize,
}

impl CacheEntry {
    fn new(media: MediaData) -> Self {
        let size_bytes = media.size_bytes();
        Self { media, size_bytes }
    }
}

/// Statistics about cache performance.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    /// Number of media items currently in cache.
    pub item_count: usize,

    /// Total bytes currently used by cached media.
    pub total_bytes: usize,

    /// Number of cache hits.
    pub hits: u64,

    /// Number of cache misses.
    pub misses: u64,

    /// Number of items evicted due to limits.
    pub evictions: u64,

    /// Number of items inserted.
    pub insertions: u64,
}

impl CacheStats {
    /// Returns the cache hit rate as a percentage (0.0 - 100.0).
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// LRU cache for prefetched story media.
///
/// Memory-bounded with LRU eviction, keyed by media URI. Also tracks which
/// item ids have failed to load so the session can surface a retryable
/// placeholder instead of refetching in a loop.
pub struct MediaCache {
    /// LRU cache mapping media URIs to entries.
    cache: LruCache<String, CacheEntry>,

    /// Item ids whose media failed to fetch or decode.
    failed: HashSet<String>,

    /// Cache configuration.
    config: MediaCacheConfig,

    /// Current total size in bytes.
    current_bytes: usize,

    /// Performance statistics.
    stats: CacheStats,
}

impl MediaCache {
    /// Creates a new cache with the given configuration.
    ///
    /// # Panics
    ///
    /// Panics if `DEFAULT_MAX_CACHED_ITEMS` is zero, which would indicate a
    /// build configuration error.
    #[must_use]
    pub fn new(config: MediaCacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_items).unwrap_or(
            NonZeroUsize::new(DEFAULT_MAX_CACHED_ITEMS)
                .expect("DEFAULT_MAX_CACHED_ITEMS must be non-zero"),
        );

        Self {
            cache: LruCache::new(capacity),
            failed: HashSet::new(),
            config,
            current_bytes: 0,
            stats: CacheStats::default(),
        }
    }

    /// Creates a cache with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(MediaCacheConfig::default())
    }

    /// Returns whether prefetching is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Returns how many upcoming items to prefetch beyond the active one.
    #[must_use]
    pub fn look_ahead(&self) -> usize {
        self.config.look_ahead
    }

    /// Inserts decoded media into the cache.
    ///
    /// Returns `true` if it was inserted, `false` if caching is disabled or
    /// the media is too large.
    pub fn insert(&mut self, uri: String, media: MediaData) -> bool {
        if !self.config.enabled {
            return false;
        }

        let entry = CacheEntry::new(media);
        let media_size = entry.size_bytes;

        // Don't cache media larger than half the cache size
        if media_size > self.config.max_bytes / 2 {
            return false;
        }

        // Evict until we have room
        while self.current_bytes + media_size > self.config.max_bytes && !self.cache.is_empty() {
            if let Some((_, evicted)) = self.cache.pop_lru() {
                self.current_bytes = self.current_bytes.saturating_sub(evicted.size_bytes);
                self.stats.evictions += 1;
            }
        }

        // Replace an existing entry for the same URI
        if let Some(existing) = self.cache.pop(&uri) {
            self.current_bytes = self.current_bytes.saturating_sub(existing.size_bytes);
        }

        self.current_bytes += entry.size_bytes;
        self.cache.put(uri, entry);
        self.stats.insertions += 1;
        self.stats.item_count = self.cache.len();
        self.stats.total_bytes = self.current_bytes;

        true
    }

    /// Gets media from the cache by URI, updating LRU order on access.
    pub fn get(&mut self, uri: &str) -> Option<MediaData> {
        if !self.config.enabled {
            return None;
        }

        if let Some(entry) = self.cache.get(uri) {
            self.stats.hits += 1;
            Some(entry.media.clone())
        } else {
            self.stats.misses += 1;
            None
        }
    }

    /// Checks whether media is cached without updating LRU order.
    #[must_use]
    pub fn contains(&self, uri: &str) -> bool {
        if !self.config.enabled {
            return false;
        }
        self.cache.contains(uri)
    }

    /// Returns the URIs from `window` that still need fetching.
    #[must_use]
    pub fn uris_to_prefetch(&self, window: &[String]) -> Vec<String> {
        if !self.config.enabled {
            return Vec::new();
        }

        window
            .iter()
            .filter(|uri| !self.cache.contains(uri.as_str()))
            .cloned()
            .collect()
    }

    /// Records that the media for `item_id` failed to load.
    pub fn mark_failed(&mut self, item_id: &str) {
        self.failed.insert(item_id.to_string());
    }

    /// Clears the failure flag for `item_id`, enabling a retry.
    pub fn clear_failed(&mut self, item_id: &str) {
        self.failed.remove(item_id);
    }

    /// Whether the media for `item_id` is flagged as failed.
    #[must_use]
    pub fn is_failed(&self, item_id: &str) -> bool {
        self.failed.contains(item_id)
    }

    /// Clears all cached media and failure flags.
    pub fn clear(&mut self) {
        self.cache.clear();
        self.failed.clear();
        self.current_bytes = 0;
        self.stats.item_count = 0;
        self.stats.total_bytes = 0;
    }

    /// Returns the current cache statistics.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Returns the current number of cached items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Returns whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Returns the current memory usage in bytes.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.current_bytes
    }

    /// Returns the cache configuration.
    #[must_use]
    pub fn config(&self) -> &MediaCacheConfig {
        &self.config
    }
}

impl std::fmt::Debug for MediaCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaCache")
            .field("enabled", &self.config.enabled)
            .field("item_count", &self.cache.len())
            .field("failed_count", &self.failed.len())
            .field("memory_usage", &self.current_bytes)
            .field("max_bytes", &self.config.max_bytes)
            .field("max_items", &self.config.max_items)
            .field("look_ahead", &self.config.look_ahead)
            .field("stats", &self.stats)
            .finish()
    }
}
