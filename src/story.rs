// SPDX-License-Identifier: MPL-2.0
//! Data model for story collections and their items.
//!
//! Collections are supplied read-only by the caller (fetching and formatting
//! happen upstream); the engine only ever walks them. The single structural
//! invariant is that a collection holds at least one item, enforced by
//! [`StoryCollection::new`]. Item order is fixed for the duration of a
//! playback session.

use crate::config::defaults::DEFAULT_ITEM_DURATION_MS;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The author of a story collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryAuthor {
    pub id: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

/// Kind of media carried by a story item. Only images have playback
/// semantics today; the enum leaves room for the rest of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
}

/// One selectable option in a poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollOption {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub vote_count: u64,
}

/// A poll attached to a story item.
///
/// Votes are session-local: the engine counts them in memory and leaves
/// persistence to the caller's data layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poll {
    pub id: String,
    pub question: String,
    pub options: Vec<PollOption>,
}

impl Poll {
    /// Registers a vote for the given option.
    ///
    /// Returns `true` if the option exists and the vote was counted.
    pub fn vote(&mut self, option_id: &str) -> bool {
        if let Some(option) = self.options.iter_mut().find(|o| o.id == option_id) {
            option.vote_count += 1;
            true
        } else {
            false
        }
    }

    /// Total votes across all options.
    #[must_use]
    pub fn total_votes(&self) -> u64 {
        self.options.iter().map(|o| o.vote_count).sum()
    }
}

fn default_item_duration_ms() -> u64 {
    DEFAULT_ITEM_DURATION_MS
}

/// One piece of ephemeral media with a fixed display duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryItem {
    pub id: String,
    pub media_type: MediaType,
    pub uri: String,
    #[serde(default = "default_item_duration_ms")]
    pub duration_ms: u64,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub poll: Option<Poll>,
}

impl StoryItem {
    /// Display duration for this item, never zero.
    ///
    /// A zero duration in upstream data would produce a zero-length timer,
    /// so it falls back to the default instead.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration_or(DEFAULT_ITEM_DURATION_MS)
    }

    /// Display duration with a caller-supplied fallback for zero values,
    /// for hosts that configure their own default.
    #[must_use]
    pub fn duration_or(&self, default_ms: u64) -> Duration {
        let ms = if self.duration_ms > 0 {
            self.duration_ms
        } else {
            default_ms
        };
        Duration::from_millis(ms)
    }
}

/// An author's ordered set of story items, analogous to a reel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryCollection {
    pub id: String,
    pub author: StoryAuthor,
    pub created_at: DateTime<Utc>,
    items: Vec<StoryItem>,
    #[serde(default)]
    pub highlight: bool,
    #[serde(default)]
    pub category: Option<String>,
}

impl StoryCollection {
    /// Creates a collection, enforcing the non-empty-items invariant.
    pub fn new(
        id: impl Into<String>,
        author: StoryAuthor,
        created_at: DateTime<Utc>,
        items: Vec<StoryItem>,
    ) -> Result<Self> {
        let id = id.into();
        if items.is_empty() {
            return Err(Error::InvalidPosition(format!(
                "collection '{id}' must contain at least one item"
            )));
        }
        Ok(Self {
            id,
            author,
            created_at,
            items,
            highlight: false,
            category: None,
        })
    }

    /// Marks this collection as a highlight.
    #[must_use]
    pub fn with_highlight(mut self, highlight: bool) -> Self {
        self.highlight = highlight;
        self
    }

    /// Sets the collection's category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// The ordered items of this collection. Never empty.
    #[must_use]
    pub fn items(&self) -> &[StoryItem] {
        &self.items
    }

    /// The item at `index`, if in range.
    #[must_use]
    pub fn item(&self, index: usize) -> Option<&StoryItem> {
        self.items.get(index)
    }

    /// Number of items in this collection. At least 1.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always `false`: the constructor rejects empty collections. Present to
    /// keep clippy's `len_without_is_empty` satisfied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
