// SPDX-License-Identifier: MPL-2.0
//! `storyreel` is a headless playback engine for ephemeral story reels.
//!
//! It drives timed auto-advance across ordered story collections, classifies
//! drag-to-dismiss gestures, prefetches upcoming media, and reports seen
//! state — all without owning a UI tree. Hosts render from the observable
//! state and feed pointer input and timer events back in.

#![doc(html_root_url = "https://docs.rs/storyreel/0.1.0")]

pub mod config;
pub mod error;
pub mod gesture;
pub mod playback;
pub mod prefetch;
pub mod reporting;
pub mod story;
pub mod viewer;
