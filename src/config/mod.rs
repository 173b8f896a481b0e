// SPDX-License-Identifier: MPL-2.0
//! This module handles the engine's configuration, including loading and
//! saving host-tunable settings to a `settings.toml` file.
//!
//! Every field is optional in the file; a missing or malformed file yields
//! the defaults from [`defaults`].

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub mod defaults;

pub use defaults::*;

const CONFIG_FILE: &str = "settings.toml";
const APP_NAME: &str = "StoryReel";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Display duration applied to items that carry no explicit duration
    /// (in milliseconds).
    #[serde(default)]
    pub default_item_duration_ms: Option<u64>,
    /// Whether media prefetching is enabled.
    #[serde(default)]
    pub prefetch_enabled: Option<bool>,
    /// Prefetch cache byte limit.
    #[serde(default)]
    pub prefetch_max_bytes: Option<usize>,
    /// Prefetch cache item limit.
    #[serde(default)]
    pub prefetch_max_items: Option<usize>,
    /// Number of upcoming items to prefetch beyond the active one.
    #[serde(default)]
    pub prefetch_look_ahead: Option<usize>,
    /// Number of recent viewers requested per view-meta fetch.
    #[serde(default)]
    pub view_meta_limit: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_item_duration_ms: Some(DEFAULT_ITEM_DURATION_MS),
            prefetch_enabled: Some(true),
            prefetch_max_bytes: Some(DEFAULT_PREFETCH_CACHE_BYTES),
            prefetch_max_items: Some(DEFAULT_MAX_CACHED_ITEMS),
            prefetch_look_ahead: Some(DEFAULT_LOOK_AHEAD),
            view_meta_limit: Some(DEFAULT_VIEW_META_LIMIT),
        }
    }
}

impl Config {
    /// Effective view-meta limit, clamped to the supported range.
    #[must_use]
    pub fn effective_view_meta_limit(&self) -> usize {
        self.view_meta_limit
            .unwrap_or(DEFAULT_VIEW_META_LIMIT)
            .clamp(1, MAX_VIEW_META_LIMIT)
    }

    /// Effective default item duration in milliseconds (never zero).
    #[must_use]
    pub fn effective_default_duration_ms(&self) -> u64 {
        match self.default_item_duration_ms {
            Some(ms) if ms > 0 => ms,
            _ => DEFAULT_ITEM_DURATION_MS,
        }
    }
}

fn get_default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path.push(CONFIG_FILE);
        path
    })
}

pub fn load() -> Result<Config> {
    if let Some(path) = get_default_config_path() {
        if path.exists() {
            return load_from_path(&path);
        }
    }
    Ok(Config::default())
}

pub fn save(config: &Config) -> Result<()> {
    if let Some(path) = get_default_config_path() {
        return save_to_path(config, &path);
    }
    Ok(())
}

pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content).unwrap_or_default())
}

pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| crate::error::Error::Config(e.to_string()))?;
    fs::write(path, content)?;
    Ok(())
}
