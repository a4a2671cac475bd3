//! Engine configuration.
//!
//! Every field has a default taken from [`crate::constants`], so an empty JSON
//! object (or no config at all) yields a working engine.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{AUTOSAVE_DEBOUNCE_MS, PLAYBACK_FRAME_INTERVAL_MS};

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub playback: PlaybackConfig,
    pub sync: SyncConfig,
}

/// Playback clock settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlaybackConfig {
    /// Delay between two playhead advances, in milliseconds.
    pub frame_interval_ms: u64,
}

/// Load/autosave settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncConfig {
    /// Quiet period after the last edit before the project is written.
    pub autosave_debounce_ms: u64,
    pub autosave_enabled: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: PLAYBACK_FRAME_INTERVAL_MS,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            autosave_debounce_ms: AUTOSAVE_DEBOUNCE_MS,
            autosave_enabled: true,
        }
    }
}

impl PlaybackConfig {
    pub fn frame_interval(&self) -> Duration {
        // A zero interval would spin the clock task.
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

impl SyncConfig {
    pub fn autosave_debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }
}

impl EngineConfig {
    /// Parse a JSON config; absent fields keep their defaults.
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
