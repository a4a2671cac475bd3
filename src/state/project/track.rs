use serde::{Deserialize, Serialize};

use super::Clip;
use crate::utils::generate_id;

/// The type of track
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackType {
    /// Video track - holds visual clips (video, image, text, code)
    #[default]
    Video,
    /// Audio track - holds audio clips
    Audio,
}

/// A track in the timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Unique identifier
    pub id: String,
    /// Display name (e.g., "Track 1")
    pub name: String,
    /// Type of track
    #[serde(rename = "type")]
    pub track_type: TrackType,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    /// Layering key: higher renders on top.
    pub z_index: i64,
    /// Clips in insertion order.
    #[serde(default)]
    pub clips: Vec<Clip>,
}

impl Track {
    /// Create a new empty track
    pub fn new(name: impl Into<String>, track_type: TrackType, z_index: i64) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            track_type,
            visible: true,
            locked: false,
            z_index,
            clips: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn find_clip(&self, clip_id: &str) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == clip_id)
    }

    /// End of the last clip on the track, 0 when empty.
    pub fn content_end(&self) -> f64 {
        self.clips.iter().map(Clip::end).fold(0.0, f64::max)
    }
}

fn default_visible() -> bool {
    true
}
