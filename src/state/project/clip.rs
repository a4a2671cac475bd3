use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// What a clip renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipType {
    Video,
    Image,
    Text,
    Code,
    Audio,
}

/// Visual properties of a clip.
///
/// Keys this engine does not know about are kept in `extra` so a save never
/// drops data written by a newer editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClipProperties {
    /// CSS-like style object, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Map<String, Value>>,
    /// Opacity from 0.0 (transparent) to 1.0 (opaque).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    /// Rotation in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A clip placed on a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    /// Unique identifier
    pub id: String,
    /// The track this clip is on
    pub track_id: String,
    #[serde(rename = "type")]
    pub clip_type: ClipType,
    pub name: String,
    /// Start time in milliseconds
    pub start: f64,
    /// Duration in milliseconds
    pub duration: f64,
    /// Project-relative path the runtime content is loaded from.
    #[serde(default)]
    pub source: String,
    /// Runtime-resolved payload (scene text or asset URL). Never persisted;
    /// re-derived from `source` on every load.
    #[serde(skip)]
    pub content: Option<String>,
    #[serde(default)]
    pub properties: ClipProperties,
}

impl Clip {
    /// Get the end time of this clip
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Check if this clip overlaps with a time range
    pub fn overlaps(&self, start: f64, end: f64) -> bool {
        self.start < end && self.end() > start
    }

    /// Apply the fields set in `patch`. Returns true if anything changed.
    pub fn apply_patch(&mut self, patch: &ClipPatch) -> bool {
        let before = self.clone();

        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(clip_type) = patch.clip_type {
            self.clip_type = clip_type;
        }
        if let Some(start) = patch.start {
            if start.is_finite() {
                self.start = start.max(0.0);
            } else {
                tracing::warn!(clip_id = %self.id, start, "Ignoring non-finite clip start");
            }
        }
        if let Some(duration) = patch.duration {
            if duration.is_finite() && duration > 0.0 {
                self.duration = duration;
            } else {
                tracing::warn!(clip_id = %self.id, duration, "Ignoring non-positive clip duration");
            }
        }
        if let Some(source) = &patch.source {
            self.source = source.clone();
        }
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
        if let Some(properties) = &patch.properties {
            self.properties = properties.clone();
        }

        *self != before
    }
}

/// Fields accepted when creating a clip. The id and track are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipInit {
    pub clip_type: ClipType,
    pub name: String,
    /// `None` places the clip right after the last clip on the track.
    pub start: Option<f64>,
    pub duration: f64,
    pub source: String,
    pub content: Option<String>,
    pub properties: ClipProperties,
}

impl ClipInit {
    pub fn new(clip_type: ClipType, name: impl Into<String>, duration: f64) -> Self {
        Self {
            clip_type,
            name: name.into(),
            start: None,
            duration,
            source: String::new(),
            content: None,
            properties: ClipProperties::default(),
        }
    }

    pub fn at(mut self, start: f64) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}

/// Typed partial update for a clip.
///
/// `id` and `track_id` cannot be patched; moving a clip between tracks goes
/// through `move_clip_to_track`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipPatch {
    pub name: Option<String>,
    pub clip_type: Option<ClipType>,
    pub start: Option<f64>,
    pub duration: Option<f64>,
    pub source: Option<String>,
    /// `Some(None)` clears the runtime content.
    pub content: Option<Option<String>>,
    pub properties: Option<ClipProperties>,
}

impl ClipPatch {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn start(mut self, start: f64) -> Self {
        self.start = Some(start);
        self
    }

    pub fn duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn content(mut self, content: Option<String>) -> Self {
        self.content = Some(content);
        self
    }

    pub fn properties(mut self, properties: ClipProperties) -> Self {
        self.properties = Some(properties);
        self
    }

    /// True when the patch can move or resize the clip.
    pub fn is_geometric(&self) -> bool {
        self.start.is_some() || self.duration.is_some()
    }
}
