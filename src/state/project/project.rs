use tracing::{debug, warn};

use super::{Clip, ClipInit, ClipPatch, Track, TrackType};
use crate::constants::{
    DEFAULT_ASPECT_RATIO, DEFAULT_DURATION_MS, DEFAULT_FPS, DEFAULT_PROJECT_ID,
    DEFAULT_PROJECT_NAME, MAX_TRACKS, MAX_ZOOM, MIN_ZOOM,
};
use crate::core::timeline_utils::{normalize_tracks, resolve_overlaps};
use crate::utils::generate_id;

/// The editable project: timeline layout plus playhead state.
///
/// Mutations return `false` (and log) when they reference an unknown id
/// instead of failing; interactive edits are best effort.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectState {
    pub id: String,
    pub name: String,
    /// Total length in milliseconds
    pub duration: f64,
    pub fps: f64,
    /// Width divided by height
    pub aspect_ratio: f64,
    /// Tracks, top (highest zIndex) first after normalization
    pub tracks: Vec<Track>,
    /// Playhead in milliseconds, always within `[0, duration]`
    pub current_time: f64,
    pub is_playing: bool,
    pub zoom: f64,
}

/// Project fields replaced in one step when a file is opened.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedProject {
    pub name: String,
    pub duration: f64,
    pub fps: f64,
    pub aspect_ratio: f64,
    /// `None` keeps the tracks already in the store.
    pub tracks: Option<Vec<Track>>,
}

impl Default for ProjectState {
    fn default() -> Self {
        let mut top = Track::new("Track 1", TrackType::Video, MAX_TRACKS as i64);
        top.id = "track-1".to_string();
        let mut second = Track::new("Track 2", TrackType::Video, MAX_TRACKS as i64 - 1);
        second.id = "track-2".to_string();

        Self {
            id: DEFAULT_PROJECT_ID.to_string(),
            name: DEFAULT_PROJECT_NAME.to_string(),
            duration: DEFAULT_DURATION_MS,
            fps: DEFAULT_FPS,
            aspect_ratio: DEFAULT_ASPECT_RATIO,
            tracks: vec![top, second],
            current_time: 0.0,
            is_playing: false,
            zoom: 1.0,
        }
    }
}

impl ProjectState {
    /// Create an empty project (no tracks) with default settings
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tracks: Vec::new(),
            ..Default::default()
        }
    }

    /// Find a track by ID
    pub fn find_track(&self, id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// Find a clip by ID on any track
    pub fn find_clip(&self, clip_id: &str) -> Option<&Clip> {
        self.tracks.iter().find_map(|t| t.find_clip(clip_id))
    }

    /// Track currently holding the clip
    pub fn track_by_clip_id(&self, clip_id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.find_clip(clip_id).is_some())
    }

    /// (track index, clip index) of a clip
    fn locate_clip(&self, clip_id: &str) -> Option<(usize, usize)> {
        self.tracks.iter().enumerate().find_map(|(ti, track)| {
            track
                .clips
                .iter()
                .position(|c| c.id == clip_id)
                .map(|ci| (ti, ci))
        })
    }

    /// Append a new empty track above all existing ones. Returns its id.
    pub fn add_track(&mut self, track_type: TrackType) -> String {
        let z_index = self
            .tracks
            .iter()
            .map(|t| t.z_index)
            .max()
            .map(|z| z + 1)
            .unwrap_or(MAX_TRACKS as i64);
        let track = Track::new(format!("Track {}", self.tracks.len() + 1), track_type, z_index);
        let id = track.id.clone();
        debug!(track_id = %id, ?track_type, z_index, "Track added");
        self.tracks.push(track);
        id
    }

    /// Append a clip to a track. No collision resolution happens here; the
    /// caller picks a free start. Returns the new clip id.
    pub fn add_clip(&mut self, track_id: &str, init: ClipInit) -> Option<String> {
        let Some(track) = self.tracks.iter_mut().find(|t| t.id == track_id) else {
            warn!(track_id, "add_clip: track not found");
            return None;
        };

        if !init.duration.is_finite() || init.duration <= 0.0 {
            warn!(track_id, duration = init.duration, "add_clip: duration must be positive");
            return None;
        }

        let start = match init.start {
            Some(start) if start.is_finite() => start.max(0.0),
            Some(start) => {
                warn!(track_id, start, "add_clip: non-finite start");
                return None;
            }
            None => track.content_end(),
        };

        let clip = Clip {
            id: generate_id(),
            track_id: track_id.to_string(),
            clip_type: init.clip_type,
            name: init.name,
            start,
            duration: init.duration,
            source: init.source,
            content: init.content,
            properties: init.properties,
        };
        let id = clip.id.clone();
        debug!(clip_id = %id, track_id, start, duration = clip.duration, "Clip added");
        track.clips.push(clip);

        self.normalize();
        Some(id)
    }

    /// Remove a clip from whichever track holds it.
    pub fn remove_clip(&mut self, clip_id: &str) -> bool {
        let Some((ti, ci)) = self.locate_clip(clip_id) else {
            warn!(clip_id, "remove_clip: clip not found");
            return false;
        };
        self.tracks[ti].clips.remove(ci);
        debug!(clip_id, "Clip removed");
        self.normalize();
        true
    }

    /// Remove a track together with its clips.
    pub fn remove_track(&mut self, track_id: &str) -> bool {
        let Some(index) = self.tracks.iter().position(|t| t.id == track_id) else {
            warn!(track_id, "remove_track: track not found");
            return false;
        };
        let removed = self.tracks.remove(index);
        debug!(track_id, clips = removed.clips.len(), "Track removed");
        self.normalize();
        true
    }

    /// Apply a non-geometric edit without touching sibling clips.
    pub fn update_clip(&mut self, clip_id: &str, patch: &ClipPatch) -> bool {
        let Some((ti, ci)) = self.locate_clip(clip_id) else {
            warn!(clip_id, "update_clip: clip not found");
            return false;
        };
        self.tracks[ti].clips[ci].apply_patch(patch)
    }

    /// Apply an edit, then trim or evict siblings the clip now overlaps.
    pub fn update_clip_with_collision(&mut self, clip_id: &str, patch: &ClipPatch) -> bool {
        let Some((ti, ci)) = self.locate_clip(clip_id) else {
            warn!(clip_id, "update_clip_with_collision: clip not found");
            return false;
        };

        let track = &mut self.tracks[ti];
        let mut updated = track.clips[ci].clone();
        updated.apply_patch(patch);

        let mut resolved = resolve_overlaps(&updated, &track.clips).into_iter().peekable();
        let mut clips = Vec::with_capacity(track.clips.len());
        for original in &track.clips {
            if original.id == updated.id {
                clips.push(updated.clone());
            } else if let Some(kept) = resolved.next_if(|c| c.id == original.id) {
                clips.push(kept);
            }
        }

        if clips == track.clips {
            return false;
        }
        debug!(
            clip_id,
            start = updated.start,
            duration = updated.duration,
            siblings_before = track.clips.len() - 1,
            siblings_after = clips.len() - 1,
            "Clip updated with collision"
        );
        track.clips = clips;
        true
    }

    /// Move a clip onto another track at `new_start`, evicting what it covers there.
    pub fn move_clip_to_track(&mut self, clip_id: &str, target_track_id: &str, new_start: f64) -> bool {
        let Some((ti, ci)) = self.locate_clip(clip_id) else {
            warn!(clip_id, "move_clip_to_track: clip not found");
            return false;
        };
        let Some(dest) = self.tracks.iter().position(|t| t.id == target_track_id) else {
            warn!(clip_id, target_track_id, "move_clip_to_track: target track not found");
            return false;
        };
        if !new_start.is_finite() {
            warn!(clip_id, new_start, "move_clip_to_track: non-finite start");
            return false;
        }

        if ti == dest {
            return self.update_clip_with_collision(clip_id, &ClipPatch::default().start(new_start));
        }

        let mut moved = self.tracks[ti].clips.remove(ci);
        moved.track_id = target_track_id.to_string();
        moved.start = new_start.max(0.0);

        let dest_track = &mut self.tracks[dest];
        let mut clips = resolve_overlaps(&moved, &dest_track.clips);
        debug!(
            clip_id,
            target_track_id,
            start = moved.start,
            evicted = dest_track.clips.len() - clips.len(),
            "Clip moved to track"
        );
        clips.push(moved);
        dest_track.clips = clips;

        self.normalize();
        true
    }

    /// Move the playhead, clamped to `[0, duration]`. Returns true if it moved.
    pub fn set_playhead(&mut self, time: f64) -> bool {
        if !time.is_finite() {
            warn!(time, "set_playhead: non-finite time");
            return false;
        }
        let clamped = time.clamp(0.0, self.duration.max(0.0));
        if clamped == self.current_time {
            return false;
        }
        self.current_time = clamped;
        true
    }

    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        if !zoom.is_finite() {
            warn!(zoom, "set_zoom: non-finite zoom");
            return false;
        }
        let clamped = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        if clamped == self.zoom {
            return false;
        }
        self.zoom = clamped;
        true
    }

    /// Replace the persisted fields with a freshly loaded project.
    pub fn apply_loaded(&mut self, loaded: LoadedProject) {
        self.name = loaded.name;
        self.duration = loaded.duration;
        self.fps = loaded.fps;
        self.aspect_ratio = loaded.aspect_ratio;
        if let Some(tracks) = loaded.tracks {
            self.tracks = normalize_tracks(tracks);
        }
        self.current_time = self.current_time.clamp(0.0, self.duration.max(0.0));
    }

    /// Canonicalize the track list in place.
    pub fn normalize(&mut self) {
        let tracks = std::mem::take(&mut self.tracks);
        self.tracks = normalize_tracks(tracks);
    }
}
