//! Timeline store: the single owner of editor state.
//!
//! State lives behind a `tokio::sync::watch` channel as an `Arc` snapshot.
//! Every operation runs to completion inside `send_if_modified`, so readers
//! only ever see whole commits and subscribers are woken only on real change.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use super::playback::PlaybackClock;
use crate::config::PlaybackConfig;
use crate::state::{
    Clip, ClipInit, ClipPatch, LoadedProject, ProjectState, SelectionState, Track, TrackType,
};

/// One immutable snapshot of everything the store owns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimelineState {
    pub project: ProjectState,
    pub selection: SelectionState,
}

impl TimelineState {
    /// The selected clip, if the selection points at one that exists.
    pub fn selected_clip(&self) -> Option<&Clip> {
        self.selection
            .primary_clip()
            .and_then(|id| self.project.find_clip(id))
    }

    /// Clear a selection whose clip no longer exists.
    fn drop_stale_selection(&mut self) -> bool {
        let Some(id) = self.selection.primary_clip().map(str::to_owned) else {
            return false;
        };
        if self.project.find_clip(&id).is_some() {
            return false;
        }
        debug!(clip_id = %id, "Clearing stale selection");
        self.selection.remove_clip(&id)
    }
}

pub(crate) struct StoreInner {
    pub(crate) state: watch::Sender<Arc<TimelineState>>,
    pub(crate) clock: PlaybackClock,
    pub(crate) playback: PlaybackConfig,
}

/// Cheaply cloneable handle to a shared timeline.
#[derive(Clone)]
pub struct TimelineStore {
    pub(crate) inner: Arc<StoreInner>,
}

impl Default for TimelineStore {
    fn default() -> Self {
        Self::new(ProjectState::default())
    }
}

impl std::fmt::Debug for TimelineStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimelineStore")
            .field("state", &self.snapshot())
            .finish()
    }
}

impl TimelineStore {
    pub fn new(project: ProjectState) -> Self {
        Self::with_config(project, PlaybackConfig::default())
    }

    pub fn with_config(mut project: ProjectState, playback: PlaybackConfig) -> Self {
        // A fresh store never starts mid-playback.
        project.is_playing = false;
        let state = TimelineState {
            project,
            selection: SelectionState::default(),
        };
        let (tx, _) = watch::channel(Arc::new(state));
        Self {
            inner: Arc::new(StoreInner {
                state: tx,
                clock: PlaybackClock::default(),
                playback,
            }),
        }
    }

    /// Current snapshot. Cheap: clones an `Arc`.
    pub fn snapshot(&self) -> Arc<TimelineState> {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified after every committed change.
    pub fn subscribe(&self) -> watch::Receiver<Arc<TimelineState>> {
        self.inner.state.subscribe()
    }

    /// Run `f` against the state as one atomic commit. `f` returns its result
    /// and whether anything changed; subscribers are notified only then.
    pub(crate) fn modify<R: Default>(
        &self,
        f: impl FnOnce(&mut TimelineState) -> (R, bool),
    ) -> R {
        modify_state(&self.inner, f)
    }

    // =========================================================================
    // Tracks & clips
    // =========================================================================

    /// Append a track above all others. Returns the new track id.
    pub fn add_track(&self, track_type: TrackType) -> String {
        self.modify(|state| (state.project.add_track(track_type), true))
    }

    pub fn remove_track(&self, track_id: &str) -> bool {
        self.modify(|state| {
            let removed = state.project.remove_track(track_id);
            (removed, removed)
        })
    }

    /// Append a clip to a track. Returns the new clip id, `None` if the track
    /// does not exist.
    pub fn add_clip(&self, track_id: &str, init: ClipInit) -> Option<String> {
        self.modify(|state| {
            let id = state.project.add_clip(track_id, init);
            let changed = id.is_some();
            (id, changed)
        })
    }

    pub fn remove_clip(&self, clip_id: &str) -> bool {
        self.modify(|state| {
            let removed = state.project.remove_clip(clip_id);
            (removed, removed)
        })
    }

    /// Remove the selected clip, if any.
    pub fn delete_selected_clip(&self) -> bool {
        self.modify(|state| {
            let Some(clip_id) = state.selection.primary_clip().map(str::to_owned) else {
                return (false, false);
            };
            let removed = state.project.remove_clip(&clip_id);
            (removed, removed)
        })
    }

    /// Shallow edit with no collision handling (name, content, properties).
    pub fn update_clip(&self, clip_id: &str, patch: &ClipPatch) -> bool {
        if patch.is_geometric() {
            debug!(clip_id, "update_clip: geometric edit applied without collision checks");
        }
        self.modify(|state| {
            let changed = state.project.update_clip(clip_id, patch);
            (changed, changed)
        })
    }

    /// Edit used by drag and resize: overlapped siblings are trimmed or evicted.
    pub fn update_clip_with_collision(&self, clip_id: &str, patch: &ClipPatch) -> bool {
        self.modify(|state| {
            let changed = state.project.update_clip_with_collision(clip_id, patch);
            (changed, changed)
        })
    }

    pub fn move_clip_to_track(&self, clip_id: &str, target_track_id: &str, new_start: f64) -> bool {
        self.modify(|state| {
            let moved = state
                .project
                .move_clip_to_track(clip_id, target_track_id, new_start);
            (moved, moved)
        })
    }

    // =========================================================================
    // Selection & lookups
    // =========================================================================

    /// Select a clip by id, or clear the selection with `None`. Unknown ids
    /// are ignored.
    pub fn select_clip(&self, clip_id: Option<&str>) -> bool {
        self.modify(|state| {
            if let Some(id) = clip_id {
                if state.project.find_clip(id).is_none() {
                    warn!(clip_id = id, "select_clip: clip not found");
                    return (false, false);
                }
            }
            let next = clip_id.map(str::to_owned);
            if state.selection.selected_clip_id == next {
                return (false, false);
            }
            state.selection.select_clip(next);
            (true, true)
        })
    }

    pub fn selected_clip(&self) -> Option<Clip> {
        self.snapshot().selected_clip().cloned()
    }

    pub fn track_by_clip_id(&self, clip_id: &str) -> Option<Track> {
        self.snapshot().project.track_by_clip_id(clip_id).cloned()
    }

    // =========================================================================
    // Playhead, zoom & loading
    // =========================================================================

    /// Move the playhead, clamped to `[0, duration]`. Allowed while playing.
    pub fn set_playhead(&self, time_ms: f64) -> bool {
        self.modify(|state| {
            let moved = state.project.set_playhead(time_ms);
            (moved, moved)
        })
    }

    pub fn set_zoom(&self, zoom: f64) -> bool {
        self.modify(|state| {
            let changed = state.project.set_zoom(zoom);
            (changed, changed)
        })
    }

    pub fn is_playing(&self) -> bool {
        self.inner.state.borrow().project.is_playing
    }

    /// Replace the persisted project fields in one commit.
    pub fn load_project(&self, loaded: LoadedProject) {
        self.modify(|state| {
            state.project.apply_loaded(loaded);
            debug!(
                name = %state.project.name,
                tracks = state.project.tracks.len(),
                "Project loaded into store"
            );
            ((), true)
        })
    }
}

pub(crate) fn modify_state<R: Default>(
    inner: &StoreInner,
    f: impl FnOnce(&mut TimelineState) -> (R, bool),
) -> R {
    let mut result = R::default();
    inner.state.send_if_modified(|current| {
        let state = Arc::make_mut(current);
        let (value, changed) = f(state);
        result = value;
        let cleared = state.drop_stale_selection();
        changed || cleared
    });
    result
}

impl Drop for StoreInner {
    fn drop(&mut self) {
        self.clock.cancel();
    }
}
