//! Shared engine constants: track bounds, project defaults and timing.
//! Collected here so the store, the normalizer and project sync agree on them.

/// Fewest tracks a normalized track list may hold.
pub const MIN_TRACKS: usize = 2;
/// Most tracks a normalized track list may hold. Also the zIndex of the top track.
pub const MAX_TRACKS: usize = 50;

pub const DEFAULT_DURATION_MS: f64 = 30_000.0;
/// Length written into the document of a freshly created project.
pub const NEW_PROJECT_DURATION_MS: f64 = 10_000.0;
pub const DEFAULT_FPS: f64 = 30.0;
pub const DEFAULT_ASPECT_RATIO: f64 = 16.0 / 9.0;
pub const DEFAULT_PROJECT_ID: &str = "project-1";
pub const DEFAULT_PROJECT_NAME: &str = "Untitled Project";

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;

/// One display refresh at ~60 Hz.
pub const PLAYBACK_FRAME_INTERVAL_MS: u64 = 16;
/// Quiet period before a burst of edits is written to disk.
pub const AUTOSAVE_DEBOUNCE_MS: u64 = 1000;

pub const PROJECT_FILE_EXTENSION: &str = "lf";
/// Schema version written into the persisted document.
pub const DOCUMENT_VERSION: &str = "1.0.0";

pub const SCENES_DIR: &str = "scenes";
pub const ASSETS_DIR: &str = "assets";
