//! Project data model
//!
//! Tracks, clips and the project-level settings, plus the persisted document
//! format built on top of them.

mod clip;
mod persistence;
mod project;
mod settings;
mod track;

pub use clip::{Clip, ClipInit, ClipPatch, ClipProperties, ClipType};
pub use persistence::{migrate_document, ProjectDocument};
pub use project::{LoadedProject, ProjectState};
pub use settings::AspectRatio;
pub use track::{Track, TrackType};
