//! LyraFrame timeline engine.
//!
//! Track and clip layout with overlap resolution, an observable store with a
//! playback clock, the `.lf` project container and project directory sync.

pub mod config;
pub mod constants;
pub mod core;
pub mod error;
pub mod state;
pub mod utils;

pub use config::{EngineConfig, PlaybackConfig, SyncConfig};
pub use core::fs::{LocalFs, ProjectFs};
pub use core::lf_format::{decode_lf_format, encode_lf_format, is_valid_lf_file};
pub use core::project_sync::ProjectSync;
pub use core::store::{TimelineState, TimelineStore};
pub use error::{FormatError, SyncError};
