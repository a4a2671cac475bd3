//! State management module
//!
//! This module contains the core data structures of the timeline engine:
//! - ProjectState: timeline layout plus playhead and zoom
//! - Track / Clip: layers and the time ranges placed on them
//! - ProjectDocument: what gets written to an `.lf` file
//! - SelectionState: the clip currently selected in the editor

mod project;
mod selection;

pub use project::*;
pub use selection::*;
