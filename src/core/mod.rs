pub mod assets;
pub mod fs;
pub mod lf_format;
mod playback;
pub mod project_sync;
pub mod scene_files;
pub mod store;
pub mod timeline_utils;
