//! Clip source files.
//!
//! Text and code clips are backed by markup files under `scenes/`; media
//! clips point at files under `assets/`. A clip's `source` is the path
//! relative to the project root.

use std::io;

use chrono::Utc;
use tracing::{debug, info};

use super::fs::ProjectFs;
use crate::constants::{ASSETS_DIR, SCENES_DIR};
use crate::state::ClipType;
use crate::utils::to_base36;

const MAX_NAME_LEN: usize = 50;

/// Where a clip's source lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Editable scene markup, read as text.
    Scene,
    /// Media file, resolved to a URL.
    Asset,
}

/// Classify a source path. Anything outside `assets/` is treated as a scene.
pub fn source_kind(source: &str) -> SourceKind {
    match source.split_once('/') {
        Some((dir, _)) if dir == ASSETS_DIR => SourceKind::Asset,
        Some((dir, _)) if dir == SCENES_DIR => SourceKind::Scene,
        _ => SourceKind::Scene,
    }
}

/// Lowercase, whitespace runs to `_`, only `[a-z0-9_-]` kept, at most 50 chars.
pub fn sanitize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_space = false;
    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-' {
            out.push(c);
        }
    }
    out.chars().take(MAX_NAME_LEN).collect()
}

/// Fresh source path for a new clip, e.g. `scenes/title_lx2k9a1b.tsx`.
pub fn generate_source_path(clip_type: ClipType, name: &str) -> String {
    let timestamp = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
    let unique = format!("{}_{}", sanitize_name(name), to_base36(timestamp));
    match clip_type {
        ClipType::Text | ClipType::Code => format!("{SCENES_DIR}/{unique}.tsx"),
        ClipType::Image => format!("{ASSETS_DIR}/images/{unique}.png"),
        ClipType::Video => format!("{ASSETS_DIR}/videos/{unique}.mp4"),
        ClipType::Audio => format!("{ASSETS_DIR}/audio/{unique}.mp3"),
    }
}

/// Markup written for a scene clip whose file does not exist yet.
pub fn generate_default_content(clip_type: ClipType, name: &str) -> String {
    match clip_type {
        ClipType::Text => format!(
            r#"<!-- {name} - LyraFrame Text Element -->
<div class="lyra-text" style="
  width: 100%;
  height: 100%;
  display: flex;
  align-items: center;
  justify-content: center;
">
  <h1 style="
    color: #ffffff;
    font-size: 4rem;
    font-weight: bold;
    font-family: system-ui, -apple-system, sans-serif;
    text-align: center;
    text-shadow: 0 0 20px rgba(244, 114, 182, 0.8);
    margin: 0;
    padding: 0 2rem;
  ">{name}</h1>
</div>"#
        ),
        ClipType::Code => format!(
            r#"<!-- {name} - Generated by LyraFrame -->
<div style="
  width: 100%;
  height: 100%;
  display: flex;
  align-items: center;
  justify-content: center;
">
  <h1 style="
    color: white;
    font-size: 3rem;
  ">{name}</h1>
</div>"#
        ),
        ClipType::Image | ClipType::Video | ClipType::Audio => String::new(),
    }
}

/// Read a scene file. `Ok(None)` when it does not exist.
pub fn load_scene_content(fs: &dyn ProjectFs, source: &str) -> io::Result<Option<String>> {
    match fs.read(source) {
        Ok(bytes) => String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

pub fn create_scene_file(fs: &dyn ProjectFs, source: &str, content: &str) -> io::Result<()> {
    fs.write(source, content.as_bytes())?;
    info!(source, "Created scene file");
    Ok(())
}

pub fn save_scene_content(fs: &dyn ProjectFs, source: &str, content: &str) -> io::Result<()> {
    fs.write(source, content.as_bytes())?;
    debug!(source, len = content.len(), "Saved scene file");
    Ok(())
}

pub fn delete_scene_file(fs: &dyn ProjectFs, source: &str) -> io::Result<()> {
    fs.remove_file(source)?;
    info!(source, "Deleted scene file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fs::memory::MemoryFs;

    #[test]
    fn test_source_kind() {
        assert_eq!(source_kind("scenes/a.tsx"), SourceKind::Scene);
        assert_eq!(source_kind("assets/videos/a.mp4"), SourceKind::Asset);
        assert_eq!(source_kind("a.tsx"), SourceKind::Scene);
        assert_eq!(source_kind("assetsx/a.png"), SourceKind::Scene);
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("Hello   World!"), "hello_world");
        assert_eq!(sanitize_name("Intro-Scene_2"), "intro-scene_2");
        assert_eq!(sanitize_name("标题"), "");
        assert_eq!(sanitize_name(&"x".repeat(80)).len(), 50);
    }

    #[test]
    fn test_generate_source_path() {
        let path = generate_source_path(ClipType::Text, "My Title");
        assert!(path.starts_with("scenes/my_title_"));
        assert!(path.ends_with(".tsx"));

        assert!(generate_source_path(ClipType::Image, "a").starts_with("assets/images/a_"));
        assert!(generate_source_path(ClipType::Video, "a").ends_with(".mp4"));
        assert!(generate_source_path(ClipType::Audio, "a").starts_with("assets/audio/"));
        assert_eq!(
            source_kind(&generate_source_path(ClipType::Code, "x")),
            SourceKind::Scene
        );
    }

    #[test]
    fn test_default_content() {
        assert!(generate_default_content(ClipType::Text, "Hi").contains(">Hi</h1>"));
        assert!(generate_default_content(ClipType::Code, "Hi").contains("Generated by LyraFrame"));
        assert!(generate_default_content(ClipType::Video, "Hi").is_empty());
    }

    #[test]
    fn test_scene_file_lifecycle() {
        let fs = MemoryFs::new();
        assert_eq!(load_scene_content(&fs, "scenes/a.tsx").unwrap(), None);

        create_scene_file(&fs, "scenes/a.tsx", "<a />").unwrap();
        assert_eq!(
            load_scene_content(&fs, "scenes/a.tsx").unwrap().as_deref(),
            Some("<a />")
        );

        save_scene_content(&fs, "scenes/a.tsx", "<b />").unwrap();
        assert_eq!(fs.text("scenes/a.tsx").as_deref(), Some("<b />"));

        delete_scene_file(&fs, "scenes/a.tsx").unwrap();
        assert!(delete_scene_file(&fs, "scenes/a.tsx").is_err());
    }

    #[test]
    fn test_non_utf8_scene_is_invalid_data() {
        let fs = MemoryFs::new().with_file("scenes/bad.tsx", vec![0xff, 0xfe]);
        let err = load_scene_content(&fs, "scenes/bad.tsx").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
