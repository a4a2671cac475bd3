//! On-disk project document and its migration.
//!
//! Documents are read as raw JSON first so that older or hand-edited files
//! can be patched up before typed decoding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::{AspectRatio, LoadedProject, ProjectState, Track};
use crate::constants::{
    DEFAULT_ASPECT_RATIO, DEFAULT_DURATION_MS, DEFAULT_FPS, DEFAULT_PROJECT_NAME,
    DOCUMENT_VERSION, MAX_TRACKS,
};
use crate::core::lf_format::{
    decode_lf_payload, encode_lf_format, is_valid_lf_file, FORMAT_VERSION,
};
use crate::error::{SyncError, SyncResult};
use crate::utils::generate_id;

/// The persisted form of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDocument {
    pub name: String,
    pub version: String,
    pub aspect_ratio: AspectRatio,
    pub fps: f64,
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

impl ProjectDocument {
    /// Decode a project file. `.lf` containers are unwrapped; anything without
    /// the `LYRA` header is read as plain JSON.
    pub fn from_bytes(bytes: &[u8]) -> SyncResult<Self> {
        let (value, container_version) = if is_valid_lf_file(bytes) {
            let (header, value) = decode_lf_payload(bytes)?;
            (value, header.version)
        } else {
            debug!(len = bytes.len(), "No .lf header, reading plain JSON");
            (serde_json::from_slice(bytes)?, FORMAT_VERSION)
        };
        Self::from_value(value, container_version)
    }

    /// Migrate and decode an already parsed document.
    pub fn from_value(mut value: Value, container_version: u8) -> SyncResult<Self> {
        migrate_document(&mut value, container_version)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Encode as an `.lf` container.
    pub fn to_bytes(&self) -> SyncResult<Vec<u8>> {
        Ok(encode_lf_format(self)?)
    }

    /// Project fields to commit to the store. A document without tracks
    /// yields `tracks: None` so the store keeps what it has.
    pub fn into_loaded(self) -> LoadedProject {
        LoadedProject {
            name: self.name,
            duration: self.duration,
            fps: self.fps,
            aspect_ratio: self.aspect_ratio.value(),
            tracks: (!self.tracks.is_empty()).then_some(self.tracks),
        }
    }
}

impl ProjectState {
    /// Snapshot the persisted fields. Runtime clip content is dropped.
    pub fn to_document(&self, modified: DateTime<Utc>) -> ProjectDocument {
        let mut tracks = self.tracks.clone();
        for clip in tracks.iter_mut().flat_map(|track| track.clips.iter_mut()) {
            clip.content = None;
        }

        ProjectDocument {
            name: self.name.clone(),
            version: DOCUMENT_VERSION.to_string(),
            aspect_ratio: AspectRatio::Ratio(self.aspect_ratio),
            fps: self.fps,
            duration: self.duration,
            modified: Some(modified),
            tracks,
        }
    }
}

/// Bring a raw document up to the current schema in place.
pub fn migrate_document(value: &mut Value, container_version: u8) -> SyncResult<()> {
    let obj = value
        .as_object_mut()
        .ok_or_else(|| SyncError::InvalidDocument {
            reason: "project root must be a JSON object".into(),
        })?;

    match container_version {
        0 => {
            info!(from = 0, to = FORMAT_VERSION, "Migrating project document");
            fill_missing_fields(obj)?;
        }
        1 => fill_missing_fields(obj)?,
        other => {
            return Err(SyncError::Migration {
                from: other,
                reason: format!("no migration path from container version {other}"),
            });
        }
    }
    Ok(())
}

fn fill_missing_fields(obj: &mut Map<String, Value>) -> SyncResult<()> {
    if !obj.get("name").is_some_and(Value::is_string) {
        obj.insert("name".into(), Value::from(DEFAULT_PROJECT_NAME));
    }
    if !obj.get("version").is_some_and(Value::is_string) {
        obj.insert("version".into(), Value::from(DOCUMENT_VERSION));
    }
    // An unreadable timestamp is dropped.
    let modified_ok = match obj.get("modified") {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.parse::<DateTime<Utc>>().is_ok(),
        Some(_) => false,
    };
    if !modified_ok {
        debug!(modified = ?obj.get("modified"), "Dropping unreadable modified timestamp");
        obj.insert("modified".into(), Value::Null);
    }
    if !obj.get("aspectRatio").is_some_and(|v| v.is_number() || v.is_string()) {
        obj.insert("aspectRatio".into(), Value::from(DEFAULT_ASPECT_RATIO));
    }
    // Zero counts as missing.
    if !is_positive_number(obj.get("duration")) {
        obj.insert("duration".into(), Value::from(DEFAULT_DURATION_MS));
    }
    if !is_positive_number(obj.get("fps")) {
        obj.insert("fps".into(), Value::from(DEFAULT_FPS));
    }

    let tracks = obj
        .entry("tracks")
        .and_modify(|tracks| {
            if tracks.is_null() {
                *tracks = Value::Array(Vec::new());
            }
        })
        .or_insert_with(|| Value::Array(Vec::new()));
    let tracks = tracks
        .as_array_mut()
        .ok_or_else(|| SyncError::InvalidDocument {
            reason: "tracks must be an array".into(),
        })?;

    for (position, track) in tracks.iter_mut().enumerate() {
        let track = track
            .as_object_mut()
            .ok_or_else(|| SyncError::InvalidDocument {
                reason: format!("track {position} is not an object"),
            })?;
        fill_track_fields(track, position)?;
    }
    Ok(())
}

fn fill_track_fields(track: &mut Map<String, Value>, position: usize) -> SyncResult<()> {
    let track_id = match track.get("id").and_then(Value::as_str) {
        Some(id) => id.to_string(),
        None => {
            let id = generate_id();
            track.insert("id".into(), Value::from(id.clone()));
            id
        }
    };

    track
        .entry("name")
        .or_insert_with(|| Value::from(format!("Track {}", position + 1)));
    track.entry("type").or_insert_with(|| Value::from("video"));
    track
        .entry("zIndex")
        .or_insert_with(|| Value::from(MAX_TRACKS as i64 - position as i64));
    track.entry("visible").or_insert(Value::Bool(true));
    track.entry("locked").or_insert(Value::Bool(false));

    let clips = track
        .entry("clips")
        .or_insert_with(|| Value::Array(Vec::new()))
        .as_array_mut()
        .ok_or_else(|| SyncError::InvalidDocument {
            reason: format!("clips of track {track_id} must be an array"),
        })?;

    for clip in clips.iter_mut() {
        let Some(clip) = clip.as_object_mut() else {
            return Err(SyncError::InvalidDocument {
                reason: format!("track {track_id} holds a clip that is not an object"),
            });
        };
        clip.entry("trackId")
            .or_insert_with(|| Value::from(track_id.clone()));
        clip.entry("properties")
            .or_insert_with(|| Value::Object(Map::new()));
        clip.entry("source").or_insert_with(|| Value::from(""));
    }
    Ok(())
}

fn is_positive_number(value: Option<&Value>) -> bool {
    value.and_then(Value::as_f64).is_some_and(|n| n > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ClipInit, ClipType, TrackType};
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_migration_fills_defaults() {
        let mut value = json!({
            "name": "Demo",
            "duration": 0,
            "tracks": [{
                "id": "t1",
                "name": "Main",
                "type": "video",
                "clips": [{"id": "c1", "type": "text", "name": "Title", "start": 0, "duration": 1000}]
            }]
        });
        migrate_document(&mut value, 1).unwrap();

        assert_eq!(value["duration"], json!(30000.0));
        assert_eq!(value["fps"], json!(30.0));
        assert_eq!(value["version"], json!("1.0.0"));
        assert_eq!(value["tracks"][0]["zIndex"], json!(50));
        assert_eq!(value["tracks"][0]["visible"], json!(true));
        assert_eq!(value["tracks"][0]["locked"], json!(false));
        let clip = &value["tracks"][0]["clips"][0];
        assert_eq!(clip["trackId"], json!("t1"));
        assert_eq!(clip["properties"], json!({}));
        assert_eq!(clip["source"], json!(""));
    }

    #[test]
    fn test_migration_keeps_present_fields() {
        let mut value = json!({
            "name": "Keep",
            "version": "1.0.0",
            "aspectRatio": "4:3",
            "duration": 12000,
            "fps": 24,
            "tracks": [{"id": "t", "name": "A", "type": "audio", "zIndex": 7, "visible": false, "clips": []}]
        });
        migrate_document(&mut value, 1).unwrap();
        assert_eq!(value["duration"], json!(12000));
        assert_eq!(value["fps"], json!(24));
        assert_eq!(value["aspectRatio"], json!("4:3"));
        assert_eq!(value["tracks"][0]["zIndex"], json!(7));
        assert_eq!(value["tracks"][0]["visible"], json!(false));
    }

    #[test]
    fn test_numeric_version_is_replaced() {
        let mut value = json!({"name": "x", "version": 1, "tracks": []});
        migrate_document(&mut value, 1).unwrap();
        assert_eq!(value["version"], json!(DOCUMENT_VERSION));

        let doc = ProjectDocument::from_bytes(br#"{"name":"x","version":1,"tracks":[]}"#).unwrap();
        assert_eq!(doc.name, "x");
        assert_eq!(doc.version, DOCUMENT_VERSION);
    }

    #[test]
    fn test_unreadable_modified_is_dropped() {
        let doc = ProjectDocument::from_bytes(
            br#"{"name":"x","modified":"Tue May 01 2024","tracks":[]}"#,
        )
        .unwrap();
        assert_eq!(doc.name, "x");
        assert!(doc.modified.is_none());

        let doc = ProjectDocument::from_bytes(br#"{"name":"x","modified":42}"#).unwrap();
        assert!(doc.modified.is_none());

        let doc = ProjectDocument::from_bytes(
            br#"{"name":"x","modified":"2024-05-01T12:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(
            doc.modified,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_migration_rejects_bad_roots() {
        let mut value = json!([1, 2, 3]);
        assert!(matches!(
            migrate_document(&mut value, 1),
            Err(SyncError::InvalidDocument { .. })
        ));

        let mut value = json!({"tracks": "nope"});
        assert!(matches!(
            migrate_document(&mut value, 1),
            Err(SyncError::InvalidDocument { .. })
        ));

        let mut value = json!({});
        assert!(matches!(
            migrate_document(&mut value, 9),
            Err(SyncError::Migration { from: 9, .. })
        ));
    }

    #[test]
    fn test_missing_tracks_load_as_none() {
        let doc = ProjectDocument::from_bytes(br#"{"name":"Bare"}"#).unwrap();
        assert!(doc.tracks.is_empty());
        assert_eq!(doc.duration, 30000.0);

        let loaded = doc.into_loaded();
        assert_eq!(loaded.name, "Bare");
        assert!(loaded.tracks.is_none());
        assert!((loaded.aspect_ratio - 16.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_binary_and_json_decode_agree() {
        let mut project = ProjectState::default();
        let track_id = project.tracks[0].id.clone();
        project
            .add_clip(
                &track_id,
                ClipInit::new(ClipType::Text, "Intro", 2000.0).with_content("<Intro />"),
            )
            .unwrap();

        let modified = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let doc = project.to_document(modified);
        assert!(doc.tracks[0].clips[0].content.is_none());

        let from_lf = ProjectDocument::from_bytes(&doc.to_bytes().unwrap()).unwrap();
        let from_json =
            ProjectDocument::from_bytes(&serde_json::to_vec(&doc).unwrap()).unwrap();
        assert_eq!(from_lf, doc);
        assert_eq!(from_json, doc);
    }

    #[test]
    fn test_content_never_persisted() {
        let mut project = ProjectState::default();
        let track_id = project.tracks[0].id.clone();
        project.add_clip(
            &track_id,
            ClipInit::new(ClipType::Code, "Scene", 1000.0).with_content("secret"),
        );
        let json = serde_json::to_string(&project.to_document(Utc::now())).unwrap();
        assert!(!json.contains("secret"));
        assert!(!json.contains("\"content\""));
    }

    #[test]
    fn test_document_uses_camel_case() {
        let project = ProjectState::default();
        let value = serde_json::to_value(project.to_document(Utc::now())).unwrap();
        assert!(value.get("aspectRatio").is_some());
        assert_eq!(value["tracks"][0]["zIndex"], json!(50));
        assert_eq!(value["tracks"][0]["type"], json!("video"));
        assert_eq!(
            serde_json::from_value::<TrackType>(json!("audio")).unwrap(),
            TrackType::Audio
        );
    }
}
