//! Keeps a project directory and a [`TimelineStore`] in step.
//!
//! `load` reads the `.lf` file into the store. The autosave task watches
//! store snapshots and writes the project back after a quiet period. A load
//! guard keeps autosave away from the store until the initial load is done.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::assets::{AssetResolver, CachedAssetResolver, LocalAssetResolver};
use super::fs::ProjectFs;
use super::scene_files::{
    create_scene_file, delete_scene_file, generate_default_content, generate_source_path,
    load_scene_content, sanitize_name, source_kind, SourceKind,
};
use super::store::{TimelineState, TimelineStore};
use crate::config::SyncConfig;
use crate::constants::{
    ASSETS_DIR, DEFAULT_FPS, DOCUMENT_VERSION, NEW_PROJECT_DURATION_MS, PROJECT_FILE_EXTENSION,
    SCENES_DIR,
};
use crate::error::{SyncError, SyncResult};
use crate::state::{AspectRatio, ClipInit, ClipType, LoadedProject, ProjectDocument, Track};

struct AutosaveTask {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

struct SyncShared {
    store: TimelineStore,
    fs: Arc<dyn ProjectFs>,
    assets: Arc<dyn AssetResolver>,
    /// Set until the initial load finishes; autosave ignores changes meanwhile.
    loading: AtomicBool,
    /// `.lf` file found by the last load, relative to the project root.
    file_name: Mutex<Option<String>>,
    /// Last snapshot autosave compared against.
    baseline: Mutex<Arc<TimelineState>>,
}

pub struct ProjectSync {
    shared: Arc<SyncShared>,
    config: SyncConfig,
    autosave: Mutex<Option<AutosaveTask>>,
}

impl ProjectSync {
    /// Sync with assets resolved to local file URLs and cached per path.
    pub fn new(store: TimelineStore, fs: Arc<dyn ProjectFs>, config: SyncConfig) -> Self {
        let assets = Arc::new(CachedAssetResolver::new(LocalAssetResolver::new(fs.clone())));
        Self::with_resolver(store, fs, assets, config)
    }

    pub fn with_resolver(
        store: TimelineStore,
        fs: Arc<dyn ProjectFs>,
        assets: Arc<dyn AssetResolver>,
        config: SyncConfig,
    ) -> Self {
        let baseline = store.snapshot();
        Self {
            shared: Arc::new(SyncShared {
                store,
                fs,
                assets,
                loading: AtomicBool::new(true),
                file_name: Mutex::new(None),
                baseline: Mutex::new(baseline),
            }),
            config,
            autosave: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &TimelineStore {
        &self.shared.store
    }

    pub fn is_loading(&self) -> bool {
        self.shared.loading.load(Ordering::SeqCst)
    }

    /// Name of the `.lf` file the project is saved to, once known.
    pub fn file_name(&self) -> Option<String> {
        lock(&self.shared.file_name).clone()
    }

    /// Load the project file into the store.
    ///
    /// Returns `Ok(false)` when the directory holds no `.lf` file; the store
    /// keeps its state. On error the store is left untouched as well. Either
    /// way the load guard is cleared afterwards.
    #[tracing::instrument(skip(self))]
    pub async fn load(&self) -> SyncResult<bool> {
        self.shared.loading.store(true, Ordering::SeqCst);
        let result = self.shared.load().await;
        self.shared.loading.store(false, Ordering::SeqCst);

        match &result {
            Ok(true) => info!(file = ?self.file_name(), "Project loaded"),
            Ok(false) => warn!("No .lf file found in project"),
            Err(e) => error!(error = %e, "Failed to load project"),
        }
        result
    }

    /// Write the current store state to the project file.
    pub async fn save_now(&self) -> SyncResult<()> {
        let state = self.shared.store.snapshot();
        self.shared.save(&state).await
    }

    /// Add a clip whose content lives in a project file. A clip without a
    /// source gets a fresh path; scene files are written before the clip is
    /// committed. Returns the new clip id.
    pub async fn add_clip(&self, track_id: &str, mut init: ClipInit) -> SyncResult<Option<String>> {
        if self.shared.store.snapshot().project.find_track(track_id).is_none() {
            warn!(track_id, "add_clip: track not found");
            return Ok(None);
        }

        let fs = self.shared.fs.clone();
        let clip_type = init.clip_type;
        let name = init.name.clone();
        let source = (!init.source.is_empty()).then(|| init.source.clone());
        let content = init.content.clone();

        let (source, content) = blocking(move || {
            let source = match source {
                Some(source) => source,
                None => unique_source_path(&*fs, clip_type, &name),
            };
            if source_kind(&source) != SourceKind::Scene {
                return Ok((source, content));
            }
            let content = content.unwrap_or_else(|| generate_default_content(clip_type, &name));
            if !fs.exists(&source) {
                create_scene_file(&*fs, &source, &content)?;
            }
            Ok((source, Some(content)))
        })
        .await?;

        init.source = source;
        init.content = content;
        Ok(self.shared.store.add_clip(track_id, init))
    }

    /// Start the autosave task. Needs a tokio runtime; a second call while
    /// it is running does nothing.
    pub fn spawn_autosave(&self) {
        if !self.config.autosave_enabled {
            debug!("Autosave disabled");
            return;
        }

        let mut slot = lock(&self.autosave);
        if slot.as_ref().is_some_and(|task| !task.handle.is_finished()) {
            return;
        }

        let (shutdown, shutdown_rx) = oneshot::channel();
        let rx = self.shared.store.subscribe();
        let handle = tokio::spawn(run_autosave(
            self.shared.clone(),
            rx,
            shutdown_rx,
            self.config.autosave_debounce(),
        ));
        *slot = Some(AutosaveTask { shutdown, handle });
    }

    /// Stop autosave, flushing a pending save, and release cached asset URLs.
    pub async fn close(&self) {
        let task = lock(&self.autosave).take();
        if let Some(task) = task {
            let _ = task.shutdown.send(());
            if let Err(e) = task.handle.await {
                warn!(error = %e, "Autosave task ended abnormally");
            }
        }
        self.shared.assets.release_all();
        info!("Project sync closed");
    }
}

impl SyncShared {
    async fn load(&self) -> SyncResult<bool> {
        let fs = self.fs.clone();
        let assets = self.assets.clone();
        let current_tracks = self.store.snapshot().project.tracks.clone();

        let read = blocking(move || read_project(&*fs, &*assets, current_tracks)).await?;
        let Some((file_name, loaded)) = read else {
            return Ok(false);
        };

        *lock(&self.file_name) = Some(file_name);
        self.store.load_project(loaded);
        // Autosave must not treat the load itself as an edit.
        *lock(&self.baseline) = self.store.snapshot();
        Ok(true)
    }

    async fn save(&self, state: &TimelineState) -> SyncResult<()> {
        let file_name = {
            let mut guard = lock(&self.file_name);
            guard
                .get_or_insert_with(|| default_file_name(&state.project.name))
                .clone()
        };
        let document = state.project.to_document(Utc::now());
        let bytes = document.to_bytes()?;

        let fs = self.fs.clone();
        let path = file_name.clone();
        blocking(move || Ok(fs.write(&path, &bytes)?)).await?;
        info!(file = %file_name, "Auto-saved project");
        Ok(())
    }

    /// Compare a new snapshot with the baseline. Deletes scene files of clips
    /// that disappeared and returns true when persisted fields changed.
    async fn observe(&self, current: &Arc<TimelineState>) -> bool {
        let previous = {
            let mut baseline = lock(&self.baseline);
            if self.loading.load(Ordering::SeqCst) || Arc::ptr_eq(&*baseline, current) {
                *baseline = current.clone();
                return false;
            }
            std::mem::replace(&mut *baseline, current.clone())
        };

        let (before, after) = (&previous.project, &current.project);
        let tracks_changed = before.tracks != after.tracks;
        if tracks_changed {
            let removed = removed_scene_sources(&before.tracks, &after.tracks);
            if !removed.is_empty() {
                let fs = self.fs.clone();
                let cleanup = blocking(move || {
                    for source in removed {
                        if let Err(e) = delete_scene_file(&*fs, &source) {
                            warn!(source = %source, error = %e, "Failed to delete scene file");
                        }
                    }
                    Ok(())
                })
                .await;
                if let Err(e) = cleanup {
                    warn!(error = %e, "Scene file cleanup task failed");
                }
            }
        }

        tracks_changed
            || before.duration != after.duration
            || before.aspect_ratio != after.aspect_ratio
            || before.fps != after.fps
    }
}

async fn run_autosave(
    shared: Arc<SyncShared>,
    mut rx: watch::Receiver<Arc<TimelineState>>,
    mut shutdown: oneshot::Receiver<()>,
    debounce: Duration,
) {
    let timer = tokio::time::sleep(debounce);
    tokio::pin!(timer);
    let mut pending: Option<Arc<TimelineState>> = None;

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = rx.borrow_and_update().clone();
                if shared.observe(&current).await {
                    pending = Some(current);
                    timer.as_mut().reset(Instant::now() + debounce);
                }
            }
            () = &mut timer, if pending.is_some() => {
                if let Some(state) = pending.take() {
                    if let Err(e) = shared.save(&state).await {
                        error!(error = %e, "Auto-save error");
                    }
                }
            }
        }
    }

    if let Some(state) = pending.take() {
        if let Err(e) = shared.save(&state).await {
            error!(error = %e, "Auto-save error");
        }
    }
    debug!("Autosave task stopped");
}

/// True if the directory holds a `.lf` file.
pub fn is_project_dir(fs: &dyn ProjectFs) -> bool {
    matches!(find_lf_file(fs), Ok(Some(_)))
}

/// Lay out a new project: an empty `.lf` document plus the `scenes/` and
/// `assets/` folders. Returns the name of the written `.lf` file.
#[tracing::instrument(skip(fs))]
pub fn create_project_structure(fs: &dyn ProjectFs, name: &str) -> SyncResult<String> {
    let file_name = default_file_name(name);
    let document = ProjectDocument {
        name: name.to_string(),
        version: DOCUMENT_VERSION.to_string(),
        aspect_ratio: AspectRatio::Named("16:9".to_string()),
        fps: DEFAULT_FPS,
        duration: NEW_PROJECT_DURATION_MS,
        modified: Some(Utc::now()),
        tracks: Vec::new(),
    };
    fs.write(&file_name, &document.to_bytes()?)?;

    fs.create_dir_all(SCENES_DIR)?;
    for sub in ["images", "videos", "audio"] {
        fs.create_dir_all(&format!("{ASSETS_DIR}/{sub}"))?;
    }
    info!(file = %file_name, "Created project structure");
    Ok(file_name)
}

/// Find, decode and resolve the project file. `None` when there is none.
fn read_project(
    fs: &dyn ProjectFs,
    assets: &dyn AssetResolver,
    current_tracks: Vec<Track>,
) -> SyncResult<Option<(String, LoadedProject)>> {
    let Some(file_name) = find_lf_file(fs)? else {
        return Ok(None);
    };

    let bytes = fs.read(&file_name)?;
    let document = ProjectDocument::from_bytes(&bytes)?;
    let mut loaded = document.into_loaded();

    match loaded.tracks.as_mut() {
        Some(tracks) => resolve_clip_contents(fs, assets, tracks),
        // Keep the store's tracks, but make sure their scene files exist.
        None => ensure_scene_files_exist(fs, &current_tracks),
    }
    Ok(Some((file_name, loaded)))
}

/// First `*.lf` file in the project root, by name.
fn find_lf_file(fs: &dyn ProjectFs) -> SyncResult<Option<String>> {
    let suffix = format!(".{PROJECT_FILE_EXTENSION}");
    let mut names: Vec<String> = fs
        .read_dir("")?
        .into_iter()
        .filter(|entry| !entry.is_dir && entry.name.ends_with(&suffix))
        .map(|entry| entry.name)
        .collect();
    names.sort();
    Ok(names.into_iter().next())
}

fn resolve_clip_contents(fs: &dyn ProjectFs, assets: &dyn AssetResolver, tracks: &mut [Track]) {
    for clip in tracks.iter_mut().flat_map(|track| track.clips.iter_mut()) {
        clip.content = None;
        if clip.source.is_empty() {
            warn!(clip_id = %clip.id, "Clip has no source");
            continue;
        }

        let resolved = match source_kind(&clip.source) {
            SourceKind::Scene => match load_scene_content(fs, &clip.source) {
                Ok(Some(text)) => Ok(text),
                Ok(None) => {
                    info!(source = %clip.source, "Scene file missing, creating");
                    let content = generate_default_content(clip.clip_type, &clip.name);
                    create_scene_file(fs, &clip.source, &content).map(|()| content)
                }
                Err(e) => Err(e),
            },
            SourceKind::Asset => assets.resolve(&clip.source),
        };

        match resolved {
            Ok(content) => clip.content = Some(content),
            Err(e) => warn!(clip_id = %clip.id, source = %clip.source, error = %e, "Failed to load clip content"),
        }
    }
}

fn ensure_scene_files_exist(fs: &dyn ProjectFs, tracks: &[Track]) {
    for clip in tracks.iter().flat_map(|track| track.clips.iter()) {
        let Some(content) = clip.content.as_deref() else {
            continue;
        };
        if clip.source.is_empty() || source_kind(&clip.source) != SourceKind::Scene {
            continue;
        }
        if fs.exists(&clip.source) {
            continue;
        }
        if let Err(e) = create_scene_file(fs, &clip.source, content) {
            warn!(source = %clip.source, error = %e, "Failed to create scene file");
        }
    }
}

/// Scene sources of clips present in `before` but gone from `after`.
fn removed_scene_sources(before: &[Track], after: &[Track]) -> Vec<String> {
    let remaining: std::collections::HashSet<&str> = after
        .iter()
        .flat_map(|track| track.clips.iter())
        .map(|clip| clip.id.as_str())
        .collect();

    before
        .iter()
        .flat_map(|track| track.clips.iter())
        .filter(|clip| !remaining.contains(clip.id.as_str()))
        .filter(|clip| !clip.source.is_empty() && source_kind(&clip.source) == SourceKind::Scene)
        .map(|clip| clip.source.clone())
        .collect()
}

/// Fresh source path that does not collide with an existing file.
fn unique_source_path(fs: &dyn ProjectFs, clip_type: ClipType, name: &str) -> String {
    let base = generate_source_path(clip_type, name);
    if !fs.exists(&base) {
        return base;
    }
    let (stem, ext) = base.rsplit_once('.').unwrap_or((base.as_str(), ""));
    let free = (1..)
        .map(|n| format!("{stem}_{n}.{ext}"))
        .find(|candidate| !fs.exists(candidate));
    free.unwrap_or(base)
}

fn default_file_name(project_name: &str) -> String {
    let stem = sanitize_name(project_name);
    let stem = if stem.is_empty() { "project" } else { stem.as_str() };
    format!("{stem}.{PROJECT_FILE_EXTENSION}")
}

async fn blocking<T, F>(f: F) -> SyncResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> SyncResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| SyncError::Runtime(e.to_string()))?
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fs::memory::MemoryFs;
    use crate::core::lf_format::encode_lf_json;
    use crate::state::{ProjectState, TrackType};

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    }

    fn lf_bytes(project: &ProjectState) -> Vec<u8> {
        project.to_document(Utc::now()).to_bytes().unwrap()
    }

    fn sync_for(fs: &Arc<MemoryFs>) -> (TimelineStore, ProjectSync) {
        let store = TimelineStore::default();
        let sync = ProjectSync::new(store.clone(), fs.clone(), SyncConfig::default());
        (store, sync)
    }

    fn saved(fs: &MemoryFs, file: &str) -> ProjectDocument {
        ProjectDocument::from_bytes(&fs.get(file).unwrap()).unwrap()
    }

    /// Project with a text clip, a present asset and a missing asset.
    fn sample_project() -> ProjectState {
        let mut project = ProjectState::default();
        let track_id = project.tracks[0].id.clone();
        project.name = "Sample".into();
        project.add_clip(
            &track_id,
            ClipInit::new(ClipType::Text, "Title", 1000.0)
                .at(0.0)
                .with_source("scenes/title.tsx"),
        );
        project.add_clip(
            &track_id,
            ClipInit::new(ClipType::Video, "Intro", 1000.0)
                .at(1000.0)
                .with_source("assets/videos/intro.mp4"),
        );
        project.add_clip(
            &track_id,
            ClipInit::new(ClipType::Image, "Gone", 1000.0)
                .at(2000.0)
                .with_source("assets/images/gone.png"),
        );
        project
    }

    #[tokio::test]
    async fn test_load_resolves_clip_contents() {
        init_tracing();
        let fs = Arc::new(
            MemoryFs::new()
                .with_file("sample.lf", lf_bytes(&sample_project()))
                .with_file("assets/videos/intro.mp4", b"mp4".to_vec()),
        );
        let (store, sync) = sync_for(&fs);
        assert!(sync.is_loading());

        assert!(sync.load().await.unwrap());
        assert!(!sync.is_loading());
        assert_eq!(sync.file_name().as_deref(), Some("sample.lf"));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.project.name, "Sample");
        let clips: Vec<_> = snapshot.project.tracks[0].clips.iter().collect();

        // Missing scene file is synthesized and written back.
        let title = clips[0].content.as_deref().unwrap();
        assert!(title.contains(">Title</h1>"));
        assert_eq!(fs.text("scenes/title.tsx").as_deref(), Some(title));

        assert!(clips[1]
            .content
            .as_deref()
            .unwrap()
            .starts_with("http://lyra.localhost/"));
        assert!(clips[2].content.is_none());
    }

    #[tokio::test]
    async fn test_load_reads_existing_scene_file() {
        let fs = Arc::new(
            MemoryFs::new()
                .with_file("sample.lf", lf_bytes(&sample_project()))
                .with_file("scenes/title.tsx", "<custom />"),
        );
        let (store, sync) = sync_for(&fs);
        sync.load().await.unwrap();
        let snapshot = store.snapshot();
        assert_eq!(
            snapshot.project.tracks[0].clips[0].content.as_deref(),
            Some("<custom />")
        );
    }

    #[tokio::test]
    async fn test_load_without_lf_file_keeps_state() {
        let fs = Arc::new(MemoryFs::new().with_file("notes.txt", "hi"));
        let (store, sync) = sync_for(&fs);
        let before = store.snapshot();

        assert!(!sync.load().await.unwrap());
        assert!(!sync.is_loading());
        assert_eq!(*store.snapshot(), *before);
    }

    #[tokio::test]
    async fn test_failed_load_leaves_prior_state() {
        let mut corrupt = encode_lf_json("{}").unwrap();
        corrupt.truncate(8);
        let fs = Arc::new(MemoryFs::new().with_file("broken.lf", corrupt));
        let (store, sync) = sync_for(&fs);
        let before = store.snapshot();

        assert!(sync.load().await.is_err());
        assert!(!sync.is_loading());
        assert_eq!(*store.snapshot(), *before);
    }

    #[tokio::test]
    async fn test_load_plain_json_file() {
        let json = r#"{"name":"Legacy","aspectRatio":"4:3","fps":24,"duration":5000,"tracks":[]}"#;
        let fs = Arc::new(MemoryFs::new().with_file("legacy.lf", json));
        let (store, sync) = sync_for(&fs);

        assert!(sync.load().await.unwrap());
        let snapshot = store.snapshot();
        assert_eq!(snapshot.project.name, "Legacy");
        assert_eq!(snapshot.project.fps, 24.0);
        assert!((snapshot.project.aspect_ratio - 4.0 / 3.0).abs() < 1e-9);
        // No tracks in the file: the store keeps its own.
        assert_eq!(snapshot.project.tracks.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_document_writes_scene_files_for_current_clips() {
        let fs = Arc::new(MemoryFs::new().with_file("p.lf", encode_lf_json(r#"{"name":"P"}"#).unwrap()));
        let (store, sync) = sync_for(&fs);
        let track_id = store.snapshot().project.tracks[0].id.clone();
        store.add_clip(
            &track_id,
            ClipInit::new(ClipType::Code, "Demo", 1000.0)
                .with_source("scenes/demo.tsx")
                .with_content("<demo />"),
        );

        sync.load().await.unwrap();
        assert_eq!(fs.text("scenes/demo.tsx").as_deref(), Some("<demo />"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_autosave_debounces_bursts() {
        init_tracing();
        let fs = Arc::new(MemoryFs::new().with_file("demo.lf", lf_bytes(&ProjectState::default())));
        let (store, sync) = sync_for(&fs);
        sync.spawn_autosave();
        sync.load().await.unwrap();
        let track_id = store.snapshot().project.tracks[0].id.clone();
        let writes = fs.write_count();

        for i in 0..3 {
            store.add_clip(
                &track_id,
                ClipInit::new(ClipType::Video, format!("c{i}"), 100.0),
            );
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        assert_eq!(fs.write_count(), writes);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(fs.write_count(), writes + 1);

        let doc = saved(&fs, "demo.lf");
        assert_eq!(doc.tracks[0].clips.len(), 3);
        assert!(doc.modified.is_some());
        assert!(doc.tracks[0].clips.iter().all(|c| c.content.is_none()));
        sync.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_autosave_ignores_playhead_moves() {
        let fs = Arc::new(MemoryFs::new().with_file("demo.lf", lf_bytes(&ProjectState::default())));
        let (store, sync) = sync_for(&fs);
        sync.spawn_autosave();
        sync.load().await.unwrap();
        let writes = fs.write_count();

        store.set_playhead(1000.0);
        store.set_zoom(2.0);
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(fs.write_count(), writes);
        sync.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_autosave_waits_for_load() {
        let fs = Arc::new(MemoryFs::new().with_file("demo.lf", lf_bytes(&ProjectState::default())));
        let (store, sync) = sync_for(&fs);
        sync.spawn_autosave();

        // Edits before the initial load are not saved.
        store.add_track(TrackType::Audio);
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(fs.write_count(), 0);

        // Neither is the load itself.
        sync.load().await.unwrap();
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(fs.write_count(), 0);
        sync.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_removed_clip_deletes_scene_file() {
        let fs = Arc::new(
            MemoryFs::new()
                .with_file("sample.lf", lf_bytes(&sample_project()))
                .with_file("scenes/title.tsx", "<t />"),
        );
        let (store, sync) = sync_for(&fs);
        sync.spawn_autosave();
        sync.load().await.unwrap();

        let title_id = store.snapshot().project.tracks[0].clips[0].id.clone();
        store.remove_clip(&title_id);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(fs.get("scenes/title.tsx").is_none());

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(saved(&fs, "sample.lf").tracks[0].clips.len(), 2);
        sync.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_flushes_pending_save() {
        let fs = Arc::new(MemoryFs::new().with_file("demo.lf", lf_bytes(&ProjectState::default())));
        let (store, sync) = sync_for(&fs);
        sync.spawn_autosave();
        sync.load().await.unwrap();

        let track_id = store.snapshot().project.tracks[0].id.clone();
        store.add_clip(&track_id, ClipInit::new(ClipType::Audio, "a", 100.0));
        tokio::time::sleep(Duration::from_millis(10)).await;

        sync.close().await;
        assert_eq!(saved(&fs, "demo.lf").tracks[0].clips.len(), 1);
    }

    #[tokio::test]
    async fn test_save_now_without_lf_uses_project_name() {
        let fs = Arc::new(MemoryFs::new());
        let (_, sync) = sync_for(&fs);
        sync.save_now().await.unwrap();
        assert_eq!(sync.file_name().as_deref(), Some("untitled_project.lf"));
        assert_eq!(saved(&fs, "untitled_project.lf").name, "Untitled Project");
    }

    #[tokio::test]
    async fn test_add_clip_creates_scene_file() {
        let fs = Arc::new(MemoryFs::new());
        let (store, sync) = sync_for(&fs);
        let track_id = store.snapshot().project.tracks[0].id.clone();

        let clip_id = sync
            .add_clip(&track_id, ClipInit::new(ClipType::Text, "Hello World", 1000.0))
            .await
            .unwrap()
            .unwrap();
        let clip = store.snapshot().project.find_clip(&clip_id).cloned().unwrap();
        assert!(clip.source.starts_with("scenes/hello_world_"));
        assert_eq!(fs.text(&clip.source), clip.content);

        assert!(sync
            .add_clip("missing", ClipInit::new(ClipType::Text, "x", 1.0))
            .await
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_create_project_structure() {
        let fs = MemoryFs::new();
        assert!(!is_project_dir(&fs));

        let file = create_project_structure(&fs, "My Film").unwrap();
        assert_eq!(file, "my_film.lf");
        assert!(is_project_dir(&fs));

        let doc = saved(&fs, &file);
        assert_eq!(doc.name, "My Film");
        assert_eq!(doc.duration, 10_000.0);
        assert_eq!(doc.aspect_ratio, AspectRatio::Named("16:9".into()));
        assert!(doc.tracks.is_empty());
    }

    #[test]
    fn test_removed_scene_sources() {
        let before = sample_project().tracks;
        let mut after = before.clone();
        after[0].clips.retain(|c| c.name != "Title" && c.name != "Intro");
        assert_eq!(removed_scene_sources(&before, &after), vec!["scenes/title.tsx"]);
    }
}
