//! Asset URL resolution.

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use super::fs::ProjectFs;
use crate::utils::get_local_file_url;

/// Turns a project-relative asset path into a URL the renderer can load.
pub trait AssetResolver: Send + Sync + 'static {
    fn resolve(&self, source: &str) -> io::Result<String>;

    /// Forget anything held for the current project.
    fn release_all(&self) {}
}

/// Resolves assets to `lyra.localhost` URLs of files under the project root.
pub struct LocalAssetResolver {
    fs: Arc<dyn ProjectFs>,
}

impl LocalAssetResolver {
    pub fn new(fs: Arc<dyn ProjectFs>) -> Self {
        Self { fs }
    }
}

impl AssetResolver for LocalAssetResolver {
    fn resolve(&self, source: &str) -> io::Result<String> {
        if !self.fs.exists(source) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("asset not found: {source}"),
            ));
        }
        Ok(get_local_file_url(&self.fs.root().join(source)))
    }
}

/// Per-path cache in front of another resolver, kept for the session.
pub struct CachedAssetResolver<R> {
    inner: R,
    cache: Mutex<HashMap<String, String>>,
}

impl<R: AssetResolver> CachedAssetResolver<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn cached_len(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl<R: AssetResolver> AssetResolver for CachedAssetResolver<R> {
    fn resolve(&self, source: &str) -> io::Result<String> {
        if let Some(url) = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(source)
        {
            return Ok(url.clone());
        }

        // Failures are not cached; the file may appear later.
        let url = self.inner.resolve(source)?;
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(source.to_string(), url.clone());
        Ok(url)
    }

    fn release_all(&self) {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        debug!(count = cache.len(), "Releasing asset URL cache");
        cache.clear();
        self.inner.release_all();
    }
}
