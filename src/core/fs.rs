//! Project directory access.
//!
//! Project sync only ever touches files through [`ProjectFs`], with paths
//! relative to the project root (`scenes/intro.tsx`, `demo.lf`). Calls are
//! blocking; async callers run them on the blocking pool.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsEntry {
    pub name: String,
    pub is_dir: bool,
}

pub trait ProjectFs: Send + Sync + 'static {
    /// Absolute location of the project root.
    fn root(&self) -> &Path;
    fn read(&self, path: &str) -> io::Result<Vec<u8>>;
    /// Write a file, creating parent directories as needed.
    fn write(&self, path: &str, data: &[u8]) -> io::Result<()>;
    /// List a directory. `""` lists the project root.
    fn read_dir(&self, path: &str) -> io::Result<Vec<FsEntry>>;
    fn exists(&self, path: &str) -> bool;
    fn create_dir_all(&self, path: &str) -> io::Result<()>;
    fn remove_file(&self, path: &str) -> io::Result<()>;
}

/// [`ProjectFs`] over a directory on the local disk.
#[derive(Debug, Clone)]
pub struct LocalFs {
    root: PathBuf,
}

impl LocalFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Join a project-relative path onto the root. Absolute paths and `..`
    /// are rejected so nothing outside the project can be reached.
    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("path escapes project root: {path}"),
            ));
        }
        Ok(self.root.join(relative))
    }
}

impl ProjectFs for LocalFs {
    fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        fs::read(self.resolve(path)?)
    }

    fn write(&self, path: &str, data: &[u8]) -> io::Result<()> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(full, data)
    }

    fn read_dir(&self, path: &str) -> io::Result<Vec<FsEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(self.resolve(path)?)? {
            let entry = entry?;
            entries.push(FsEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir: entry.file_type()?.is_dir(),
            });
        }
        Ok(entries)
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).map(|p| p.exists()).unwrap_or(false)
    }

    fn create_dir_all(&self, path: &str) -> io::Result<()> {
        fs::create_dir_all(self.resolve(path)?)
    }

    fn remove_file(&self, path: &str) -> io::Result<()> {
        fs::remove_file(self.resolve(path)?)
    }
}
