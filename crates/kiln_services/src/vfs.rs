//! Read-only virtual filesystem over an ordered list of mount roots.
//!
//! Relative paths are searched under each mount in mount order. Anything
//! not found that way (absolute paths included) falls back to a direct
//! read of the path as given.

use std::io;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct Vfs {
    mounts: Vec<PathBuf>,
}

impl Vfs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mounts<I, P>(mounts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            mounts: mounts.into_iter().map(Into::into).collect(),
        }
    }

    /// Append a search root.
    pub fn mount(&mut self, root: impl Into<PathBuf>) {
        let root = root.into();
        tracing::debug!(root = %root.display(), "vfs mount");
        self.mounts.push(root);
    }

    pub fn mounts(&self) -> &[PathBuf] {
        &self.mounts
    }

    /// First mounted file matching `path`, if `path` is a plain relative path.
    pub fn locate(&self, path: impl AsRef<Path>) -> Option<PathBuf> {
        let path = path.as_ref();
        if !is_mountable(path) {
            return None;
        }
        self.mounts
            .iter()
            .map(|root| root.join(path))
            .find(|candidate| candidate.is_file())
    }

    pub fn read(&self, path: impl AsRef<Path>) -> io::Result<Vec<u8>> {
        let path = path.as_ref();
        match self.locate(path) {
            Some(found) => std::fs::read(found),
            None => std::fs::read(path),
        }
    }

    pub fn read_to_string(&self, path: impl AsRef<Path>) -> io::Result<String> {
        let path = path.as_ref();
        match self.locate(path) {
            Some(found) => std::fs::read_to_string(found),
            None => std::fs::read_to_string(path),
        }
    }
}

/// Mounts never resolve absolute paths or escape their root.
fn is_mountable(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
