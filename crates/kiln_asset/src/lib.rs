//! Kiln Asset Layer
//!
//! Texture handles keyed by path. Decoding and GPU upload belong to the
//! rendering layer behind [`TextureLoader`]; this crate only reads bytes
//! through the virtual filesystem and hands out opaque [`TextureHandle`]s.

use kiln_core::components::TextureHandle;
use kiln_services::Vfs;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read texture {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("texture {path} was rejected by the loader: {reason}")]
    Decode { path: PathBuf, reason: String },
}

/// Turns file bytes into a texture the renderer can draw.
pub trait TextureLoader {
    /// Decode `bytes` and bind the result to `handle`.
    fn load(&mut self, handle: TextureHandle, path: &Path, bytes: &[u8]) -> Result<(), String>;
}

/// Texture handles cached by path. Failures are not cached, so a texture
/// that appears later resolves on the next request.
#[derive(Debug)]
pub struct TextureCache {
    next_id: u64,
    by_path: HashMap<PathBuf, TextureHandle>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            by_path: HashMap::new(),
        }
    }

    /// Cached handle for `path`, or load it. Missing files and loader
    /// refusals yield `None`: the sprite simply draws without a texture.
    pub fn resolve(
        &mut self,
        path: impl AsRef<Path>,
        vfs: &Vfs,
        loader: &mut impl TextureLoader,
    ) -> Option<TextureHandle> {
        match self.try_resolve(path, vfs, loader) {
            Ok(handle) => Some(handle),
            Err(err) => {
                tracing::warn!("{err}");
                None
            }
        }
    }

    pub fn try_resolve(
        &mut self,
        path: impl AsRef<Path>,
        vfs: &Vfs,
        loader: &mut impl TextureLoader,
    ) -> Result<TextureHandle, AssetError> {
        let path = path.as_ref();
        if let Some(handle) = self.by_path.get(path) {
            return Ok(*handle);
        }

        let bytes = vfs.read(path).map_err(|source| AssetError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let handle = TextureHandle(self.next_id);
        loader
            .load(handle, path, &bytes)
            .map_err(|reason| AssetError::Decode {
                path: path.to_path_buf(),
                reason,
            })?;

        self.next_id += 1;
        self.by_path.insert(path.to_path_buf(), handle);
        tracing::debug!(path = %path.display(), ?handle, "texture loaded");
        Ok(handle)
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<TextureHandle> {
        self.by_path.get(path.as_ref()).copied()
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    /// Forget every handle. The renderer is expected to drop its textures too.
    pub fn clear(&mut self) {
        self.by_path.clear();
    }
}

impl Default for TextureCache {
    fn default() -> Self {
        Self::new()
    }
}
