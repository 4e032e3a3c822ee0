use std::path::PathBuf;
use thiserror::Error;

/// Scene file I/O failures. Malformed content is not an error; see
/// [`LoadReport`](crate::LoadReport).
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to read scene file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("scene file {path} is empty")]
    Empty { path: PathBuf },

    /// The destination may be left truncated.
    #[error("failed to write scene file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
