use std::path::PathBuf;
use thiserror::Error;

/// Script failures. They are reported per call and never abort a step.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to start the script runtime")]
    Runtime(#[source] rquickjs::Error),

    #[error("failed to read script {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Compiling or running the top level failed, or it returned no object.
    #[error("script {path} failed to load: {message}")]
    Eval { path: PathBuf, message: String },

    #[error("{path}: {function} failed: {message}")]
    Call {
        path: PathBuf,
        function: String,
        message: String,
    },
}
