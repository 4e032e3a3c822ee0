use kiln_scene::SceneError;
use kiln_script::ScriptError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error("scenes cannot be loaded while playing")]
    WhilePlaying,
}
