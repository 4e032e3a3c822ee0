//! Settings management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub physics: PhysicsSettings,
    pub editor: EditorSettings,
    pub vfs: VfsSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    pub gravity: [f32; 2],
    /// Fixed steps per simulated second.
    pub tick_rate_hz: u32,
    pub solver_iterations: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Where the world is snapshotted when entering play mode.
    pub snapshot_path: PathBuf,
    /// Scene path used until the user saves or loads another one.
    pub default_scene_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VfsSettings {
    pub mounts: Vec<PathBuf>,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: [0.0, -800.0],
            tick_rate_hz: kiln_core::time::TICK_RATE_HZ,
            solver_iterations: 4,
        }
    }
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from("_temp_editor_state.txt"),
            default_scene_path: PathBuf::from("scene.txt"),
        }
    }
}

impl Default for VfsSettings {
    fn default() -> Self {
        Self {
            mounts: vec![PathBuf::from(".")],
        }
    }
}

impl Settings {
    /// Read settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = serde_json::from_str(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "settings loaded");
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "physics": {{ "gravity": [0.0, -9.81] }} }}"#).unwrap();

        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.physics.gravity, [0.0, -9.81]);
        assert_eq!(settings.physics.tick_rate_hz, 60);
        assert_eq!(settings.physics.solver_iterations, 4);
        assert_eq!(settings.editor, EditorSettings::default());
    }

    #[test]
    fn bad_json_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            Settings::load(file.path()),
            Err(SettingsError::Parse { .. })
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Settings::load(dir.path().join("nope.json")),
            Err(SettingsError::Read { .. })
        ));
    }
}
