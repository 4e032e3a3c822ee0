use std::fmt;

/// Editor play state. Scripts and physics only run while `Playing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorMode {
    #[default]
    Editing,
    Playing,
}

impl fmt::Display for EditorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorMode::Editing => f.write_str("Edit"),
            EditorMode::Playing => f.write_str("Play"),
        }
    }
}
