//! Kiln Services Layer
//!
//! Platform abstraction for input, settings and file access.

pub mod input;
pub mod settings;
pub mod vfs;

pub use input::{InputEvent, InputState, KeyCode, MouseButton};
pub use settings::{Settings, SettingsError};
pub use vfs::Vfs;
