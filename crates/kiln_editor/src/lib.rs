//! Kiln Editor
//!
//! Editor state and actions behind the panels: play/edit mode with
//! snapshot restore, scene load and save, selection and picking, and the
//! console log. Windowing and drawing live outside this crate and drive
//! it through [`EditorApp::handle_input`] and [`EditorApp::frame`].

mod actions;
mod app;
mod console;
mod error;
mod mode;

pub use actions::{viewport_to_world, Status};
pub use app::EditorApp;
pub use console::{Console, CONSOLE_CAPACITY};
pub use error::EditorError;
pub use mode::EditorMode;
