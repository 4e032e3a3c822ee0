//! Kiln Scene Codec
//!
//! Line-oriented text format for Transform-bearing entities. It is the
//! only way world state is persisted, including the snapshot the editor
//! takes when entering play mode.
//!
//! ```text
//! # Scene File
//! entity
//!   transform <posX> <posY> <rotation> <scaleX> <scaleY>
//!   sprite <r> <g> <b> <a> <sizeX> <sizeY>
//!   rigidbody <bodyType> <fixedRotation> <density> <friction> <restitution>
//!   script <path>
//!   camera <zoom> <offsetX> <offsetY>
//! ```
//!
//! Component lines are optional and may come in any order. Texture
//! bindings and `Transform::parent` are not written: both name runtime
//! handles that mean nothing after a reload.

mod codec;
mod error;

pub use codec::{load, load_str, read_source, save, write_scene, LoadReport, SaveReport, HEADER};
pub use error::SceneError;
