//! Kiln Scripting
//!
//! JavaScript behaviour scripts via QuickJS.
//!
//! A script file is the body of a function that receives `self` (an object
//! holding `entity_id` and `entity_generation`) and returns an object with
//! optional `init()` and `update(dt)` methods:
//!
//! ```js
//! let speed = 200;
//! return {
//!     update(dt) {
//!         const t = get_transform(self.entity_id, self.entity_generation);
//!         if (t) set_transform(self.entity_id, self.entity_generation, t.x + speed * dt, t.y);
//!     },
//! };
//! ```
//!
//! Engine state reaches scripts only through bound global functions
//! (`get_key`, `get_transform`, `apply_impulse`, `log`, ...). Entities are
//! addressed by `(id, generation)` pairs and stale pairs read as
//! `undefined`.

mod api;
mod error;
mod host;
mod instance;

pub use error::ScriptError;
pub use host::{ScriptHost, ScriptReport};
pub use instance::ScriptInstance;
pub use rquickjs;
