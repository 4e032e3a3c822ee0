//! Entity Component System core types.
//!
//! A deliberately small sparse-set design: a generational identity table
//! plus one dense store per component kind, all owned by [`Registry`].
//! There is no archetype storage and no scheduler; systems are plain
//! functions that borrow the registry.

mod component;
mod entity;
mod registry;
mod storage;

pub use component::Component;
pub use entity::{EntityHandle, IdentityAllocator};
pub use registry::Registry;
pub use storage::ComponentStore;
