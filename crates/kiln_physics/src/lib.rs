//! Kiln Physics
//!
//! Boundary to the external 2D rigid-body simulation and the bridge that
//! keeps it in sync with the registry.
//!
//! - [`PhysicsProvider`]: what the runtime needs from a simulation
//! - [`PhysicsWorld`]: the rapier2d implementation
//! - [`bridge`]: transform sync, body materialization and release

pub mod bridge;
mod provider;
mod rapier_world;

pub use provider::{BodyDesc, BoxColliderDesc, PhysicsProvider, DEFAULT_HALF_EXTENTS};
pub use rapier_world::PhysicsWorld;
