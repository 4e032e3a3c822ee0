//! Physics provider boundary.
//!
//! The runtime treats bodies as opaque, nullable [`BodyHandle`]s. Every
//! query on a handle the simulation no longer knows returns `None` or
//! does nothing.

use kiln_core::components::{BodyHandle, BodyType};
use kiln_core::math::Vec2;

/// Half-extents of the box collider for bodies without a sprite.
pub const DEFAULT_HALF_EXTENTS: Vec2 = Vec2::new(50.0, 50.0);

/// Description for creating a rigid body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub position: Vec2,
    /// Radians.
    pub rotation: f32,
    pub body_type: BodyType,
    pub fixed_rotation: bool,
}

impl Default for BodyDesc {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            body_type: BodyType::Dynamic,
            fixed_rotation: false,
        }
    }
}

/// Box collider attached at the body origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxColliderDesc {
    pub half_extents: Vec2,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
}

/// Operations the runtime performs on the external simulation.
pub trait PhysicsProvider {
    fn create_body(&mut self, desc: BodyDesc) -> BodyHandle;

    /// Returns `false` when `body` is not a live body.
    fn attach_box_collider(&mut self, body: BodyHandle, desc: BoxColliderDesc) -> bool;

    /// Remove a body and its colliders. Unknown handles are ignored.
    fn remove_body(&mut self, body: BodyHandle);

    fn is_valid(&self, body: BodyHandle) -> bool;

    /// Position and rotation (radians).
    fn body_pose(&self, body: BodyHandle) -> Option<(Vec2, f32)>;

    fn set_body_pose(&mut self, body: BodyHandle, position: Vec2, rotation: f32);

    fn linear_velocity(&self, body: BodyHandle) -> Option<Vec2>;

    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec2);

    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec2);

    fn set_body_type(&mut self, body: BodyHandle, body_type: BodyType);

    fn set_fixed_rotation(&mut self, body: BodyHandle, fixed: bool);

    fn set_gravity(&mut self, gravity: Vec2);

    /// Advance the simulation by `dt` seconds. Atomic from the caller's
    /// point of view.
    fn step(&mut self, dt: f32);

    fn body_count(&self) -> usize;
}
