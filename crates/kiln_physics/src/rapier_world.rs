//! Rapier implementation of the physics provider.

use crate::provider::{BodyDesc, BoxColliderDesc, PhysicsProvider};
use kiln_core::components::{BodyHandle, BodyType};
use kiln_core::math::Vec2;
use rapier2d::prelude::*;
use std::num::NonZeroUsize;

/// Smallest half-extent a box collider is built with. Zero-sized sprites
/// would otherwise produce massless dynamic bodies.
const MIN_HALF_EXTENT: f32 = 0.5;

/// 2D simulation world backed by rapier2d.
pub struct PhysicsWorld {
    bodies: RigidBodySet,
    colliders: ColliderSet,
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
}

impl PhysicsWorld {
    /// World with the given gravity and constraint-solver iteration count.
    pub fn new(gravity: Vec2, solver_iterations: usize) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.num_solver_iterations =
            NonZeroUsize::new(solver_iterations).unwrap_or(NonZeroUsize::MIN);
        Self {
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            gravity: vector![gravity.x, gravity.y],
            integration_parameters,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
        }
    }

    pub fn gravity(&self) -> Vec2 {
        Vec2::new(self.gravity.x, self.gravity.y)
    }

    fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies.get(to_rapier(handle))
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(to_rapier(handle))
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(Vec2::new(0.0, -800.0), 4)
    }
}

impl std::fmt::Debug for PhysicsWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicsWorld")
            .field("bodies", &self.bodies.len())
            .field("colliders", &self.colliders.len())
            .field("gravity", &self.gravity())
            .finish()
    }
}

fn to_rapier(handle: BodyHandle) -> RigidBodyHandle {
    RigidBodyHandle::from_raw_parts(handle.index, handle.generation)
}

fn from_rapier(handle: RigidBodyHandle) -> BodyHandle {
    let (index, generation) = handle.into_raw_parts();
    BodyHandle { index, generation }
}

fn rapier_body_type(body_type: BodyType) -> RigidBodyType {
    match body_type {
        BodyType::Static => RigidBodyType::Fixed,
        BodyType::Kinematic => RigidBodyType::KinematicVelocityBased,
        BodyType::Dynamic => RigidBodyType::Dynamic,
    }
}

impl PhysicsProvider for PhysicsWorld {
    fn create_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let mut builder = RigidBodyBuilder::new(rapier_body_type(desc.body_type))
            .translation(vector![desc.position.x, desc.position.y])
            .rotation(desc.rotation);
        if desc.fixed_rotation {
            builder = builder.lock_rotations();
        }
        let handle = from_rapier(self.bodies.insert(builder.build()));
        tracing::debug!(?handle, ?desc.body_type, "physics body created");
        handle
    }

    fn attach_box_collider(&mut self, body: BodyHandle, desc: BoxColliderDesc) -> bool {
        let parent = to_rapier(body);
        if !self.bodies.contains(parent) {
            return false;
        }
        let half = desc.half_extents.abs().max(Vec2::splat(MIN_HALF_EXTENT));
        let collider = ColliderBuilder::cuboid(half.x, half.y)
            .density(desc.density)
            .friction(desc.friction)
            .restitution(desc.restitution)
            .build();
        self.colliders
            .insert_with_parent(collider, parent, &mut self.bodies);
        true
    }

    fn remove_body(&mut self, body: BodyHandle) {
        let removed = self.bodies.remove(
            to_rapier(body),
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        if removed.is_some() {
            tracing::debug!(handle = ?body, "physics body removed");
        }
    }

    fn is_valid(&self, body: BodyHandle) -> bool {
        self.bodies.contains(to_rapier(body))
    }

    fn body_pose(&self, body: BodyHandle) -> Option<(Vec2, f32)> {
        self.body(body).map(|rb| {
            let t = rb.translation();
            (Vec2::new(t.x, t.y), rb.rotation().angle())
        })
    }

    fn set_body_pose(&mut self, body: BodyHandle, position: Vec2, rotation: f32) {
        if let Some(rb) = self.body_mut(body) {
            rb.set_translation(vector![position.x, position.y], true);
            rb.set_rotation(Rotation::new(rotation), true);
        }
    }

    fn linear_velocity(&self, body: BodyHandle) -> Option<Vec2> {
        self.body(body).map(|rb| {
            let v = rb.linvel();
            Vec2::new(v.x, v.y)
        })
    }

    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec2) {
        if let Some(rb) = self.body_mut(body) {
            rb.set_linvel(vector![velocity.x, velocity.y], true);
        }
    }

    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec2) {
        if let Some(rb) = self.body_mut(body) {
            rb.apply_impulse(vector![impulse.x, impulse.y], true);
        }
    }

    fn set_body_type(&mut self, body: BodyHandle, body_type: BodyType) {
        if let Some(rb) = self.body_mut(body) {
            rb.set_body_type(rapier_body_type(body_type), true);
        }
    }

    fn set_fixed_rotation(&mut self, body: BodyHandle, fixed: bool) {
        if let Some(rb) = self.body_mut(body) {
            rb.lock_rotations(fixed, true);
        }
    }

    fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = vector![gravity.x, gravity.y];
    }

    fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }
}
