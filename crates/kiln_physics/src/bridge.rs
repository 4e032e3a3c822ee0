//! Physics bridge
//!
//! Moves pose data between the registry and the simulation. Before a step
//! the registry is authoritative (editor drags, script writes); after the
//! step the simulation is. Entities whose body handle is missing or stale,
//! or that have no `Transform`, are skipped in both directions.
//!
//! Body lifetime also lives here: [`materialize`] creates the simulation
//! body for a `RigidBody`, [`release`] removes it, and [`despawn`] is the
//! entity teardown path that never leaves a body simulating on its own.

use crate::provider::{BodyDesc, BoxColliderDesc, PhysicsProvider, DEFAULT_HALF_EXTENTS};
use kiln_core::components::{BodyHandle, RigidBody, Sprite, Transform};
use kiln_core::ecs::{EntityHandle, Registry};

/// Push Transform position and rotation into every live body.
pub fn sync_to_physics<P: PhysicsProvider + ?Sized>(registry: &Registry, physics: &mut P) {
    for (entity, rb) in registry.rigid_bodies.iter() {
        let Some(body) = rb.body.filter(|b| physics.is_valid(*b)) else {
            continue;
        };
        if let Some(transform) = registry.transforms.get(entity) {
            physics.set_body_pose(body, transform.position, transform.rotation);
        }
    }
}

/// Pull simulated position and rotation back into Transforms.
pub fn sync_from_physics<P: PhysicsProvider + ?Sized>(registry: &mut Registry, physics: &P) {
    let Registry {
        rigid_bodies,
        transforms,
        ..
    } = registry;
    for (entity, rb) in rigid_bodies.iter() {
        let Some((position, rotation)) = rb.body.and_then(|b| physics.body_pose(b)) else {
            continue;
        };
        if let Some(transform) = transforms.get_mut(entity) {
            transform.position = position;
            transform.rotation = rotation;
        }
    }
}

/// Whether `entity` has a RigidBody backed by a live simulation body.
pub fn has_valid_body<P: PhysicsProvider + ?Sized>(
    registry: &Registry,
    physics: &P,
    entity: EntityHandle,
) -> bool {
    registry
        .get::<RigidBody>(entity)
        .and_then(|rb| rb.body)
        .is_some_and(|b| physics.is_valid(b))
}

/// Create the simulation body for `entity`'s RigidBody.
///
/// The body starts at the entity's Transform (origin when absent) and gets
/// one box collider sized to half the Sprite, or [`DEFAULT_HALF_EXTENTS`]
/// without one. Returns the existing handle when the body is already live
/// and `None` when the entity has no RigidBody.
pub fn materialize<P: PhysicsProvider + ?Sized>(
    registry: &mut Registry,
    physics: &mut P,
    entity: EntityHandle,
) -> Option<BodyHandle> {
    let config = *registry.get::<RigidBody>(entity)?;
    if let Some(body) = config.body.filter(|b| physics.is_valid(*b)) {
        return Some(body);
    }

    let transform = registry
        .get::<Transform>(entity)
        .copied()
        .unwrap_or_default();
    let half_extents = registry
        .get::<Sprite>(entity)
        .map(|s| s.size * 0.5)
        .unwrap_or(DEFAULT_HALF_EXTENTS);

    let body = physics.create_body(BodyDesc {
        position: transform.position,
        rotation: transform.rotation,
        body_type: config.body_type,
        fixed_rotation: config.fixed_rotation,
    });
    let attached = physics.attach_box_collider(
        body,
        BoxColliderDesc {
            half_extents,
            density: config.density,
            friction: config.friction,
            restitution: config.restitution,
        },
    );
    if !attached {
        tracing::warn!(%entity, "collider could not be attached, body discarded");
        physics.remove_body(body);
        return None;
    }

    if let Some(rb) = registry.get_mut::<RigidBody>(entity) {
        rb.body = Some(body);
    }
    tracing::debug!(%entity, ?body, "rigid body materialized");
    Some(body)
}

/// Remove `entity`'s simulation body and clear the reference. The
/// RigidBody configuration stays.
pub fn release<P: PhysicsProvider + ?Sized>(
    registry: &mut Registry,
    physics: &mut P,
    entity: EntityHandle,
) {
    let Some(rb) = registry.get_mut::<RigidBody>(entity) else {
        return;
    };
    if let Some(body) = rb.body.take() {
        physics.remove_body(body);
    }
}

/// Release the body, then destroy the entity.
pub fn despawn<P: PhysicsProvider + ?Sized>(
    registry: &mut Registry,
    physics: &mut P,
    entity: EntityHandle,
) -> bool {
    release(registry, physics, entity);
    registry.destroy(entity)
}

/// Push edited body type and fixed-rotation flag to a live body.
pub fn apply_body_config<P: PhysicsProvider + ?Sized>(
    registry: &Registry,
    physics: &mut P,
    entity: EntityHandle,
) {
    let Some(rb) = registry.get::<RigidBody>(entity) else {
        return;
    };
    let Some(body) = rb.body.filter(|b| physics.is_valid(*b)) else {
        return;
    };
    physics.set_body_type(body, rb.body_type);
    physics.set_fixed_rotation(body, rb.fixed_rotation);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PhysicsWorld;
    use kiln_core::components::BodyType;
    use kiln_core::math::{Vec2, Vec4};

    fn spawn(registry: &mut Registry, position: Vec2, body_type: BodyType) -> EntityHandle {
        let e = registry.create();
        registry.add(e, Transform::from_position(position));
        registry.add(e, RigidBody::new(body_type));
        e
    }

    #[test]
    fn materialize_uses_transform_and_is_idempotent() {
        let mut registry = Registry::new();
        let mut physics = PhysicsWorld::default();
        let e = spawn(&mut registry, Vec2::new(10.0, 20.0), BodyType::Dynamic);

        let body = materialize(&mut registry, &mut physics, e).unwrap();
        assert!(has_valid_body(&registry, &physics, e));
        assert_eq!(physics.body_pose(body).unwrap().0, Vec2::new(10.0, 20.0));

        assert_eq!(materialize(&mut registry, &mut physics, e), Some(body));
        assert_eq!(physics.body_count(), 1);
    }

    #[test]
    fn materialize_without_rigid_body_is_none() {
        let mut registry = Registry::new();
        let mut physics = PhysicsWorld::default();
        let e = registry.create();
        registry.add(e, Transform::default());
        assert!(materialize(&mut registry, &mut physics, e).is_none());
        assert_eq!(physics.body_count(), 0);
    }

    #[test]
    fn sync_to_physics_pushes_edited_pose() {
        let mut registry = Registry::new();
        let mut physics = PhysicsWorld::default();
        let e = spawn(&mut registry, Vec2::ZERO, BodyType::Static);
        let body = materialize(&mut registry, &mut physics, e).unwrap();

        let t = registry.get_mut::<Transform>(e).unwrap();
        t.position = Vec2::new(-4.0, 7.0);
        t.rotation = 0.25;
        sync_to_physics(&registry, &mut physics);

        let (position, rotation) = physics.body_pose(body).unwrap();
        assert_eq!(position, Vec2::new(-4.0, 7.0));
        assert!((rotation - 0.25).abs() < 1e-5);
    }

    #[test]
    fn sync_from_physics_pulls_simulated_pose() {
        let mut registry = Registry::new();
        let mut physics = PhysicsWorld::default();
        let e = spawn(&mut registry, Vec2::new(0.0, 100.0), BodyType::Dynamic);
        materialize(&mut registry, &mut physics, e);

        for _ in 0..5 {
            sync_to_physics(&registry, &mut physics);
            physics.step(1.0 / 60.0);
            sync_from_physics(&mut registry, &physics);
        }
        assert!(registry.get::<Transform>(e).unwrap().position.y < 100.0);
    }

    #[test]
    fn entities_without_body_or_transform_are_skipped() {
        let mut registry = Registry::new();
        let mut physics = PhysicsWorld::default();

        // RigidBody never materialized.
        let unbacked = spawn(&mut registry, Vec2::new(1.0, 1.0), BodyType::Dynamic);

        // Live body whose Transform was removed afterwards.
        let headless = spawn(&mut registry, Vec2::new(0.0, 50.0), BodyType::Dynamic);
        let body = materialize(&mut registry, &mut physics, headless).unwrap();
        registry.remove::<Transform>(headless);

        sync_to_physics(&registry, &mut physics);
        physics.step(1.0 / 60.0);
        sync_from_physics(&mut registry, &physics);

        assert_eq!(
            registry.get::<Transform>(unbacked).unwrap().position,
            Vec2::new(1.0, 1.0)
        );
        assert!(!registry.has::<Transform>(headless));
        assert!(physics.is_valid(body));
    }

    #[test]
    fn despawn_removes_the_body() {
        let mut registry = Registry::new();
        let mut physics = PhysicsWorld::default();
        let e = spawn(&mut registry, Vec2::ZERO, BodyType::Dynamic);
        let body = materialize(&mut registry, &mut physics, e).unwrap();

        assert!(despawn(&mut registry, &mut physics, e));
        assert!(!registry.valid(e));
        assert!(!physics.is_valid(body));
        assert_eq!(physics.body_count(), 0);
        assert!(!despawn(&mut registry, &mut physics, e));
    }

    #[test]
    fn release_keeps_configuration() {
        let mut registry = Registry::new();
        let mut physics = PhysicsWorld::default();
        let e = spawn(&mut registry, Vec2::ZERO, BodyType::Kinematic);
        materialize(&mut registry, &mut physics, e);

        release(&mut registry, &mut physics, e);
        let rb = registry.get::<RigidBody>(e).unwrap();
        assert!(rb.body.is_none());
        assert_eq!(rb.body_type, BodyType::Kinematic);
        assert!(!has_valid_body(&registry, &physics, e));
    }

    #[test]
    fn static_body_made_dynamic_starts_falling() {
        let mut registry = Registry::new();
        let mut physics = PhysicsWorld::default();
        let e = spawn(&mut registry, Vec2::ZERO, BodyType::Static);
        let body = materialize(&mut registry, &mut physics, e).unwrap();

        registry.get_mut::<RigidBody>(e).unwrap().body_type = BodyType::Dynamic;
        apply_body_config(&registry, &mut physics, e);
        for _ in 0..5 {
            physics.step(1.0 / 60.0);
        }
        assert!(physics.body_pose(body).unwrap().0.y < 0.0);
    }

    #[test]
    fn zero_sized_sprite_still_materializes() {
        let mut registry = Registry::new();
        let mut physics = PhysicsWorld::new(Vec2::ZERO, 4);
        let e = spawn(&mut registry, Vec2::ZERO, BodyType::Dynamic);
        registry.add(e, Sprite::colored(Vec4::ONE, Vec2::ZERO));
        assert!(materialize(&mut registry, &mut physics, e).is_some());
    }
}
