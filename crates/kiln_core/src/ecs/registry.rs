// registry.rs - Entity lifecycle and per-kind component stores

use crate::components::{Camera, RigidBody, Script, Sprite, Transform};
use crate::ecs::{Component, ComponentStore, EntityHandle, IdentityAllocator};

/// Owns every entity and every component.
///
/// Operations on stale or never-issued handles are no-ops (or `None`):
/// editor and script code routinely hold handles across frames in which
/// the referent may have been destroyed.
///
/// The stores are public so systems can borrow two kinds at once (for
/// example rigid bodies immutably and transforms mutably). Writing through
/// a store directly skips the liveness check the typed helpers perform.
#[derive(Debug, Default)]
pub struct Registry {
    ids: IdentityAllocator,
    pub transforms: ComponentStore<Transform>,
    pub sprites: ComponentStore<Sprite>,
    pub rigid_bodies: ComponentStore<RigidBody>,
    pub scripts: ComponentStore<Script>,
    pub cameras: ComponentStore<Camera>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an entity with no components.
    pub fn create(&mut self) -> EntityHandle {
        let entity = self.ids.create();
        tracing::trace!(%entity, "entity created");
        entity
    }

    /// Remove `entity` from every store, then retire its handle.
    ///
    /// Returns `false` when the handle was already stale.
    pub fn destroy(&mut self, entity: EntityHandle) -> bool {
        if !self.ids.valid(entity) {
            return false;
        }
        self.transforms.remove(entity);
        self.sprites.remove(entity);
        self.rigid_bodies.remove(entity);
        self.scripts.remove(entity);
        self.cameras.remove(entity);
        let destroyed = self.ids.destroy(entity);
        tracing::trace!(%entity, "entity destroyed");
        destroyed
    }

    #[inline]
    pub fn valid(&self, entity: EntityHandle) -> bool {
        self.ids.valid(entity)
    }

    /// Number of live entities, with or without components.
    pub fn live_count(&self) -> usize {
        self.ids.live_count()
    }

    /// Attach a component to a live entity (idempotent, see
    /// [`ComponentStore::add`]). Returns `None` for stale handles.
    pub fn add<T: Component>(&mut self, entity: EntityHandle, value: T) -> Option<&mut T> {
        if !self.valid(entity) {
            return None;
        }
        Some(T::store_mut(self).add(entity, value))
    }

    pub fn get<T: Component>(&self, entity: EntityHandle) -> Option<&T> {
        T::store(self).get(entity)
    }

    pub fn get_mut<T: Component>(&mut self, entity: EntityHandle) -> Option<&mut T> {
        T::store_mut(self).get_mut(entity)
    }

    pub fn has<T: Component>(&self, entity: EntityHandle) -> bool {
        T::store(self).has(entity)
    }

    pub fn remove<T: Component>(&mut self, entity: EntityHandle) -> Option<T> {
        T::store_mut(self).remove(entity)
    }

    pub fn store<T: Component>(&self) -> &ComponentStore<T> {
        T::store(self)
    }

    pub fn store_mut<T: Component>(&mut self) -> &mut ComponentStore<T> {
        T::store_mut(self)
    }

    /// Snapshot of the handles owning a `T`, for collect-then-mutate passes.
    pub fn entities_with<T: Component>(&self) -> Vec<EntityHandle> {
        T::store(self).handles().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::BodyType;
    use crate::math::Vec2;

    #[test]
    fn destroy_removes_every_component() {
        let mut reg = Registry::new();
        let e = reg.create();
        reg.add(e, Transform::default());
        reg.add(e, Sprite::default());
        reg.add(e, RigidBody::new(BodyType::Static));
        reg.add(e, Script::new("player.js"));
        reg.add(e, Camera::default());

        assert!(reg.destroy(e));
        assert!(!reg.valid(e));
        assert!(reg.transforms.is_empty());
        assert!(reg.sprites.is_empty());
        assert!(reg.rigid_bodies.is_empty());
        assert!(reg.scripts.is_empty());
        assert!(reg.cameras.is_empty());
    }

    #[test]
    fn stale_handles_are_noops() {
        let mut reg = Registry::new();
        let old = reg.create();
        reg.add(old, Transform::default());
        reg.destroy(old);

        let new = reg.create();
        assert_eq!(new.index(), old.index());
        assert!(reg.add(old, Transform::default()).is_none());
        assert!(reg.get::<Transform>(old).is_none());
        assert!(reg.get_mut::<Transform>(old).is_none());
        assert!(!reg.destroy(old));
        assert!(reg.valid(new));
        assert!(!reg.has::<Transform>(new));
    }

    #[test]
    fn typed_add_does_not_overwrite() {
        let mut reg = Registry::new();
        let e = reg.create();
        reg.add(e, Transform::from_position(Vec2::new(1.0, 2.0)));
        let kept = *reg
            .add(e, Transform::from_position(Vec2::new(9.0, 9.0)))
            .unwrap();
        assert_eq!(kept.position, Vec2::new(1.0, 2.0));
    }

    #[test]
    fn entities_without_components_persist() {
        let mut reg = Registry::new();
        let bare = reg.create();
        let with = reg.create();
        reg.add(with, Transform::default());
        assert_eq!(reg.live_count(), 2);
        assert!(reg.valid(bare));
        assert_eq!(reg.entities_with::<Transform>(), vec![with]);
    }

    #[test]
    fn collect_then_destroy_empties_world() {
        let mut reg = Registry::new();
        for i in 0..10 {
            let e = reg.create();
            reg.add(e, Transform::from_position(Vec2::splat(i as f32)));
        }
        for e in reg.entities_with::<Transform>() {
            reg.destroy(e);
        }
        assert!(reg.transforms.is_empty());
        assert_eq!(reg.live_count(), 0);
    }
}
