// storage.rs - Sparse-set component storage
//
// One store per component kind. Components live in a dense array in
// insertion order with a parallel array of owning handles; a hash index
// maps each handle to its dense slot. Removal swaps the last element into
// the hole, so dense order is not stable across removals.

use crate::ecs::EntityHandle;
use std::collections::HashMap;

/// Dense component table keyed by entity handle.
#[derive(Debug)]
pub struct ComponentStore<T> {
    handles: Vec<EntityHandle>,
    components: Vec<T>,
    index: HashMap<EntityHandle, usize>,
}

impl<T> ComponentStore<T> {
    pub fn new() -> Self {
        Self {
            handles: Vec::new(),
            components: Vec::new(),
            index: HashMap::new(),
        }
    }

    #[inline]
    pub fn has(&self, entity: EntityHandle) -> bool {
        self.index.contains_key(&entity)
    }

    #[inline]
    pub fn get(&self, entity: EntityHandle) -> Option<&T> {
        let &slot = self.index.get(&entity)?;
        self.components.get(slot)
    }

    #[inline]
    pub fn get_mut(&mut self, entity: EntityHandle) -> Option<&mut T> {
        let &slot = self.index.get(&entity)?;
        self.components.get_mut(slot)
    }

    /// Attach `value` to `entity`.
    ///
    /// Idempotent: when the entity already owns a component of this kind the
    /// existing value is returned untouched and `value` is dropped.
    pub fn add(&mut self, entity: EntityHandle, value: T) -> &mut T {
        let slot = match self.index.get(&entity) {
            Some(&slot) => slot,
            None => {
                let slot = self.components.len();
                self.handles.push(entity);
                self.components.push(value);
                self.index.insert(entity, slot);
                slot
            }
        };
        &mut self.components[slot]
    }

    /// Detach and return the component owned by `entity`, if any.
    pub fn remove(&mut self, entity: EntityHandle) -> Option<T> {
        let slot = self.index.remove(&entity)?;
        let last = self.components.len() - 1;
        if slot != last {
            let moved = self.handles[last];
            self.index.insert(moved, slot);
        }
        self.handles.swap_remove(slot);
        Some(self.components.swap_remove(slot))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Owning handles in dense order.
    #[inline]
    pub fn handles(&self) -> &[EntityHandle] {
        &self.handles
    }

    /// Visit every `(entity, component)` pair in dense order.
    pub fn each(&self, mut visit: impl FnMut(EntityHandle, &T)) {
        for (entity, component) in self.iter() {
            visit(entity, component);
        }
    }

    /// Mutable visit in dense order.
    ///
    /// The store is exclusively borrowed for the whole pass, so a visitor
    /// cannot add or remove entries of this store. Collect handles first
    /// and mutate after the traversal.
    pub fn each_mut(&mut self, mut visit: impl FnMut(EntityHandle, &mut T)) {
        for (entity, component) in self.iter_mut() {
            visit(entity, component);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityHandle, &T)> + '_ {
        self.handles.iter().copied().zip(self.components.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityHandle, &mut T)> + '_ {
        self.handles.iter().copied().zip(self.components.iter_mut())
    }

    pub fn clear(&mut self) {
        self.handles.clear();
        self.components.clear();
        self.index.clear();
    }
}

impl<T> Default for ComponentStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
