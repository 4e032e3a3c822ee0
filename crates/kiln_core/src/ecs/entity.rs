//! Entity handle with generational index
//!
//! Entities are lightweight handles (8 bytes) that name a slot in the
//! identity table. The generation counter prevents use-after-free bugs.

use std::collections::HashSet;
use std::fmt;

/// Entity handle (generation-indexed for safety)
///
/// Format: [32-bit index | 32-bit generation]
/// - Index: Position in the identity table
/// - Generation: Incremented on entity destruction (prevents use-after-free)
///
/// Example:
/// ```ignore
/// let entity = registry.create();
/// registry.destroy(entity);
/// assert!(!registry.valid(entity)); // generation mismatch
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct EntityHandle {
    index: u32,
    generation: u32,
}

impl EntityHandle {
    /// Handle that never resolves to a live entity.
    pub const NULL: EntityHandle = EntityHandle::new(u32::MAX, 0);

    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }

    /// Serialize to 64-bit integer (for scripting and tooling)
    pub fn to_bits(&self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64)
    }

    /// Deserialize from 64-bit integer
    pub fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

impl Default for EntityHandle {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Issues and recycles entity handles.
///
/// A recycled index comes back with the generation it was bumped to when
/// its previous owner was destroyed; a fresh index starts at generation 0.
/// An index whose generation reaches `u32::MAX` is retired rather than
/// wrapped, so no handle it ever issued can become valid again.
#[derive(Debug, Default)]
pub struct IdentityAllocator {
    generations: Vec<u32>,
    free: Vec<u32>,
    retired: HashSet<u32>,
}

impl IdentityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a handle, reusing the most recently freed index first.
    pub fn create(&mut self) -> EntityHandle {
        if let Some(index) = self.free.pop() {
            return EntityHandle::new(index, self.generations[index as usize]);
        }
        let index = self.generations.len() as u32;
        self.generations.push(0);
        EntityHandle::new(index, 0)
    }

    /// Invalidate `handle` and return its index to the free list, or retire
    /// the index once its generation is exhausted.
    ///
    /// Returns `false` (and does nothing) when the handle is already stale.
    pub fn destroy(&mut self, handle: EntityHandle) -> bool {
        if !self.valid(handle) {
            return false;
        }
        let slot = &mut self.generations[handle.index as usize];
        match slot.checked_add(1) {
            Some(next) => {
                *slot = next;
                self.free.push(handle.index);
            }
            None => {
                self.retired.insert(handle.index);
                tracing::debug!(index = handle.index, "entity index retired");
            }
        }
        true
    }

    #[inline]
    pub fn valid(&self, handle: EntityHandle) -> bool {
        self.generations
            .get(handle.index as usize)
            .is_some_and(|&generation| {
                generation == handle.generation
                    && (generation != u32::MAX || !self.retired.contains(&handle.index))
            })
    }

    /// Number of entities currently alive.
    pub fn live_count(&self) -> usize {
        self.generations.len() - self.free.len() - self.retired.len()
    }

    /// Number of indices ever issued (live or free).
    pub fn capacity(&self) -> usize {
        self.generations.len()
    }
}
