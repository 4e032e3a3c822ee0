// component.rs - Component kinds known to the registry
//
// The registry holds one concrete store per kind. This trait lets generic
// code (`Registry::add::<T>`, editor "add component" actions) reach the
// right store without a type map.

use crate::ecs::{ComponentStore, Registry};

/// A plain data record the registry stores per entity.
pub trait Component: 'static + Sized {
    /// Human-readable name for logs and tooling.
    const NAME: &'static str;

    fn store(registry: &Registry) -> &ComponentStore<Self>;

    fn store_mut(registry: &mut Registry) -> &mut ComponentStore<Self>;
}

/// Helper macro to implement the Component trait for a registry field.
///
/// # Example
/// ```ignore
/// define_component!(Transform, transforms, "Transform");
/// ```
#[macro_export]
macro_rules! define_component {
    ($ty:ty, $field:ident, $name:expr) => {
        impl $crate::ecs::Component for $ty {
            const NAME: &'static str = $name;

            #[inline]
            fn store(registry: &$crate::ecs::Registry) -> &$crate::ecs::ComponentStore<Self> {
                &registry.$field
            }

            #[inline]
            fn store_mut(
                registry: &mut $crate::ecs::Registry,
            ) -> &mut $crate::ecs::ComponentStore<Self> {
                &mut registry.$field
            }
        }
    };
}
