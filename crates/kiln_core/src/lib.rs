//! Kiln Engine Core
//!
//! Contains the fundamental simulation state:
//! - Generational entity handles and sparse-set component storage
//! - Built-in 2D components
//! - Fixed-step simulation time
//! - Math re-exports

pub mod components;
pub mod ecs;
pub mod math;
pub mod time;

pub use glam;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
