//! Math utilities
//!
//! Re-exports glam with the few helpers the 2D runtime needs

pub use glam::*;

/// Half-extents of an axis-aligned box of `size` scaled by `scale`.
#[inline]
pub fn half_extents(size: Vec2, scale: Vec2) -> Vec2 {
    (size * scale * 0.5).abs()
}

/// Whether `point` lies inside the axis-aligned box centred on `center`.
#[inline]
pub fn aabb_contains(center: Vec2, half: Vec2, point: Vec2) -> bool {
    let d = (point - center).abs();
    d.x <= half.x && d.y <= half.y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aabb_edges_are_inclusive() {
        let half = half_extents(Vec2::new(100.0, 50.0), Vec2::ONE);
        assert_eq!(half, Vec2::new(50.0, 25.0));
        assert!(aabb_contains(Vec2::ZERO, half, Vec2::new(50.0, -25.0)));
        assert!(!aabb_contains(Vec2::ZERO, half, Vec2::new(50.1, 0.0)));
    }

    #[test]
    fn negative_scale_still_has_positive_extents() {
        let half = half_extents(Vec2::new(10.0, 10.0), Vec2::new(-2.0, 1.0));
        assert_eq!(half, Vec2::new(10.0, 5.0));
    }
}
