//! Built-in component records
//!
//! Plain data owned by the registry. Handles into external systems
//! (physics bodies, script instances, textures) are opaque values that the
//! owning subsystem resolves; a component never holds a pointer.

use crate::define_component;
use crate::ecs::EntityHandle;
use crate::math::{Vec2, Vec4};

/// 2D pose. `parent` is recorded but not composed into world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    /// Radians.
    pub rotation: f32,
    pub scale: Vec2,
    pub parent: EntityHandle,
}

impl Transform {
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
            parent: EntityHandle::NULL,
        }
    }
}

/// Opaque texture reference issued by the asset layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub color: Vec4,
    pub size: Vec2,
    pub texture: Option<TextureHandle>,
}

impl Sprite {
    pub fn colored(color: Vec4, size: Vec2) -> Self {
        Self {
            color,
            size,
            texture: None,
        }
    }
}

impl Default for Sprite {
    fn default() -> Self {
        Self {
            color: Vec4::ONE,
            size: Vec2::new(100.0, 100.0),
            texture: None,
        }
    }
}

/// Opaque reference to a body inside the physics simulation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BodyHandle {
    pub index: u32,
    pub generation: u32,
}

/// Simulation category of a rigid body. Discriminants are the scene-file
/// encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyType {
    Static = 0,
    Kinematic = 1,
    #[default]
    Dynamic = 2,
}

impl BodyType {
    pub fn from_index(value: i64) -> Option<Self> {
        match value {
            0 => Some(BodyType::Static),
            1 => Some(BodyType::Kinematic),
            2 => Some(BodyType::Dynamic),
            _ => None,
        }
    }

    pub fn as_index(self) -> i64 {
        self as i64
    }
}

/// Rigid body configuration plus the lazily created simulation body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidBody {
    /// `None` until the physics bridge materializes a body.
    pub body: Option<BodyHandle>,
    pub body_type: BodyType,
    pub fixed_rotation: bool,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
}

impl RigidBody {
    pub fn new(body_type: BodyType) -> Self {
        Self {
            body_type,
            ..Self::default()
        }
    }

    /// Compares everything a scene file persists, ignoring the live body.
    pub fn same_config(&self, other: &RigidBody) -> bool {
        self.body_type == other.body_type
            && self.fixed_rotation == other.fixed_rotation
            && self.density == other.density
            && self.friction == other.friction
            && self.restitution == other.restitution
    }
}

impl Default for RigidBody {
    fn default() -> Self {
        Self {
            body: None,
            body_type: BodyType::Dynamic,
            fixed_rotation: false,
            density: 1.0,
            friction: 0.3,
            restitution: 0.0,
        }
    }
}

/// Opaque reference to a script instance owned by the script host.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ScriptInstanceId(pub u32);

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Script {
    pub path: String,
    /// Set once the source compiled and its top level ran, even if `init`
    /// threw afterwards.
    pub loaded: bool,
    pub instance: Option<ScriptInstanceId>,
    /// Owner, so callbacks resolve back to registry state by handle.
    pub entity: EntityHandle,
    /// Last load failure. The loader skips the script until the path changes.
    pub load_error: Option<String>,
}

impl Script {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Point at a new source and force a reload on the next pass.
    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
        self.loaded = false;
        self.instance = None;
        self.load_error = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub zoom: f32,
    pub offset: Vec2,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            offset: Vec2::ZERO,
        }
    }
}

define_component!(Transform, transforms, "Transform");
define_component!(Sprite, sprites, "Sprite");
define_component!(RigidBody, rigid_bodies, "RigidBody");
define_component!(Script, scripts, "Script");
define_component!(Camera, cameras, "Camera");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_editor_expectations() {
        let t = Transform::default();
        assert_eq!(t.scale, Vec2::ONE);
        assert!(t.parent.is_null());

        let s = Sprite::default();
        assert_eq!(s.size, Vec2::new(100.0, 100.0));
        assert_eq!(s.color, Vec4::ONE);

        let rb = RigidBody::default();
        assert_eq!(rb.body_type, BodyType::Dynamic);
        assert_eq!((rb.density, rb.friction, rb.restitution), (1.0, 0.3, 0.0));
        assert!(rb.body.is_none());

        assert_eq!(Camera::default().zoom, 1.0);
    }

    #[test]
    fn body_type_encoding() {
        for ty in [BodyType::Static, BodyType::Kinematic, BodyType::Dynamic] {
            assert_eq!(BodyType::from_index(ty.as_index()), Some(ty));
        }
        assert_eq!(BodyType::from_index(3), None);
        assert_eq!(BodyType::from_index(-1), None);
    }

    #[test]
    fn set_path_forces_reload() {
        let mut script = Script::new("a.js");
        script.loaded = true;
        script.instance = Some(ScriptInstanceId(4));
        script.load_error = Some("boom".into());
        script.set_path("b.js");
        assert_eq!(script.path, "b.js");
        assert!(!script.loaded);
        assert!(script.instance.is_none());
        assert!(script.load_error.is_none());
    }
}
