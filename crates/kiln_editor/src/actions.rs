//! Editor actions behind the hierarchy, inspector and viewport panels.
//!
//! Structural edits (create, delete, add component, create body) are
//! ignored while playing; the panels that offer them are hidden then.

use crate::{EditorApp, EditorMode};
use kiln_asset::TextureLoader;
use kiln_core::components::{BodyHandle, BodyType, RigidBody, Script, Sprite, Transform};
use kiln_core::ecs::{Component, EntityHandle};
use kiln_core::math::{aabb_contains, half_extents, Vec2, Vec4};
use kiln_physics::bridge;
use std::fmt;
use std::path::Path;

/// One-line summary for the status bar.
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub mode: EditorMode,
    pub scene_path: String,
    pub entities: usize,
    pub fps: f64,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Mode: {} | Scene: {} | Entities: {} | FPS: {:.0}",
            self.mode, self.scene_path, self.entities, self.fps
        )
    }
}

/// Viewport pixel to world position. The world origin sits at the
/// viewport centre with +y pointing up.
pub fn viewport_to_world(pixel: Vec2, viewport_center: Vec2) -> Vec2 {
    Vec2::new(pixel.x - viewport_center.x, viewport_center.y - pixel.y)
}

impl EditorApp {
    /// Red 100x100 box at the origin and a green 80x80 box at (150, 150).
    pub fn with_sample_scene(mut self) -> Self {
        let red = self.registry.create();
        self.registry.add(red, Transform::default());
        self.registry.add(
            red,
            Sprite::colored(Vec4::new(1.0, 0.2, 0.2, 1.0), Vec2::new(100.0, 100.0)),
        );

        let green = self.registry.create();
        self.registry
            .add(green, Transform::from_position(Vec2::new(150.0, 150.0)));
        self.registry.add(
            green,
            Sprite::colored(Vec4::new(0.2, 1.0, 0.2, 1.0), Vec2::new(80.0, 80.0)),
        );
        self
    }

    pub fn status(&self) -> Status {
        Status {
            mode: self.mode,
            scene_path: self.current_scene_path().display().to_string(),
            entities: self.registry.transforms.len(),
            fps: self.frame_timer().fps(),
        }
    }

    /// Selection, or [`EntityHandle::NULL`]. A selection whose entity has
    /// since been destroyed also reads as `NULL`.
    pub fn selected(&self) -> EntityHandle {
        if self.registry.valid(self.selected) {
            self.selected
        } else {
            EntityHandle::NULL
        }
    }

    pub fn select(&mut self, entity: EntityHandle) {
        self.selected = entity;
    }

    /// New entity with a default Transform, selected.
    pub fn create_entity(&mut self) -> Option<EntityHandle> {
        if self.is_playing() {
            return None;
        }
        let entity = self.registry.create();
        self.registry.add(entity, Transform::default());
        self.selected = entity;
        self.console.log(format!("Created entity {}", entity.index()));
        Some(entity)
    }

    /// Destroy the selection along with its simulation body.
    pub fn delete_selected(&mut self) -> bool {
        let entity = self.selected();
        if self.is_playing() || entity.is_null() {
            return false;
        }
        bridge::despawn(&mut self.registry, &mut self.physics, entity);
        self.selected = EntityHandle::NULL;
        self.console.log(format!("Deleted entity {}", entity.index()));
        true
    }

    /// Select the topmost Transform+Sprite entity under `point` (world
    /// space). Later entities draw on top, so the last hit wins. A miss
    /// clears the selection.
    pub fn pick(&mut self, point: Vec2) -> EntityHandle {
        let mut hit = EntityHandle::NULL;
        for (entity, t) in self.registry.transforms.iter() {
            let Some(sprite) = self.registry.sprites.get(entity) else {
                continue;
            };
            if aabb_contains(t.position, half_extents(sprite.size, t.scale), point) {
                hit = entity;
            }
        }
        self.selected = hit;
        hit
    }

    /// Attach a default-constructed component kind to the selection.
    /// Existing components are left as they are.
    pub fn add_component<T: Component>(&mut self, value: T) -> bool {
        let entity = self.selected();
        if self.is_playing() || entity.is_null() {
            return false;
        }
        self.registry.add(entity, value).is_some()
    }

    /// Materialize the selection's RigidBody.
    pub fn create_body_for_selected(&mut self) -> Option<BodyHandle> {
        let entity = self.selected();
        if self.is_playing() || entity.is_null() {
            return None;
        }
        let body = bridge::materialize(&mut self.registry, &mut self.physics, entity)?;
        self.console
            .log(format!("Created physics body for entity {}", entity.index()));
        Some(body)
    }

    /// Change a body type, updating a live body in place.
    pub fn set_body_type(&mut self, entity: EntityHandle, body_type: BodyType) {
        if let Some(rb) = self.registry.get_mut::<RigidBody>(entity) {
            rb.body_type = body_type;
            bridge::apply_body_config(&self.registry, &mut self.physics, entity);
        }
    }

    pub fn set_fixed_rotation(&mut self, entity: EntityHandle, fixed: bool) {
        if let Some(rb) = self.registry.get_mut::<RigidBody>(entity) {
            rb.fixed_rotation = fixed;
            bridge::apply_body_config(&self.registry, &mut self.physics, entity);
        }
    }

    /// Point a Script at a new source. It loads on the next play step.
    pub fn set_script_path(&mut self, entity: EntityHandle, path: impl Into<String>) -> bool {
        match self.registry.get_mut::<Script>(entity) {
            Some(script) => {
                script.set_path(path);
                true
            }
            None => false,
        }
    }

    /// Resolve a texture for `entity`'s Sprite. Failures leave the sprite
    /// untextured.
    pub fn set_sprite_texture(
        &mut self,
        entity: EntityHandle,
        path: impl AsRef<Path>,
        loader: &mut impl TextureLoader,
    ) -> bool {
        let path = path.as_ref();
        if !self.registry.has::<Sprite>(entity) {
            return false;
        }
        let texture = self.textures.resolve(path, &self.vfs, loader);
        if let Some(sprite) = self.registry.get_mut::<Sprite>(entity) {
            sprite.texture = texture;
        }
        match texture {
            Some(_) => self
                .console
                .log(format!("Texture loaded: {}", path.display())),
            None => self
                .console
                .log(format!("Failed to load texture: {}", path.display())),
        }
        texture.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::components::{Camera, TextureHandle};
    use kiln_physics::PhysicsProvider;
    use kiln_services::Settings;

    fn app() -> EditorApp {
        EditorApp::new(Settings::default()).unwrap().with_sample_scene()
    }

    #[test]
    fn pick_prefers_last_hit_and_clears_on_miss() {
        let mut app = app();
        let [red, green] = [0, 1].map(|i| app.registry().transforms.handles()[i]);

        assert_eq!(app.pick(Vec2::new(10.0, -10.0)), red);
        assert_eq!(app.pick(Vec2::new(150.0, 150.0)), green);

        // Overlap: move green onto red; green is later in dense order.
        app.registry_mut().get_mut::<Transform>(green).unwrap().position = Vec2::new(20.0, 0.0);
        assert_eq!(app.pick(Vec2::new(10.0, 0.0)), green);

        assert_eq!(app.pick(Vec2::new(1000.0, 1000.0)), EntityHandle::NULL);
        assert_eq!(app.selected(), EntityHandle::NULL);
    }

    #[test]
    fn pick_respects_scale() {
        let mut app = app();
        let red = app.registry().transforms.handles()[0];
        app.registry_mut().get_mut::<Transform>(red).unwrap().scale = Vec2::new(2.0, 1.0);
        assert_eq!(app.pick(Vec2::new(90.0, 0.0)), red);
        assert_eq!(app.pick(Vec2::new(0.0, 60.0)), EntityHandle::NULL);
    }

    #[test]
    fn viewport_pixels_map_to_world() {
        let center = Vec2::new(400.0, 300.0);
        assert_eq!(viewport_to_world(center, center), Vec2::ZERO);
        assert_eq!(
            viewport_to_world(Vec2::new(550.0, 150.0), center),
            Vec2::new(150.0, 150.0)
        );
    }

    #[test]
    fn create_and_delete_entities() {
        let mut app = app();
        let e = app.create_entity().unwrap();
        assert_eq!(app.selected(), e);
        assert!(app.registry().has::<Transform>(e));
        assert_eq!(app.status().entities, 3);

        assert!(app.add_component(RigidBody::new(BodyType::Dynamic)));
        assert!(app.add_component(Camera::default()));
        let body = app.create_body_for_selected().unwrap();
        assert_eq!(app.physics().body_count(), 1);

        assert!(app.delete_selected());
        assert!(!app.registry().valid(e));
        assert!(!app.physics().is_valid(body));
        assert_eq!(app.selected(), EntityHandle::NULL);
        assert!(!app.delete_selected());
        assert_eq!(app.console().last(), Some(format!("Deleted entity {}", e.index()).as_str()));
    }

    #[test]
    fn structural_edits_are_ignored_while_playing() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.editor.snapshot_path = dir.path().join("snap.txt");
        let mut app = EditorApp::new(settings).unwrap().with_sample_scene();
        let red = app.registry().transforms.handles()[0];
        app.select(red);

        app.play().unwrap();
        assert!(app.create_entity().is_none());
        assert!(!app.add_component(RigidBody::default()));
        assert!(app.create_body_for_selected().is_none());
        assert!(!app.delete_selected());
        assert_eq!(app.registry().transforms.len(), 2);
    }

    #[test]
    fn body_config_reaches_live_body() {
        let mut app = app();
        let red = app.registry().transforms.handles()[0];
        app.select(red);
        app.add_component(RigidBody::new(BodyType::Static));
        let body = app.create_body_for_selected().unwrap();

        app.set_body_type(red, BodyType::Dynamic);
        app.set_fixed_rotation(red, true);
        let rb = app.registry().get::<RigidBody>(red).unwrap();
        assert_eq!(rb.body_type, BodyType::Dynamic);
        assert!(rb.fixed_rotation);

        app.physics.step(1.0 / 60.0);
        assert!(app.physics().body_pose(body).unwrap().0.y < 0.0);
    }

    #[test]
    fn set_script_path_resets_load_state() {
        let mut app = app();
        let red = app.registry().transforms.handles()[0];
        app.registry_mut().add(red, Script::new("a.js"));
        app.registry_mut().get_mut::<Script>(red).unwrap().load_error = Some("bad".into());

        assert!(app.set_script_path(red, "b.js"));
        let script = app.registry().get::<Script>(red).unwrap();
        assert_eq!(script.path, "b.js");
        assert!(script.load_error.is_none());

        let green = app.registry().transforms.handles()[1];
        assert!(!app.set_script_path(green, "c.js"));
    }

    struct AcceptAll;

    impl TextureLoader for AcceptAll {
        fn load(&mut self, _: TextureHandle, _: &Path, _: &[u8]) -> Result<(), String> {
            Ok(())
        }
    }

    #[test]
    fn sprite_texture_from_vfs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("crate.png"), b"png").unwrap();
        let mut settings = Settings::default();
        settings.vfs.mounts = vec![dir.path().to_path_buf()];
        let mut app = EditorApp::new(settings).unwrap().with_sample_scene();
        let red = app.registry().transforms.handles()[0];

        assert!(app.set_sprite_texture(red, "crate.png", &mut AcceptAll));
        assert!(app.registry().get::<Sprite>(red).unwrap().texture.is_some());

        assert!(!app.set_sprite_texture(red, "missing.png", &mut AcceptAll));
        assert!(app.registry().get::<Sprite>(red).unwrap().texture.is_none());
        assert_eq!(app.console().last(), Some("Failed to load texture: missing.png"));
    }

    #[test]
    fn status_line() {
        let app = app();
        let status = app.status();
        assert_eq!(status.mode, EditorMode::Editing);
        assert_eq!(status.entities, 2);
        assert!(status.to_string().starts_with("Mode: Edit | Scene: scene.txt | Entities: 2"));
    }
}
