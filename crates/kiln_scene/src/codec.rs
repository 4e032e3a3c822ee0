use crate::SceneError;
use kiln_core::components::{BodyType, Camera, RigidBody, Script, Sprite, Transform};
use kiln_core::ecs::{EntityHandle, Registry};
use kiln_core::math::{Vec2, Vec4};
use kiln_physics::{bridge, PhysicsProvider};
use kiln_services::Vfs;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

/// First line of every saved scene.
pub const HEADER: &str = "# Scene File";

/// Outcome of a save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveReport {
    pub entities: usize,
}

/// Outcome of a load. `malformed` counts rejected component lines; each one
/// also cost the rest of its entity block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub entities: usize,
    pub bodies: usize,
    pub scripts: usize,
    pub malformed: usize,
    pub unknown: usize,
}

/// Write every Transform-bearing entity of `registry` to `path`.
///
/// Not atomic: a failure part way through leaves a truncated file.
pub fn save(path: impl AsRef<Path>, registry: &Registry) -> Result<SaveReport, SceneError> {
    let path = path.as_ref();
    let write_err = |source| SceneError::Write {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(write_err)?;
    let mut out = BufWriter::new(file);
    let report = write_scene(&mut out, registry).map_err(write_err)?;
    out.flush().map_err(write_err)?;

    tracing::info!(path = %path.display(), entities = report.entities, "scene saved");
    Ok(report)
}

/// Serialize to any writer. Floats use the shortest representation that
/// parses back to the same value.
pub fn write_scene(out: &mut impl Write, registry: &Registry) -> io::Result<SaveReport> {
    writeln!(out, "{HEADER}")?;
    let mut report = SaveReport::default();

    for (entity, t) in registry.transforms.iter() {
        writeln!(out, "entity")?;
        writeln!(
            out,
            "  transform {} {} {} {} {}",
            t.position.x, t.position.y, t.rotation, t.scale.x, t.scale.y
        )?;

        if let Some(s) = registry.sprites.get(entity) {
            writeln!(
                out,
                "  sprite {} {} {} {} {} {}",
                s.color.x, s.color.y, s.color.z, s.color.w, s.size.x, s.size.y
            )?;
        }

        if let Some(rb) = registry.rigid_bodies.get(entity) {
            writeln!(
                out,
                "  rigidbody {} {} {} {} {}",
                rb.body_type.as_index(),
                u8::from(rb.fixed_rotation),
                rb.density,
                rb.friction,
                rb.restitution
            )?;
        }

        if let Some(script) = registry.scripts.get(entity) {
            if !script.path.is_empty() {
                writeln!(out, "  script {}", script.path)?;
            }
        }

        if let Some(c) = registry.cameras.get(entity) {
            writeln!(out, "  camera {} {} {}", c.zoom, c.offset.x, c.offset.y)?;
        }

        report.entities += 1;
    }
    Ok(report)
}

/// Read a scene file: mounted roots first, then the path as given. An
/// unreadable file and a file with nothing but whitespace are both errors.
pub fn read_source(path: impl AsRef<Path>, vfs: &Vfs) -> Result<String, SceneError> {
    let path = path.as_ref();
    let text = vfs.read_to_string(path).map_err(|source| SceneError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if text.trim().is_empty() {
        return Err(SceneError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(text)
}

/// Read `path` and add its entities to `registry`. The registry is left
/// untouched when the file cannot be read or is empty.
pub fn load<P: PhysicsProvider + ?Sized>(
    path: impl AsRef<Path>,
    vfs: &Vfs,
    registry: &mut Registry,
    physics: &mut P,
) -> Result<LoadReport, SceneError> {
    let path = path.as_ref();
    let text = read_source(path, vfs)?;
    let report = load_str(&text, registry, physics);
    tracing::info!(
        path = %path.display(),
        entities = report.entities,
        malformed = report.malformed,
        "scene loaded"
    );
    Ok(report)
}

/// Parse scene text into `registry`, creating a fresh simulation body for
/// every `rigidbody` line.
///
/// A component line that is short, non-numeric, or carries an unknown body
/// type is rejected together with the rest of its entity block; the entity
/// keeps what was parsed before it.
pub fn load_str<P: PhysicsProvider + ?Sized>(
    text: &str,
    registry: &mut Registry,
    physics: &mut P,
) -> LoadReport {
    let mut loader = Loader {
        registry,
        physics,
        report: LoadReport::default(),
        current: None,
        skipping: false,
        needs_body: false,
    };
    for (index, line) in text.lines().enumerate() {
        loader.line(index + 1, line);
    }
    loader.finish_entity();
    loader.report
}

struct Loader<'a, P: ?Sized> {
    registry: &'a mut Registry,
    physics: &'a mut P,
    report: LoadReport,
    current: Option<EntityHandle>,
    /// Set after a rejected line until the next `entity`.
    skipping: bool,
    needs_body: bool,
}

impl<P: PhysicsProvider + ?Sized> Loader<'_, P> {
    fn line(&mut self, number: usize, raw: &str) {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            return;
        }
        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            return;
        };

        if keyword == "entity" {
            self.finish_entity();
            self.current = Some(self.registry.create());
            self.skipping = false;
            self.report.entities += 1;
            return;
        }

        let Some(entity) = self.current else {
            return;
        };
        if self.skipping {
            return;
        }

        let accepted = match keyword {
            "transform" => parse_floats::<5>(tokens).map(|[px, py, rot, sx, sy]| {
                self.registry.add(
                    entity,
                    Transform {
                        position: Vec2::new(px, py),
                        rotation: rot,
                        scale: Vec2::new(sx, sy),
                        ..Transform::default()
                    },
                );
            }),
            "sprite" => parse_floats::<6>(tokens).map(|[r, g, b, a, w, h]| {
                self.registry.add(
                    entity,
                    Sprite::colored(Vec4::new(r, g, b, a), Vec2::new(w, h)),
                );
            }),
            "rigidbody" => parse_rigid_body(tokens).map(|rb| {
                self.registry.add(entity, rb);
                self.needs_body = true;
            }),
            "camera" => parse_floats::<3>(tokens).map(|[zoom, x, y]| {
                self.registry.add(
                    entity,
                    Camera {
                        zoom,
                        offset: Vec2::new(x, y),
                    },
                );
            }),
            "script" => {
                let path = line[keyword.len()..].trim();
                (!path.is_empty()).then(|| {
                    self.registry.add(
                        entity,
                        Script {
                            entity,
                            ..Script::new(path)
                        },
                    );
                    self.report.scripts += 1;
                })
            }
            _ => {
                tracing::debug!(line = number, keyword, "unknown scene keyword skipped");
                self.report.unknown += 1;
                return;
            }
        };

        if accepted.is_none() {
            tracing::warn!(
                line = number,
                %entity,
                text = line,
                "malformed scene line, skipping rest of entity"
            );
            self.report.malformed += 1;
            self.skipping = true;
        }
    }

    /// Bodies are created once the whole block is known, so the body sees
    /// the final Transform and Sprite regardless of line order.
    fn finish_entity(&mut self) {
        let Some(entity) = self.current.take() else {
            return;
        };
        if !std::mem::take(&mut self.needs_body) {
            return;
        }
        // Entities without a Transform are never saved or torn down, so a
        // body for one would outlive every reload.
        if !self.registry.has::<Transform>(entity) {
            tracing::warn!(%entity, "rigidbody without transform left unsimulated");
            return;
        }
        if bridge::materialize(self.registry, self.physics, entity).is_some() {
            self.report.bodies += 1;
        }
    }
}

fn parse_floats<'a, const N: usize>(mut tokens: impl Iterator<Item = &'a str>) -> Option<[f32; N]> {
    let mut values = [0.0; N];
    for value in &mut values {
        *value = tokens.next()?.parse().ok()?;
    }
    Some(values)
}

fn parse_token<'a, T: FromStr>(tokens: &mut impl Iterator<Item = &'a str>) -> Option<T> {
    tokens.next()?.parse().ok()
}

fn parse_rigid_body<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Option<RigidBody> {
    let body_type = BodyType::from_index(parse_token(&mut tokens)?)?;
    let fixed_rotation = parse_token::<i64>(&mut tokens)? != 0;
    let [density, friction, restitution] = parse_floats::<3>(tokens)?;
    Some(RigidBody {
        body: None,
        body_type,
        fixed_rotation,
        density,
        friction,
        restitution,
    })
}
