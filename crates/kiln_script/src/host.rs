//! Script runtime and the per-step script pass.

use crate::api::{self, ScriptWorld, SharedWorld};
use crate::{ScriptError, ScriptInstance};
use kiln_core::components::{Script, ScriptInstanceId};
use kiln_core::ecs::{EntityHandle, Registry};
use kiln_physics::PhysicsWorld;
use kiln_services::{InputState, Vfs};
use rquickjs::function::This;
use rquickjs::{CatchResultExt, Context, Ctx, Function, Object, Persistent, Runtime, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A loaded script: the object its top level returned plus the `self`
/// environment it was given.
pub(crate) struct Instance {
    pub entity: EntityHandle,
    pub path: PathBuf,
    pub object: Persistent<Object<'static>>,
    env: Persistent<Object<'static>>,
}

/// What one script pass did.
#[derive(Debug, Default)]
pub struct ScriptReport {
    pub loaded: usize,
    pub updated: usize,
    pub failures: Vec<ScriptError>,
    /// Lines from `log()` and other user-visible script events, in order.
    pub log: Vec<String>,
}

/// Owns the JavaScript runtime and every live script instance.
pub struct ScriptHost {
    // Instances hold runtime values and must drop before the context.
    instances: HashMap<ScriptInstanceId, Instance>,
    context: Context,
    #[allow(dead_code)] // Kept alive for context lifetime
    runtime: Runtime,
    world: SharedWorld,
    vfs: Vfs,
    next_id: u32,
}

impl ScriptHost {
    pub fn new(vfs: Vfs) -> Result<Self, ScriptError> {
        let runtime = Runtime::new().map_err(ScriptError::Runtime)?;
        let context = Context::full(&runtime).map_err(ScriptError::Runtime)?;
        let world = SharedWorld::default();
        context
            .with(|ctx| api::install(&ctx, &world))
            .map_err(ScriptError::Runtime)?;

        Ok(Self {
            instances: HashMap::new(),
            context,
            runtime,
            world,
            vfs,
            next_id: 0,
        })
    }

    pub(crate) fn context(&self) -> &Context {
        &self.context
    }

    pub fn instance(&self, id: ScriptInstanceId) -> Option<ScriptInstance<'_>> {
        self.instances
            .get(&id)
            .map(|instance| ScriptInstance::new(self, id, instance))
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Drop every instance. Script components that referenced them will
    /// load again from scratch.
    pub fn clear(&mut self) {
        if !self.instances.is_empty() {
            tracing::debug!(count = self.instances.len(), "script instances dropped");
        }
        self.instances.clear();
    }

    /// Run one fixed step of scripts.
    ///
    /// Each Script component in dense order is loaded if needed (running
    /// `init` once) and then has `update(dt)` called. Failures are collected
    /// in the report and never stop the pass. Instances whose entity or
    /// Script component went away are dropped afterwards.
    pub fn update(
        &mut self,
        registry: &mut Registry,
        physics: &mut PhysicsWorld,
        input: &InputState,
        dt: f32,
    ) -> ScriptReport {
        let mut report = ScriptReport::default();
        let lease = Lease::new(self.world.clone(), registry, physics, input);

        let entities = self.world.borrow().registry.entities_with::<Script>();
        for entity in entities {
            self.run_script(entity, dt, &mut report);
        }
        self.prune();
        report.log = std::mem::take(&mut self.world.borrow_mut().log);

        drop(lease);
        for failure in &report.failures {
            tracing::warn!("{failure}");
        }
        report
    }

    fn run_script(&mut self, entity: EntityHandle, dt: f32, report: &mut ScriptReport) {
        // Earlier scripts in the pass may have destroyed this entity.
        let state = self.world.borrow().registry.get::<Script>(entity).map(|s| {
            let needs_load = !s.loaded && s.load_error.is_none() && !s.path.is_empty();
            (PathBuf::from(&s.path), needs_load, s.instance)
        });
        let Some((path, needs_load, instance)) = state else {
            return;
        };

        let id = if needs_load {
            match self.load(entity, &path) {
                Ok(id) => {
                    report.loaded += 1;
                    if let Err(err) = self.call_hook(id, entity, "init", None) {
                        report.failures.push(err);
                    }
                    id
                }
                Err(err) => {
                    let mut world = self.world.borrow_mut();
                    if let Some(script) = world.registry.get_mut::<Script>(entity) {
                        script.load_error = Some(err.to_string());
                    }
                    drop(world);
                    report.failures.push(err);
                    return;
                }
            }
        } else {
            match instance {
                Some(id) if self.instances.contains_key(&id) => id,
                _ => return,
            }
        };

        match self.call_hook(id, entity, "update", Some(dt)) {
            Ok(()) => report.updated += 1,
            Err(err) => report.failures.push(err),
        }
    }

    fn load(&mut self, entity: EntityHandle, path: &Path) -> Result<ScriptInstanceId, ScriptError> {
        let source = self
            .vfs
            .read_to_string(path)
            .map_err(|source| ScriptError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let wrapped = format!("(function(self) {{\n{source}\n}})");

        let (object, env) = self
            .context
            .with(|ctx| {
                let result = instantiate(&ctx, &wrapped, entity).map(|(object, env)| {
                    (Persistent::save(&ctx, object), Persistent::save(&ctx, env))
                });
                result.catch(&ctx).map_err(|err| err.to_string())
            })
            .map_err(|message| ScriptError::Eval {
                path: path.to_path_buf(),
                message,
            })?;

        let id = ScriptInstanceId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.instances.insert(
            id,
            Instance {
                entity,
                path: path.to_path_buf(),
                object,
                env,
            },
        );

        if let Some(script) = self.world.borrow_mut().registry.get_mut::<Script>(entity) {
            script.loaded = true;
            script.instance = Some(id);
            script.entity = entity;
        }
        tracing::info!(%entity, path = %path.display(), "script loaded");
        Ok(id)
    }

    /// Call `init()` or `update(dt)` with `this` bound to the instance.
    /// Missing hooks are fine.
    fn call_hook(
        &self,
        id: ScriptInstanceId,
        entity: EntityHandle,
        hook: &str,
        dt: Option<f32>,
    ) -> Result<(), ScriptError> {
        let Some(instance) = self.instances.get(&id) else {
            return Ok(());
        };
        self.context
            .with(|ctx| {
                let result = invoke_hook(&ctx, instance, entity, hook, dt);
                result.catch(&ctx).map_err(|err| err.to_string())
            })
            .map_err(|message| ScriptError::Call {
                path: instance.path.clone(),
                function: format!("{hook}()"),
                message,
            })
    }

    fn prune(&mut self) {
        let world = self.world.borrow();
        let before = self.instances.len();
        self.instances.retain(|id, instance| {
            world
                .registry
                .get::<Script>(instance.entity)
                .is_some_and(|s| s.instance == Some(*id))
        });
        let dropped = before - self.instances.len();
        if dropped > 0 {
            tracing::debug!(dropped, "stale script instances dropped");
        }
    }
}

impl std::fmt::Debug for ScriptHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptHost")
            .field("instances", &self.instances.len())
            .field("vfs", &self.vfs)
            .finish()
    }
}

/// Run the wrapped source and return the script's object and its `self`.
fn instantiate<'js>(
    ctx: &Ctx<'js>,
    wrapped: &str,
    entity: EntityHandle,
) -> rquickjs::Result<(Object<'js>, Object<'js>)> {
    let env = Object::new(ctx.clone())?;
    env.set("entity_id", entity.index())?;
    env.set("entity_generation", entity.generation())?;

    let factory: Function = ctx.eval(wrapped)?;
    let returned: Value = factory.call((env.clone(),))?;
    match returned.into_object() {
        Some(object) => Ok((object, env)),
        None => Err(rquickjs::Exception::throw_type(
            ctx,
            "script must return an object",
        )),
    }
}

fn invoke_hook<'js>(
    ctx: &Ctx<'js>,
    instance: &Instance,
    entity: EntityHandle,
    hook: &str,
    dt: Option<f32>,
) -> rquickjs::Result<()> {
    let object = instance.object.clone().restore(ctx)?;
    let Some(function) = object.get::<_, Value>(hook)?.into_function() else {
        return Ok(());
    };
    match dt {
        Some(dt) => {
            let env = instance.env.clone().restore(ctx)?;
            env.set("entity_generation", entity.generation())?;
            function.call::<_, Value>((This(object), dt))?;
        }
        None => {
            function.call::<_, Value>((This(object),))?;
        }
    }
    Ok(())
}

/// Moves the caller's registry and physics world into the shared world for
/// the length of a pass, and back again on drop.
struct Lease<'a> {
    world: SharedWorld,
    registry: &'a mut Registry,
    physics: &'a mut PhysicsWorld,
}

impl<'a> Lease<'a> {
    fn new(
        world: SharedWorld,
        registry: &'a mut Registry,
        physics: &'a mut PhysicsWorld,
        input: &InputState,
    ) -> Self {
        {
            let mut shared = world.borrow_mut();
            std::mem::swap(&mut shared.registry, registry);
            std::mem::swap(&mut shared.physics, physics);
            shared.input = input.clone();
        }
        Self {
            world,
            registry,
            physics,
        }
    }
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        if let Ok(mut shared) = self.world.try_borrow_mut() {
            let ScriptWorld {
                registry, physics, ..
            } = &mut *shared;
            std::mem::swap(registry, self.registry);
            std::mem::swap(physics, self.physics);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::components::{BodyType, RigidBody, Transform};
    use kiln_physics::{bridge, PhysicsProvider};
    use kiln_services::{InputEvent, KeyCode};
    use serde_json::{json, Value as Json};

    const DT: f32 = 1.0 / 60.0;

    fn host_with(files: &[(&str, &str)]) -> (tempfile::TempDir, ScriptHost) {
        let dir = tempfile::tempdir().unwrap();
        for (name, source) in files {
            std::fs::write(dir.path().join(name), source).unwrap();
        }
        let host = ScriptHost::new(Vfs::with_mounts([dir.path()])).unwrap();
        (dir, host)
    }

    fn scripted(registry: &mut Registry, path: &str) -> EntityHandle {
        let e = registry.create();
        registry.add(e, Transform::default());
        registry.add(e, Script::new(path));
        e
    }

    fn instance_of(registry: &Registry, e: EntityHandle) -> ScriptInstanceId {
        registry.get::<Script>(e).unwrap().instance.unwrap()
    }

    const MOVER: &str = r#"
        let steps = 0;
        return {
            started: false,
            init() { this.started = true; },
            update(dt) {
                steps += 1;
                const t = get_transform(self.entity_id, self.entity_generation);
                set_transform(self.entity_id, self.entity_generation, t.x + 10, t.y);
                this.steps = steps;
            },
        };
    "#;

    #[test]
    fn init_runs_once_and_update_every_step() {
        let (_dir, mut host) = host_with(&[("mover.js", MOVER)]);
        let mut registry = Registry::new();
        let mut physics = PhysicsWorld::default();
        let e = scripted(&mut registry, "mover.js");
        let input = InputState::new();

        let first = host.update(&mut registry, &mut physics, &input, DT);
        assert_eq!(first.loaded, 1);
        assert_eq!(first.updated, 1);
        for _ in 0..2 {
            let report = host.update(&mut registry, &mut physics, &input, DT);
            assert_eq!(report.loaded, 0);
            assert!(report.failures.is_empty());
        }

        assert_eq!(registry.get::<Transform>(e).unwrap().position.x, 30.0);
        let script = registry.get::<Script>(e).unwrap();
        assert!(script.loaded);
        assert_eq!(script.entity, e);

        let instance = host.instance(instance_of(&registry, e)).unwrap();
        assert_eq!(instance.entity(), e);
        assert_eq!(instance.get_field("started").unwrap(), json!(true));
        assert_eq!(instance.get_field("steps").unwrap(), json!(3));
    }

    #[test]
    fn throwing_script_does_not_stop_others() {
        let (_dir, mut host) = host_with(&[
            ("broken.js", r#"return { update() { throw new Error("boom"); } };"#),
            ("mover.js", MOVER),
        ]);
        let mut registry = Registry::new();
        let mut physics = PhysicsWorld::default();
        let broken = scripted(&mut registry, "broken.js");
        let mover = scripted(&mut registry, "mover.js");

        for _ in 0..2 {
            let report = host.update(&mut registry, &mut physics, &InputState::new(), DT);
            assert_eq!(report.failures.len(), 1);
            match &report.failures[0] {
                ScriptError::Call { function, message, .. } => {
                    assert_eq!(function, "update()");
                    assert!(message.contains("boom"));
                }
                other => panic!("unexpected failure {other:?}"),
            }
        }
        assert!(registry.get::<Script>(broken).unwrap().loaded);
        assert_eq!(registry.get::<Transform>(mover).unwrap().position.x, 20.0);
    }

    #[test]
    fn load_failures_are_not_retried_until_path_changes() {
        let (_dir, mut host) = host_with(&[
            ("syntax.js", "return {"),
            ("number.js", "return 5;"),
            ("mover.js", MOVER),
        ]);
        let mut registry = Registry::new();
        let mut physics = PhysicsWorld::default();
        let syntax = scripted(&mut registry, "syntax.js");
        let number = scripted(&mut registry, "number.js");
        let missing = scripted(&mut registry, "missing.js");
        let input = InputState::new();

        let report = host.update(&mut registry, &mut physics, &input, DT);
        assert_eq!(report.failures.len(), 3);
        assert!(matches!(report.failures[0], ScriptError::Eval { .. }));
        assert!(matches!(report.failures[1], ScriptError::Eval { .. }));
        assert!(matches!(report.failures[2], ScriptError::Read { .. }));
        for e in [syntax, number, missing] {
            let script = registry.get::<Script>(e).unwrap();
            assert!(!script.loaded);
            assert!(script.load_error.is_some());
        }

        let report = host.update(&mut registry, &mut physics, &input, DT);
        assert!(report.failures.is_empty());
        assert_eq!(host.instance_count(), 0);

        registry.get_mut::<Script>(syntax).unwrap().set_path("mover.js");
        let report = host.update(&mut registry, &mut physics, &input, DT);
        assert_eq!(report.loaded, 1);
        assert_eq!(registry.get::<Transform>(syntax).unwrap().position.x, 10.0);
    }

    #[test]
    fn script_can_destroy_its_own_entity() {
        let (_dir, mut host) = host_with(&[(
            "suicide.js",
            r#"return { update() { destroy_entity(self.entity_id, self.entity_generation); log("bye"); } };"#,
        )]);
        let mut registry = Registry::new();
        let mut physics = PhysicsWorld::default();
        let e = scripted(&mut registry, "suicide.js");
        registry.add(e, RigidBody::new(BodyType::Dynamic));
        let body = bridge::materialize(&mut registry, &mut physics, e).unwrap();

        let report = host.update(&mut registry, &mut physics, &InputState::new(), DT);
        assert!(report.failures.is_empty());
        assert!(!registry.valid(e));
        assert!(!physics.is_valid(body));
        assert_eq!(host.instance_count(), 0);
        assert_eq!(
            report.log,
            vec!["Entity 0 destroyed by script".to_string(), "[Script] bye".to_string()]
        );
    }

    #[test]
    fn input_and_velocity_bindings() {
        let (_dir, mut host) = host_with(&[(
            "jump.js",
            r#"
            return {
                vy: null,
                update() {
                    const id = self.entity_id, gen = self.entity_generation;
                    if (get_key_down(32)) set_velocity(id, gen, 0, 50);
                    const v = get_velocity(id, gen);
                    this.vy = v ? v.y : null;
                    this.stale = get_transform(id, gen + 1) === undefined;
                },
            };
            "#,
        )]);
        let mut registry = Registry::new();
        let mut physics = PhysicsWorld::new(kiln_core::math::Vec2::ZERO, 4);
        let e = scripted(&mut registry, "jump.js");
        registry.add(e, RigidBody::new(BodyType::Dynamic));
        bridge::materialize(&mut registry, &mut physics, e);

        let mut input = InputState::new();
        input.handle(InputEvent::KeyDown(KeyCode::SPACE));
        let report = host.update(&mut registry, &mut physics, &input, DT);
        assert!(report.failures.is_empty(), "{:?}", report.failures);

        let instance = host.instance(instance_of(&registry, e)).unwrap();
        assert_eq!(instance.get_field("vy").unwrap().as_f64(), Some(50.0));
        assert_eq!(instance.get_field("stale").unwrap(), json!(true));
    }

    #[test]
    fn instance_capability_object() {
        let (_dir, mut host) = host_with(&[(
            "calc.js",
            "return { bias: 1, add(a, b) { return a + b + this.bias; } };",
        )]);
        let mut registry = Registry::new();
        let mut physics = PhysicsWorld::default();
        let e = scripted(&mut registry, "calc.js");
        host.update(&mut registry, &mut physics, &InputState::new(), DT);

        let instance = host.instance(instance_of(&registry, e)).unwrap();
        assert_eq!(instance.call("add", &[json!(2), json!(3)]).unwrap(), json!(6));
        instance.set_field("bias", &json!(10)).unwrap();
        assert_eq!(instance.call("add", &[json!(2), json!(3)]).unwrap(), json!(15));
        assert_eq!(instance.call("missing", &[]).unwrap(), Json::Null);
        assert_eq!(instance.get_field("nothing").unwrap(), Json::Null);

        instance
            .set_field("config", &json!({"name": "calc", "tags": ["a", "b"]}))
            .unwrap();
        assert_eq!(
            instance.get_field("config").unwrap(),
            json!({"name": "calc", "tags": ["a", "b"]})
        );
    }

    #[test]
    fn removed_script_component_drops_instance() {
        let (_dir, mut host) = host_with(&[("mover.js", MOVER)]);
        let mut registry = Registry::new();
        let mut physics = PhysicsWorld::default();
        let e = scripted(&mut registry, "mover.js");
        let input = InputState::new();

        host.update(&mut registry, &mut physics, &input, DT);
        assert_eq!(host.instance_count(), 1);
        registry.remove::<Script>(e);
        host.update(&mut registry, &mut physics, &input, DT);
        assert_eq!(host.instance_count(), 0);

        // The registry is handed back intact after every pass.
        assert!(registry.valid(e));
        assert!(registry.has::<Transform>(e));
    }
}
