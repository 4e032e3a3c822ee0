//! Engine functions bound into the script global scope.

use kiln_core::components::{BodyHandle, RigidBody, Transform};
use kiln_core::ecs::{EntityHandle, Registry};
use kiln_core::math::Vec2;
use kiln_physics::{bridge, PhysicsProvider, PhysicsWorld};
use kiln_services::{InputState, KeyCode};
use rquickjs::convert::Coerced;
use rquickjs::{Ctx, Function, Object};
use std::cell::RefCell;
use std::rc::Rc;

/// State the bound functions operate on. The caller's registry and
/// physics world are swapped in for the duration of a pass.
#[derive(Debug, Default)]
pub(crate) struct ScriptWorld {
    pub registry: Registry,
    pub physics: PhysicsWorld,
    pub input: InputState,
    pub log: Vec<String>,
}

pub(crate) type SharedWorld = Rc<RefCell<ScriptWorld>>;

fn handle(id: f64, generation: f64) -> EntityHandle {
    EntityHandle::new(id as u32, generation as u32)
}

fn vec2_object<'js>(ctx: Ctx<'js>, v: Vec2) -> rquickjs::Result<Object<'js>> {
    let obj = Object::new(ctx)?;
    obj.set("x", v.x)?;
    obj.set("y", v.y)?;
    Ok(obj)
}

/// Body of `entity`'s RigidBody, if it is still simulated.
fn live_body(world: &ScriptWorld, entity: EntityHandle) -> Option<BodyHandle> {
    world
        .registry
        .get::<RigidBody>(entity)
        .and_then(|rb| rb.body)
        .filter(|b| world.physics.is_valid(*b))
}

pub(crate) fn install<'js>(ctx: &Ctx<'js>, world: &SharedWorld) -> rquickjs::Result<()> {
    let globals = ctx.globals();

    // Input
    let w = world.clone();
    globals.set(
        "get_key",
        Function::new(ctx.clone(), move |code: f64| {
            w.borrow().input.key(KeyCode(code as u32))
        })?,
    )?;

    let w = world.clone();
    globals.set(
        "get_key_down",
        Function::new(ctx.clone(), move |code: f64| {
            w.borrow().input.key_down(KeyCode(code as u32))
        })?,
    )?;

    let w = world.clone();
    globals.set(
        "get_mouse_pos",
        Function::new(ctx.clone(), move |ctx: Ctx<'js>| {
            let position = w.borrow().input.mouse_position();
            vec2_object(ctx, position)
        })?,
    )?;

    let w = world.clone();
    globals.set(
        "get_mouse_button",
        Function::new(ctx.clone(), move |index: f64| {
            w.borrow().input.mouse_button(index as usize)
        })?,
    )?;

    // Components
    let w = world.clone();
    globals.set(
        "get_transform",
        Function::new(
            ctx.clone(),
            move |ctx: Ctx<'js>, id: f64, generation: f64| -> rquickjs::Result<Option<Object<'js>>> {
                let Some(t) = w.borrow().registry.get::<Transform>(handle(id, generation)).copied()
                else {
                    return Ok(None);
                };
                let obj = vec2_object(ctx, t.position)?;
                obj.set("rotation", t.rotation)?;
                Ok(Some(obj))
            },
        )?,
    )?;

    let w = world.clone();
    globals.set(
        "set_transform",
        Function::new(ctx.clone(), move |id: f64, generation: f64, x: f64, y: f64| {
            let mut world = w.borrow_mut();
            if let Some(t) = world.registry.get_mut::<Transform>(handle(id, generation)) {
                t.position = Vec2::new(x as f32, y as f32);
            }
        })?,
    )?;

    // Physics
    let w = world.clone();
    globals.set(
        "get_velocity",
        Function::new(
            ctx.clone(),
            move |ctx: Ctx<'js>, id: f64, generation: f64| -> rquickjs::Result<Option<Object<'js>>> {
                let velocity = {
                    let world = w.borrow();
                    live_body(&world, handle(id, generation))
                        .and_then(|body| world.physics.linear_velocity(body))
                };
                velocity.map(|v| vec2_object(ctx, v)).transpose()
            },
        )?,
    )?;

    let w = world.clone();
    globals.set(
        "set_velocity",
        Function::new(ctx.clone(), move |id: f64, generation: f64, vx: f64, vy: f64| {
            let mut world = w.borrow_mut();
            if let Some(body) = live_body(&world, handle(id, generation)) {
                world
                    .physics
                    .set_linear_velocity(body, Vec2::new(vx as f32, vy as f32));
            }
        })?,
    )?;

    let w = world.clone();
    globals.set(
        "apply_impulse",
        Function::new(ctx.clone(), move |id: f64, generation: f64, ix: f64, iy: f64| {
            let mut world = w.borrow_mut();
            if let Some(body) = live_body(&world, handle(id, generation)) {
                world
                    .physics
                    .apply_impulse(body, Vec2::new(ix as f32, iy as f32));
            }
        })?,
    )?;

    // Lifecycle
    let w = world.clone();
    globals.set(
        "destroy_entity",
        Function::new(ctx.clone(), move |id: f64, generation: f64| {
            let mut world = w.borrow_mut();
            let ScriptWorld {
                registry,
                physics,
                log,
                ..
            } = &mut *world;
            let entity = handle(id, generation);
            if bridge::despawn(registry, physics, entity) {
                log.push(format!("Entity {} destroyed by script", entity.index()));
            }
        })?,
    )?;

    let w = world.clone();
    globals.set(
        "log",
        Function::new(ctx.clone(), move |msg: Coerced<String>| {
            tracing::debug!(target: "kiln_script::log", "{}", msg.0);
            w.borrow_mut().log.push(format!("[Script] {}", msg.0));
        })?,
    )?;

    // Shared game state scripts may read and write freely.
    globals.set("game_over", false)?;
    globals.set("game_score", 0)?;

    Ok(())
}
