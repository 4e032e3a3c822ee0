//! Host-side view of one loaded script.

use crate::host::{Instance, ScriptHost};
use crate::ScriptError;
use kiln_core::components::ScriptInstanceId;
use kiln_core::ecs::EntityHandle;
use rquickjs::function::{Rest, This};
use rquickjs::{Array, CatchResultExt, Ctx, Object, Value};
use serde_json::{Map, Number, Value as Json};

/// Capability object for a live script instance. Values cross the boundary
/// as JSON; functions and other non-data values read as `null`.
///
/// Engine functions called from here run against the host's idle world, so
/// entity lookups inside them find nothing until the next script pass.
pub struct ScriptInstance<'h> {
    host: &'h ScriptHost,
    id: ScriptInstanceId,
    instance: &'h Instance,
}

impl<'h> ScriptInstance<'h> {
    pub(crate) fn new(host: &'h ScriptHost, id: ScriptInstanceId, instance: &'h Instance) -> Self {
        Self { host, id, instance }
    }

    pub fn id(&self) -> ScriptInstanceId {
        self.id
    }

    pub fn entity(&self) -> EntityHandle {
        self.instance.entity
    }

    /// Field of the object the script returned; missing fields are `null`.
    pub fn get_field(&self, name: &str) -> Result<Json, ScriptError> {
        self.with_object(name, |_, object| {
            let value: Value = object.get(name)?;
            to_json(&value)
        })
    }

    pub fn set_field(&self, name: &str, value: &Json) -> Result<(), ScriptError> {
        self.with_object(name, |ctx, object| object.set(name, from_json(ctx, value)?))
    }

    /// Call a method with `this` bound to the instance. Calling a missing
    /// method returns `null`.
    pub fn call(&self, name: &str, args: &[Json]) -> Result<Json, ScriptError> {
        self.with_object(name, |ctx, object| {
            let Some(function) = object.get::<_, Value>(name)?.into_function() else {
                return Ok(Json::Null);
            };
            let args = args
                .iter()
                .map(|arg| from_json(ctx, arg))
                .collect::<rquickjs::Result<Vec<_>>>()?;
            let result: Value = function.call((This(object.clone()), Rest(args)))?;
            to_json(&result)
        })
    }

    fn with_object<R>(
        &self,
        name: &str,
        f: impl for<'js> FnOnce(&Ctx<'js>, Object<'js>) -> rquickjs::Result<R>,
    ) -> Result<R, ScriptError> {
        self.host
            .context()
            .with(|ctx| {
                let result = self
                    .instance
                    .object
                    .clone()
                    .restore(&ctx)
                    .and_then(|object| f(&ctx, object));
                result.catch(&ctx).map_err(|err| err.to_string())
            })
            .map_err(|message| ScriptError::Call {
                path: self.instance.path.clone(),
                function: name.to_string(),
                message,
            })
    }
}

pub(crate) fn to_json(value: &Value<'_>) -> rquickjs::Result<Json> {
    if let Some(b) = value.as_bool() {
        return Ok(Json::Bool(b));
    }
    if let Some(i) = value.as_int() {
        return Ok(Json::from(i));
    }
    if let Some(f) = value.as_float() {
        return Ok(Number::from_f64(f).map_or(Json::Null, Json::Number));
    }
    if let Some(s) = value.as_string() {
        return Ok(Json::String(s.to_string()?));
    }
    if let Some(array) = value.as_array() {
        return array
            .iter::<Value>()
            .map(|item| to_json(&item?))
            .collect::<rquickjs::Result<Vec<_>>>()
            .map(Json::Array);
    }
    if value.is_function() {
        return Ok(Json::Null);
    }
    if let Some(object) = value.as_object() {
        let mut map = Map::new();
        for prop in object.props::<String, Value>() {
            let (key, item) = prop?;
            map.insert(key, to_json(&item)?);
        }
        return Ok(Json::Object(map));
    }
    Ok(Json::Null)
}

pub(crate) fn from_json<'js>(ctx: &Ctx<'js>, value: &Json) -> rquickjs::Result<Value<'js>> {
    Ok(match value {
        Json::Null => Value::new_null(ctx.clone()),
        Json::Bool(b) => Value::new_bool(ctx.clone(), *b),
        Json::Number(n) => Value::new_number(ctx.clone(), n.as_f64().unwrap_or_default()),
        Json::String(s) => rquickjs::String::from_str(ctx.clone(), s)?.into_value(),
        Json::Array(items) => {
            let array = Array::new(ctx.clone())?;
            for (index, item) in items.iter().enumerate() {
                array.set(index, from_json(ctx, item)?)?;
            }
            array.into_value()
        }
        Json::Object(map) => {
            let object = Object::new(ctx.clone())?;
            for (key, item) in map {
                object.set(key.as_str(), from_json(ctx, item)?)?;
            }
            object.into_value()
        }
    })
}
