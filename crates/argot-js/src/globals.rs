//! Bridge surface registration in the JavaScript global object.

use argot_runtime::BridgeServices;
use argot_store::{CollectionHandle, GenericModel};
use argot_types::{identity, EventType, Language, ScriptValue};
use rquickjs::function::{Func, Opt};
use rquickjs::{Ctx, Exception, Function, Object, Value};

use crate::marshal::{common_to_js, docs_to_array, js_to_common, map_to_object};

/// Throws a catchable exception carrying `message`.
fn throw<'js>(ctx: &Ctx<'js>, message: &str) -> rquickjs::Error {
    Exception::throw_message(ctx, message)
}

/// Returns the canonical source text of a function (`String(f)`).
fn function_source<'js>(ctx: &Ctx<'js>, func: &Function<'js>) -> rquickjs::Result<String> {
    let stringify: Function = ctx.eval("(f) => String(f)")?;
    stringify.call((func.clone(),))
}

// Identity coercions that pin a closure to the higher-ranked signature
// rquickjs requires. Rust only late-binds an input lifetime into the
// return type for single-parameter closures; with extra parameters the
// context lifetime and the returned value's lifetime are left
// independent, so `Func::from` fails to unify them. Routing the closure
// through a `for<'js>` bound forces the unification without changing
// behaviour.
fn hrtb_ctx_str_val<R, F>(f: F) -> F
where
    F: for<'js> Fn(Ctx<'js>, String, Value<'js>) -> rquickjs::Result<R>,
{
    f
}

fn hrtb_ctx_str_to_obj<F>(f: F) -> F
where
    F: for<'js> Fn(Ctx<'js>, String) -> rquickjs::Result<Object<'js>>,
{
    f
}

fn hrtb_ctx_str_to_val<F>(f: F) -> F
where
    F: for<'js> Fn(Ctx<'js>, String) -> rquickjs::Result<Value<'js>>,
{
    f
}

fn hrtb_ctx_val_to_val<F>(f: F) -> F
where
    F: for<'js> Fn(Ctx<'js>, Value<'js>) -> rquickjs::Result<Value<'js>>,
{
    f
}

fn hrtb_ctx_to_arr<F>(f: F) -> F
where
    F: for<'js> Fn(Ctx<'js>) -> rquickjs::Result<rquickjs::Array<'js>>,
{
    f
}

fn hrtb_ctx_val_to_arr<F>(f: F) -> F
where
    F: for<'js> Fn(Ctx<'js>, Value<'js>) -> rquickjs::Result<rquickjs::Array<'js>>,
{
    f
}

/// Resolves a handler argument to its name.
///
/// A string passes through unchanged. A function digests its source text
/// into a synthetic name; with `register_alias` the function is also
/// stored under that name as a global, making the name dispatchable.
pub fn resolve_handler<'js>(
    ctx: &Ctx<'js>,
    fn_name: &str,
    handler: &Value<'js>,
    register_alias: bool,
) -> rquickjs::Result<String> {
    if let Some(s) = handler.as_string() {
        return s.to_string();
    }
    if let Some(func) = handler.as_function() {
        let source = function_source(ctx, func)?;
        let name = identity::synthetic_name(&source);
        if register_alias {
            ctx.globals().set(name.as_str(), func.clone())?;
        }
        return Ok(name);
    }
    Err(throw(
        ctx,
        &format!("{fn_name}: handler must be a function or a name (expected (eventType, handler))"),
    ))
}

/// Wires `bind`/`unbind`/`trigger`/`use` and the `data`/`irc`/`http`/
/// `config` helper objects into the globals.
pub fn register(ctx: &Ctx<'_>, services: &BridgeServices) -> rquickjs::Result<()> {
    let globals = ctx.globals();

    let svc = services.clone();
    globals.set(
        "bind",
        Func::from(hrtb_ctx_str_val(
            move |ctx: Ctx, event: String, handler: Value| -> rquickjs::Result<String> {
                let name = resolve_handler(&ctx, "bind", &handler, true)?;
                svc.bus
                    .bind(Language::JavaScript, EventType::from(event), name.clone());
                Ok(name)
            },
        )),
    )?;

    let svc = services.clone();
    globals.set(
        "unbind",
        Func::from(hrtb_ctx_str_val(
            move |ctx: Ctx, event: String, handler: Value| -> rquickjs::Result<()> {
                let name = resolve_handler(&ctx, "unbind", &handler, false)?;
                svc.bus
                    .unbind(Language::JavaScript, &EventType::from(event), &name);
                Ok(())
            },
        )),
    )?;

    let svc = services.clone();
    globals.set(
        "trigger",
        Func::from(
            move |ctx: Ctx, event: String, payload: Opt<Value>| -> rquickjs::Result<()> {
                let payload = match payload.0 {
                    None => None,
                    Some(value) if value.is_null() || value.is_undefined() => None,
                    Some(value) => {
                        let common =
                            js_to_common(&value).map_err(|e| throw(&ctx, &e.to_string()))?;
                        match common {
                            ScriptValue::Map(map) => Some(map),
                            other => {
                                return Err(throw(
                                    &ctx,
                                    &format!(
                                        "trigger: payload must be an object or null, got {}",
                                        other.type_name()
                                    ),
                                ))
                            }
                        }
                    }
                };
                svc.bus.enqueue(EventType::from(event), payload);
                Ok(())
            },
        ),
    )?;

    let svc = services.clone();
    globals.set(
        "use",
        Func::from(hrtb_ctx_str_to_obj(move |ctx: Ctx, name: String| {
            let coll = svc
                .store
                .collection(&name)
                .map_err(|e| throw(&ctx, &e.to_string()))?;
            collection_object(&ctx, coll)
        })),
    )?;

    globals.set("data", data_object(ctx, services)?)?;
    globals.set("irc", irc_object(ctx, services)?)?;
    globals.set("http", http_object(ctx, services)?)?;
    globals.set("config", config_object(ctx, services)?)?;

    Ok(())
}

/// Builds the `{ Save, Fetch, FetchAll, Index, Query }` handle returned
/// by `use(name)`.
fn collection_object<'js>(
    ctx: &Ctx<'js>,
    coll: CollectionHandle,
) -> rquickjs::Result<Object<'js>> {
    let object = Object::new(ctx.clone())?;

    let c = coll.clone();
    object.set(
        "Save",
        Func::from(move |ctx: Ctx, model: Object| -> rquickjs::Result<i64> {
            let common = js_to_common(model.as_value())
                .map_err(|e| throw(&ctx, &e.to_string()))?;
            let ScriptValue::Map(fields) = common else {
                unreachable!("an object always marshals to a map");
            };
            let mut doc = GenericModel::from(fields);
            c.save(&mut doc).map_err(|e| throw(&ctx, &e.to_string()))
        }),
    )?;

    let c = coll.clone();
    object.set(
        "Fetch",
        Func::from(hrtb_ctx_val_to_val(move |ctx: Ctx, id: Value| {
            let id = js_to_common(&id).map_err(|e| throw(&ctx, &e.to_string()))?;
            match c.fetch(&id).map_err(|e| throw(&ctx, &e.to_string()))? {
                Some(doc) => Ok(map_to_object(&ctx, doc.fields())?.into_value()),
                None => Ok(Value::new_null(ctx.clone())),
            }
        })),
    )?;

    let c = coll.clone();
    object.set(
        "FetchAll",
        Func::from(hrtb_ctx_to_arr(move |ctx: Ctx| {
            let docs = c.fetch_all().map_err(|e| throw(&ctx, &e.to_string()))?;
            docs_to_array(&ctx, &docs)
        })),
    )?;

    let c = coll.clone();
    object.set(
        "Index",
        Func::from(move |ctx: Ctx, fields: Vec<String>| -> rquickjs::Result<()> {
            c.index(&fields).map_err(|e| throw(&ctx, &e.to_string()))
        }),
    )?;

    let c = coll;
    object.set(
        "Query",
        Func::from(hrtb_ctx_val_to_arr(move |ctx: Ctx, predicate: Value| {
            let predicate = js_to_common(&predicate).map_err(|e| throw(&ctx, &e.to_string()))?;
            let docs = c
                .query(&predicate)
                .map_err(|e| throw(&ctx, &e.to_string()))?;
            docs_to_array(&ctx, &docs)
        })),
    )?;

    Ok(object)
}

fn data_object<'js>(ctx: &Ctx<'js>, services: &BridgeServices) -> rquickjs::Result<Object<'js>> {
    let object = Object::new(ctx.clone())?;

    let svc = services.clone();
    object.set(
        "Get",
        Func::from(hrtb_ctx_str_to_val(move |ctx: Ctx, key: String| {
            let value = svc.data.get(&key).unwrap_or(ScriptValue::None);
            common_to_js(&ctx, &value)
        })),
    )?;

    let svc = services.clone();
    object.set(
        "Set",
        Func::from(move |ctx: Ctx, key: String, value: Value| -> rquickjs::Result<()> {
            let value = js_to_common(&value).map_err(|e| throw(&ctx, &e.to_string()))?;
            svc.data.set(&key, value);
            Ok(())
        }),
    )?;

    Ok(object)
}

fn irc_object<'js>(ctx: &Ctx<'js>, services: &BridgeServices) -> rquickjs::Result<Object<'js>> {
    let object = Object::new(ctx.clone())?;

    let svc = services.clone();
    object.set(
        "Join",
        Func::from(move |channel: String| {
            svc.irc.join(&channel);
        }),
    )?;

    let svc = services.clone();
    object.set(
        "Part",
        Func::from(move |channel: String| {
            svc.irc.part(&channel);
        }),
    )?;

    let svc = services.clone();
    object.set(
        "Privmsg",
        Func::from(move |target: String, message: String| {
            svc.irc.privmsg(&target, &message);
        }),
    )?;

    let svc = services.clone();
    object.set(
        "CurrentNick",
        Func::from(move || svc.irc.current_nick()),
    )?;

    let svc = services.clone();
    object.set(
        "Nick",
        Func::from(move |new_nick: String| {
            svc.irc.nick(&new_nick);
        }),
    )?;

    Ok(object)
}

fn http_object<'js>(ctx: &Ctx<'js>, services: &BridgeServices) -> rquickjs::Result<Object<'js>> {
    let object = Object::new(ctx.clone())?;

    let svc = services.clone();
    object.set(
        "Get",
        Func::from(move |ctx: Ctx, url: String| -> rquickjs::Result<String> {
            svc.http.get(&url).map_err(|e| throw(&ctx, &e.to_string()))
        }),
    )?;

    Ok(object)
}

fn config_object<'js>(ctx: &Ctx<'js>, services: &BridgeServices) -> rquickjs::Result<Object<'js>> {
    let object = Object::new(ctx.clone())?;

    let svc = services.clone();
    object.set(
        "Get",
        Func::from(hrtb_ctx_str_to_val(move |ctx: Ctx, key: String| {
            match svc.config.get(&key) {
                Some(value) => {
                    Ok(rquickjs::String::from_str(ctx.clone(), &value)?.into_value())
                }
                None => Ok(Value::new_null(ctx.clone())),
            }
        })),
    )?;

    let svc = services.clone();
    object.set(
        "Set",
        Func::from(move |key: String, value: String| {
            svc.config.set(&key, &value);
        }),
    )?;

    Ok(object)
}
