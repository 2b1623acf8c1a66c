//! Bridge surface registration in the Rhai engine.

use argot_runtime::BridgeServices;
use argot_store::{CollectionHandle, GenericModel};
use argot_types::{identity, EventType, Language, ScriptValue};
use rhai::{Array, Dynamic, Engine, EvalAltResult, FnPtr, ImmutableString, Map, Module};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::marshal::{common_to_rhai, docs_to_rhai, map_to_rhai, rhai_to_common};

/// Engine-generated prefix for anonymous function names.
const ANON_PREFIX: &str = "anon$";

/// Alias table mapping synthetic handler names to the bound closures.
///
/// The registrar's half of identity resolution: dispatch checks this
/// table before falling back to named script functions.
pub type AliasTable = Rc<RefCell<HashMap<String, FnPtr>>>;

/// Resolves a function pointer to a handler name.
///
/// Anonymous closures digest the engine's deterministic `anon$…` encoding
/// into a synthetic name (second field `true`); a pointer to a named
/// function is a plain name reference and passes through unchanged.
pub fn resolve_fn_ptr(fp: &FnPtr) -> (String, bool) {
    let name = fp.fn_name();
    if name.starts_with(ANON_PREFIX) {
        (identity::synthetic_name(name), true)
    } else {
        (name.to_string(), false)
    }
}

fn marshal_err(err: argot_types::MarshalError) -> Box<EvalAltResult> {
    err.to_string().into()
}

fn store_err(err: argot_store::StoreError) -> Box<EvalAltResult> {
    err.to_string().into()
}

/// Wires `bind`/`unbind`/`trigger`/`use_collection` and the `data`/`irc`/
/// `http`/`config` static modules into the engine.
///
/// `use` is a reserved keyword in Rhai, so the collection opener is
/// spelled `use_collection` here.
pub fn register(engine: &mut Engine, services: &BridgeServices, aliases: &AliasTable) {
    // bind(event, "name") and bind(event, fn-pointer/closure)
    let svc = services.clone();
    engine.register_fn(
        "bind",
        move |event: ImmutableString, name: ImmutableString| -> ImmutableString {
            svc.bus
                .bind(Language::Rhai, EventType::from(event.as_str()), name.to_string());
            name
        },
    );
    let svc = services.clone();
    let alias = Rc::clone(aliases);
    engine.register_fn(
        "bind",
        move |event: ImmutableString, fp: FnPtr| -> ImmutableString {
            let (name, anonymous) = resolve_fn_ptr(&fp);
            if anonymous {
                // Idempotent: the same literal overwrites its own alias.
                alias.borrow_mut().insert(name.clone(), fp);
            }
            svc.bus
                .bind(Language::Rhai, EventType::from(event.as_str()), name.clone());
            name.into()
        },
    );

    let svc = services.clone();
    engine.register_fn(
        "unbind",
        move |event: ImmutableString, name: ImmutableString| {
            svc.bus
                .unbind(Language::Rhai, &EventType::from(event.as_str()), &name);
        },
    );
    let svc = services.clone();
    engine.register_fn("unbind", move |event: ImmutableString, fp: FnPtr| {
        let (name, _) = resolve_fn_ptr(&fp);
        svc.bus
            .unbind(Language::Rhai, &EventType::from(event.as_str()), &name);
    });

    let svc = services.clone();
    engine.register_fn("trigger", move |event: ImmutableString| {
        svc.bus.enqueue(EventType::from(event.as_str()), None);
    });
    let svc = services.clone();
    engine.register_fn(
        "trigger",
        move |event: ImmutableString, payload: Dynamic| -> Result<(), Box<EvalAltResult>> {
            let payload = if payload.is_unit() {
                None
            } else {
                match rhai_to_common(&payload).map_err(marshal_err)? {
                    ScriptValue::Map(map) => Some(map),
                    other => {
                        return Err(format!(
                            "trigger: payload must be a map or (), got {}",
                            other.type_name()
                        )
                        .into())
                    }
                }
            };
            svc.bus.enqueue(EventType::from(event.as_str()), payload);
            Ok(())
        },
    );

    // Collection handles are a registered type with method-call syntax.
    let svc = services.clone();
    engine.register_type_with_name::<RhaiCollection>("Collection");
    engine.register_fn(
        "use_collection",
        move |name: ImmutableString| -> Result<RhaiCollection, Box<EvalAltResult>> {
            svc.store
                .collection(name.as_str())
                .map(|inner| RhaiCollection { inner })
                .map_err(store_err)
        },
    );
    engine.register_fn(
        "Save",
        |coll: &mut RhaiCollection, doc: Map| -> Result<i64, Box<EvalAltResult>> {
            let common = rhai_to_common(&Dynamic::from(doc)).map_err(marshal_err)?;
            let ScriptValue::Map(fields) = common else {
                unreachable!("a map always marshals to a map");
            };
            let mut model = GenericModel::from(fields);
            coll.inner.save(&mut model).map_err(store_err)
        },
    );
    engine.register_fn(
        "Fetch",
        |coll: &mut RhaiCollection, id: Dynamic| -> Result<Dynamic, Box<EvalAltResult>> {
            let id = rhai_to_common(&id).map_err(marshal_err)?;
            match coll.inner.fetch(&id).map_err(store_err)? {
                Some(doc) => Ok(Dynamic::from(map_to_rhai(doc.fields()))),
                None => Ok(Dynamic::UNIT),
            }
        },
    );
    engine.register_fn(
        "FetchAll",
        |coll: &mut RhaiCollection| -> Result<Array, Box<EvalAltResult>> {
            coll.inner
                .fetch_all()
                .map(|docs| docs_to_rhai(&docs))
                .map_err(store_err)
        },
    );
    engine.register_fn(
        "Index",
        |coll: &mut RhaiCollection, fields: Array| -> Result<(), Box<EvalAltResult>> {
            let fields = fields
                .into_iter()
                .map(|f| {
                    f.into_string()
                        .map_err(|t| format!("Index: field names must be strings, got {t}").into())
                })
                .collect::<Result<Vec<String>, Box<EvalAltResult>>>()?;
            coll.inner.index(&fields).map_err(store_err)
        },
    );
    engine.register_fn(
        "Query",
        |coll: &mut RhaiCollection, predicate: Map| -> Result<Array, Box<EvalAltResult>> {
            let predicate = rhai_to_common(&Dynamic::from(predicate)).map_err(marshal_err)?;
            coll.inner
                .query(&predicate)
                .map(|docs| docs_to_rhai(&docs))
                .map_err(store_err)
        },
    );

    engine.register_static_module("data", data_module(services).into());
    engine.register_static_module("irc", irc_module(services).into());
    engine.register_static_module("http", http_module(services).into());
    engine.register_static_module("config", config_module(services).into());
}

/// Script-facing handle returned by `use_collection`.
#[derive(Clone)]
pub struct RhaiCollection {
    inner: CollectionHandle,
}

fn data_module(services: &BridgeServices) -> Module {
    let mut module = Module::new();

    let svc = services.clone();
    module.set_native_fn(
        "Get",
        move |key: ImmutableString| -> Result<Dynamic, Box<EvalAltResult>> {
            let value = svc.data.get(key.as_str()).unwrap_or(ScriptValue::None);
            Ok(common_to_rhai(&value))
        },
    );

    let svc = services.clone();
    module.set_native_fn(
        "Set",
        move |key: ImmutableString, value: Dynamic| -> Result<(), Box<EvalAltResult>> {
            let value = rhai_to_common(&value).map_err(marshal_err)?;
            svc.data.set(key.as_str(), value);
            Ok(())
        },
    );

    module
}

fn irc_module(services: &BridgeServices) -> Module {
    let mut module = Module::new();

    let svc = services.clone();
    module.set_native_fn(
        "Join",
        move |channel: ImmutableString| -> Result<(), Box<EvalAltResult>> {
            svc.irc.join(channel.as_str());
            Ok(())
        },
    );

    let svc = services.clone();
    module.set_native_fn(
        "Part",
        move |channel: ImmutableString| -> Result<(), Box<EvalAltResult>> {
            svc.irc.part(channel.as_str());
            Ok(())
        },
    );

    let svc = services.clone();
    module.set_native_fn(
        "Privmsg",
        move |target: ImmutableString, message: ImmutableString| -> Result<(), Box<EvalAltResult>> {
            svc.irc.privmsg(target.as_str(), message.as_str());
            Ok(())
        },
    );

    let svc = services.clone();
    module.set_native_fn(
        "CurrentNick",
        move || -> Result<ImmutableString, Box<EvalAltResult>> {
            Ok(svc.irc.current_nick().into())
        },
    );

    let svc = services.clone();
    module.set_native_fn(
        "Nick",
        move |new_nick: ImmutableString| -> Result<(), Box<EvalAltResult>> {
            svc.irc.nick(new_nick.as_str());
            Ok(())
        },
    );

    module
}

fn http_module(services: &BridgeServices) -> Module {
    let mut module = Module::new();

    let svc = services.clone();
    module.set_native_fn(
        "Get",
        move |url: ImmutableString| -> Result<ImmutableString, Box<EvalAltResult>> {
            svc.http
                .get(url.as_str())
                .map(Into::into)
                .map_err(|e| e.to_string().into())
        },
    );

    module
}

fn config_module(services: &BridgeServices) -> Module {
    let mut module = Module::new();

    let svc = services.clone();
    module.set_native_fn(
        "Get",
        move |key: ImmutableString| -> Result<Dynamic, Box<EvalAltResult>> {
            Ok(match svc.config.get(key.as_str()) {
                Some(value) => Dynamic::from(value),
                None => Dynamic::UNIT,
            })
        },
    );

    let svc = services.clone();
    module.set_native_fn(
        "Set",
        move |key: ImmutableString, value: ImmutableString| -> Result<(), Box<EvalAltResult>> {
            svc.config.set(key.as_str(), value.as_str());
            Ok(())
        },
    );

    module
}
