//! Bridge surface registration in Lua globals.

use argot_runtime::BridgeServices;
use argot_store::{CollectionHandle, GenericModel};
use argot_types::{identity, EventType, Language, ScriptValue};
use mlua::{Function, Lua, Table, Value};

use crate::marshal::{common_to_lua, docs_to_table, lua_to_common, map_to_table};

/// Resolves a handler argument to its name.
///
/// A string passes through unchanged. A function digests to its synthetic
/// name via `string.dump` (debug info stripped); with `register_alias` the
/// function is also stored under that name as a global, making the name
/// dispatchable later. Anything else is a caller error.
pub fn resolve_handler(
    lua: &Lua,
    fn_name: &str,
    handler: &Value,
    register_alias: bool,
) -> mlua::Result<String> {
    match handler {
        Value::String(s) => Ok(s.to_str()?.to_string()),
        Value::Function(f) => {
            let dump: Function = lua
                .globals()
                .get::<Table>("string")?
                .get::<Function>("dump")?;
            // Raises a Lua error for functions without a dumpable body
            // (Rust/C functions), which is exactly the identity error the
            // caller should see.
            let bytes: mlua::String = dump.call((f.clone(), true))?;
            let name = identity::synthetic_name_from_bytes(&bytes.as_bytes());
            if register_alias {
                lua.globals().set(name.as_str(), f.clone())?;
            }
            Ok(name)
        }
        other => Err(mlua::Error::RuntimeError(format!(
            "{fn_name}: handler must be a function or a name \
             (expected (event_type, handler)), got {}",
            other.type_name()
        ))),
    }
}

/// Wires `bind`/`unbind`/`trigger`/`use` and the `data`/`irc`/`http`/
/// `config` helper tables into the Lua globals.
pub fn register(lua: &Lua, services: &BridgeServices) -> mlua::Result<()> {
    let globals = lua.globals();

    let svc = services.clone();
    globals.set(
        "bind",
        lua.create_function(move |lua, (event, handler): (String, Value)| {
            let name = resolve_handler(lua, "bind", &handler, true)?;
            svc.bus.bind(Language::Lua, EventType::from(event), name.clone());
            Ok(name)
        })?,
    )?;

    let svc = services.clone();
    globals.set(
        "unbind",
        lua.create_function(move |lua, (event, handler): (String, Value)| {
            let name = resolve_handler(lua, "unbind", &handler, false)?;
            svc.bus.unbind(Language::Lua, &EventType::from(event), &name);
            Ok(())
        })?,
    )?;

    let svc = services.clone();
    globals.set(
        "trigger",
        lua.create_function(move |_, (event, payload): (String, Option<Value>)| {
            let payload = match payload {
                None | Some(Value::Nil) => None,
                Some(value) => {
                    match lua_to_common(&value).map_err(mlua::Error::external)? {
                        ScriptValue::Map(map) => Some(map),
                        other => {
                            return Err(mlua::Error::RuntimeError(format!(
                                "trigger: payload must be a table or nil, got {}",
                                other.type_name()
                            )))
                        }
                    }
                }
            };
            svc.bus.enqueue(EventType::from(event), payload);
            Ok(())
        })?,
    )?;

    let svc = services.clone();
    globals.set(
        "use",
        lua.create_function(move |lua, name: String| {
            let coll = svc.store.collection(&name).map_err(mlua::Error::external)?;
            collection_table(lua, coll)
        })?,
    )?;

    globals.set("data", data_table(lua, services)?)?;
    globals.set("irc", irc_table(lua, services)?)?;
    globals.set("http", http_table(lua, services)?)?;
    globals.set("config", config_table(lua, services)?)?;

    Ok(())
}

/// Builds the `{ Save, Fetch, FetchAll, Index, Query }` handle returned
/// by `use(name)`.
fn collection_table(lua: &Lua, coll: CollectionHandle) -> mlua::Result<Table> {
    let table = lua.create_table()?;

    let c = coll.clone();
    table.set(
        "Save",
        lua.create_function(move |_, model: Table| {
            let common =
                lua_to_common(&Value::Table(model)).map_err(mlua::Error::external)?;
            let ScriptValue::Map(fields) = common else {
                unreachable!("a table always marshals to a map");
            };
            let mut doc = GenericModel::from(fields);
            let id = c.save(&mut doc).map_err(mlua::Error::external)?;
            Ok(id)
        })?,
    )?;

    let c = coll.clone();
    table.set(
        "Fetch",
        lua.create_function(move |lua, id: Value| {
            let id = lua_to_common(&id).map_err(mlua::Error::external)?;
            match c.fetch(&id).map_err(mlua::Error::external)? {
                Some(doc) => Ok(Value::Table(map_to_table(lua, doc.fields())?)),
                None => Ok(Value::Nil),
            }
        })?,
    )?;

    let c = coll.clone();
    table.set(
        "FetchAll",
        lua.create_function(move |lua, ()| {
            let docs = c.fetch_all().map_err(mlua::Error::external)?;
            docs_to_table(lua, &docs)
        })?,
    )?;

    let c = coll.clone();
    table.set(
        "Index",
        lua.create_function(move |_, fields: Table| {
            let fields: Vec<String> = fields
                .sequence_values::<String>()
                .collect::<mlua::Result<_>>()?;
            c.index(&fields).map_err(mlua::Error::external)
        })?,
    )?;

    let c = coll;
    table.set(
        "Query",
        lua.create_function(move |lua, predicate: Value| {
            let predicate = lua_to_common(&predicate).map_err(mlua::Error::external)?;
            let docs = c.query(&predicate).map_err(mlua::Error::external)?;
            docs_to_table(lua, &docs)
        })?,
    )?;

    Ok(table)
}

fn data_table(lua: &Lua, services: &BridgeServices) -> mlua::Result<Table> {
    let table = lua.create_table()?;

    let svc = services.clone();
    table.set(
        "Get",
        lua.create_function(move |lua, key: String| {
            let value = svc.data.get(&key).unwrap_or(ScriptValue::None);
            common_to_lua(lua, &value)
        })?,
    )?;

    let svc = services.clone();
    table.set(
        "Set",
        lua.create_function(move |_, (key, value): (String, Value)| {
            let value = lua_to_common(&value).map_err(mlua::Error::external)?;
            svc.data.set(&key, value);
            Ok(())
        })?,
    )?;

    Ok(table)
}

fn irc_table(lua: &Lua, services: &BridgeServices) -> mlua::Result<Table> {
    let table = lua.create_table()?;

    let svc = services.clone();
    table.set(
        "Join",
        lua.create_function(move |_, channel: String| {
            svc.irc.join(&channel);
            Ok(())
        })?,
    )?;

    let svc = services.clone();
    table.set(
        "Part",
        lua.create_function(move |_, channel: String| {
            svc.irc.part(&channel);
            Ok(())
        })?,
    )?;

    let svc = services.clone();
    table.set(
        "Privmsg",
        lua.create_function(move |_, (target, message): (String, String)| {
            svc.irc.privmsg(&target, &message);
            Ok(())
        })?,
    )?;

    let svc = services.clone();
    table.set(
        "CurrentNick",
        lua.create_function(move |_, ()| Ok(svc.irc.current_nick()))?,
    )?;

    let svc = services.clone();
    table.set(
        "Nick",
        lua.create_function(move |_, new_nick: String| {
            svc.irc.nick(&new_nick);
            Ok(())
        })?,
    )?;

    Ok(table)
}

fn http_table(lua: &Lua, services: &BridgeServices) -> mlua::Result<Table> {
    let table = lua.create_table()?;

    let svc = services.clone();
    table.set(
        "Get",
        lua.create_function(move |_, url: String| {
            svc.http.get(&url).map_err(mlua::Error::external)
        })?,
    )?;

    Ok(table)
}

fn config_table(lua: &Lua, services: &BridgeServices) -> mlua::Result<Table> {
    let table = lua.create_table()?;

    let svc = services.clone();
    table.set(
        "Get",
        lua.create_function(move |_, key: String| Ok(svc.config.get(&key)))?,
    )?;

    let svc = services.clone();
    table.set(
        "Set",
        lua.create_function(move |_, (key, value): (String, String)| {
            svc.config.set(&key, &value);
            Ok(())
        })?,
    )?;

    Ok(table)
}
