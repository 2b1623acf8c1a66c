//! Type conversions between Lua and the common value model.

use argot_store::GenericModel;
use argot_types::{MarshalError, ScriptMap, ScriptValue};
use mlua::{Lua, Table, Value};

/// Converts a Lua value into the common model.
///
/// Integer table keys are rendered as decimal strings (Lua arrays inside
/// payloads stay data); any other non-string key, and any value with no
/// common representation (functions, userdata, threads), is a
/// [`MarshalError`].
pub fn lua_to_common(value: &Value) -> Result<ScriptValue, MarshalError> {
    match value {
        Value::Nil => Ok(ScriptValue::None),
        Value::Boolean(b) => Ok(ScriptValue::Bool(*b)),
        Value::Integer(i) => Ok(ScriptValue::Int(*i)),
        Value::Number(n) => Ok(ScriptValue::Float(*n)),
        Value::String(s) => {
            let s = s
                .to_str()
                .map_err(|_| MarshalError::Unsupported("non-utf8 lua string".into()))?;
            Ok(ScriptValue::Str(s.to_string()))
        }
        Value::Table(table) => {
            let mut map = ScriptMap::new();
            for pair in table.clone().pairs::<Value, Value>() {
                let (key, value) =
                    pair.map_err(|e| MarshalError::Unsupported(e.to_string()))?;
                let key = match &key {
                    Value::String(s) => s
                        .to_str()
                        .map_err(|_| MarshalError::Unsupported("non-utf8 lua key".into()))?
                        .to_string(),
                    Value::Integer(i) => i.to_string(),
                    other => {
                        return Err(MarshalError::NonStringKey(
                            other.type_name().to_string(),
                        ))
                    }
                };
                map.insert(key, lua_to_common(&value)?);
            }
            Ok(ScriptValue::Map(map))
        }
        other => Err(MarshalError::Unsupported(format!(
            "lua {}",
            other.type_name()
        ))),
    }
}

/// Converts a common value into a Lua value.
pub fn common_to_lua(lua: &Lua, value: &ScriptValue) -> mlua::Result<Value> {
    match value {
        ScriptValue::None => Ok(Value::Nil),
        ScriptValue::Bool(b) => Ok(Value::Boolean(*b)),
        ScriptValue::Int(i) => Ok(Value::Integer(*i)),
        ScriptValue::Float(f) => Ok(Value::Number(*f)),
        ScriptValue::Str(s) => Ok(Value::String(lua.create_string(s)?)),
        ScriptValue::Map(map) => Ok(Value::Table(map_to_table(lua, map)?)),
    }
}

/// Builds a Lua table from a common mapping.
pub fn map_to_table(lua: &Lua, map: &ScriptMap) -> mlua::Result<Table> {
    let table = lua.create_table()?;
    for (key, value) in map {
        table.set(key.as_str(), common_to_lua(lua, value)?)?;
    }
    Ok(table)
}

/// Builds a 1-based Lua array of document tables.
pub fn docs_to_table(lua: &Lua, docs: &[GenericModel]) -> mlua::Result<Table> {
    let array = lua.create_table()?;
    for (i, doc) in docs.iter().enumerate() {
        array.set(i + 1, map_to_table(lua, doc.fields())?)?;
    }
    Ok(array)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_round_trip() {
        let lua = Lua::new();
        for v in [
            ScriptValue::None,
            ScriptValue::Bool(true),
            ScriptValue::Int(-3),
            ScriptValue::Float(1.5),
            ScriptValue::Str("hi".into()),
        ] {
            let native = common_to_lua(&lua, &v).unwrap();
            assert_eq!(lua_to_common(&native).unwrap(), v);
        }
    }

    #[test]
    fn tables_convert_key_by_key() {
        let lua = Lua::new();
        let table: Table = lua
            .load(r#"return { nick = "rex", count = 2, nested = { deep = true } }"#)
            .eval()
            .unwrap();
        let common = lua_to_common(&Value::Table(table)).unwrap();
        let map = common.as_map().unwrap();
        assert_eq!(map.get("nick"), Some(&ScriptValue::Str("rex".into())));
        assert_eq!(map.get("count"), Some(&ScriptValue::Int(2)));
        let nested = map.get("nested").unwrap().as_map().unwrap();
        assert_eq!(nested.get("deep"), Some(&ScriptValue::Bool(true)));
    }

    #[test]
    fn array_keys_become_decimal_strings() {
        let lua = Lua::new();
        let table: Table = lua.load(r#"return { "a", "b" }"#).eval().unwrap();
        let common = lua_to_common(&Value::Table(table)).unwrap();
        let map = common.as_map().unwrap();
        assert_eq!(map.get("1"), Some(&ScriptValue::Str("a".into())));
        assert_eq!(map.get("2"), Some(&ScriptValue::Str("b".into())));
    }

    #[test]
    fn functions_are_unsupported() {
        let lua = Lua::new();
        let f: Value = lua.load(r#"return function() end"#).eval().unwrap();
        assert!(matches!(
            lua_to_common(&f),
            Err(MarshalError::Unsupported(_))
        ));
    }

    #[test]
    fn function_valued_field_is_unsupported() {
        let lua = Lua::new();
        let t: Value = lua
            .load(r#"return { cb = function() end }"#)
            .eval()
            .unwrap();
        assert!(lua_to_common(&t).is_err());
    }
}
