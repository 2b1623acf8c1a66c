//! Type conversions between Rhai's `Dynamic` and the common value model.

use argot_store::GenericModel;
use argot_types::{MarshalError, ScriptMap, ScriptValue};
use rhai::{Array, Dynamic, Map};

/// Converts a Rhai value into the common model.
///
/// Arrays are rendered as mappings with 1-based decimal-string keys, the
/// same shape Lua arrays take, so array payloads look identical on the
/// receiving side regardless of origin. Function pointers and other
/// opaque types are a [`MarshalError`].
pub fn rhai_to_common(value: &Dynamic) -> Result<ScriptValue, MarshalError> {
    if value.is_unit() {
        Ok(ScriptValue::None)
    } else if value.is_bool() {
        Ok(ScriptValue::Bool(value.as_bool().expect("checked bool")))
    } else if value.is_int() {
        Ok(ScriptValue::Int(value.as_int().expect("checked int")))
    } else if value.is_float() {
        Ok(ScriptValue::Float(value.as_float().expect("checked float")))
    } else if value.is_string() {
        Ok(ScriptValue::Str(
            value.clone().into_string().expect("checked string"),
        ))
    } else if value.is_map() {
        let map = value.clone().try_cast::<Map>().expect("checked map");
        let mut out = ScriptMap::new();
        for (key, value) in &map {
            out.insert(key.to_string(), rhai_to_common(value)?);
        }
        Ok(ScriptValue::Map(out))
    } else if value.is_array() {
        let array = value.clone().try_cast::<Array>().expect("checked array");
        let mut out = ScriptMap::new();
        for (i, value) in array.iter().enumerate() {
            out.insert((i + 1).to_string(), rhai_to_common(value)?);
        }
        Ok(ScriptValue::Map(out))
    } else {
        Err(MarshalError::Unsupported(format!(
            "rhai {}",
            value.type_name()
        )))
    }
}

/// Converts a common value into a Rhai value.
pub fn common_to_rhai(value: &ScriptValue) -> Dynamic {
    match value {
        ScriptValue::None => Dynamic::UNIT,
        ScriptValue::Bool(b) => (*b).into(),
        ScriptValue::Int(i) => (*i).into(),
        ScriptValue::Float(f) => (*f).into(),
        ScriptValue::Str(s) => s.clone().into(),
        ScriptValue::Map(map) => Dynamic::from(map_to_rhai(map)),
    }
}

/// Builds a Rhai object map from a common mapping.
pub fn map_to_rhai(map: &ScriptMap) -> Map {
    let mut out = Map::new();
    for (key, value) in map {
        out.insert(key.as_str().into(), common_to_rhai(value));
    }
    out
}

/// Builds a Rhai array of document maps.
pub fn docs_to_rhai(docs: &[GenericModel]) -> Array {
    docs.iter()
        .map(|doc| Dynamic::from(map_to_rhai(doc.fields())))
        .collect()
}
