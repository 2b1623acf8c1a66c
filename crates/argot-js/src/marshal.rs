//! Type conversions between JavaScript values and the common model.

use argot_store::GenericModel;
use argot_types::{MarshalError, ScriptMap, ScriptValue};
use rquickjs::{Array, Ctx, Object, Value};

/// Converts a JavaScript value into the common model.
///
/// `null` and `undefined` both map to `None`. Arrays are rendered as
/// mappings with 1-based decimal-string keys — the same shape array
/// payloads take in every other embedded language, so a handler sees one
/// representation regardless of which language produced the payload.
/// Functions, symbols, and other opaque values are a [`MarshalError`].
pub fn js_to_common(value: &Value) -> Result<ScriptValue, MarshalError> {
    if value.is_null() || value.is_undefined() {
        return Ok(ScriptValue::None);
    }
    if let Some(b) = value.as_bool() {
        return Ok(ScriptValue::Bool(b));
    }
    if let Some(i) = value.as_int() {
        return Ok(ScriptValue::Int(i64::from(i)));
    }
    if let Some(f) = value.as_float() {
        return Ok(ScriptValue::Float(f));
    }
    if let Some(s) = value.as_string() {
        let s = s
            .to_string()
            .map_err(|e| MarshalError::Unsupported(e.to_string()))?;
        return Ok(ScriptValue::Str(s));
    }
    if let Some(array) = value.as_array() {
        let mut out = ScriptMap::new();
        for (i, item) in array.iter::<Value>().enumerate() {
            let item = item.map_err(|e| MarshalError::Unsupported(e.to_string()))?;
            out.insert((i + 1).to_string(), js_to_common(&item)?);
        }
        return Ok(ScriptValue::Map(out));
    }
    if value.is_function() {
        return Err(MarshalError::Unsupported("js function".into()));
    }
    if let Some(obj) = value.as_object() {
        let mut out = ScriptMap::new();
        for prop in obj.props::<String, Value>() {
            let (key, item) = prop.map_err(|e| MarshalError::Unsupported(e.to_string()))?;
            out.insert(key, js_to_common(&item)?);
        }
        return Ok(ScriptValue::Map(out));
    }
    Err(MarshalError::Unsupported(format!(
        "js {:?}",
        value.type_of()
    )))
}

/// Converts a common value into a JavaScript value.
pub fn common_to_js<'js>(ctx: &Ctx<'js>, value: &ScriptValue) -> rquickjs::Result<Value<'js>> {
    Ok(match value {
        ScriptValue::None => Value::new_null(ctx.clone()),
        ScriptValue::Bool(b) => Value::new_bool(ctx.clone(), *b),
        ScriptValue::Int(i) => {
            // QuickJS integers are 32-bit; anything wider rides as a float.
            match i32::try_from(*i) {
                Ok(small) => Value::new_int(ctx.clone(), small),
                Err(_) => Value::new_float(ctx.clone(), *i as f64),
            }
        }
        ScriptValue::Float(f) => Value::new_float(ctx.clone(), *f),
        ScriptValue::Str(s) => rquickjs::String::from_str(ctx.clone(), s)?.into_value(),
        ScriptValue::Map(map) => map_to_object(ctx, map)?.into_value(),
    })
}

/// Builds a JavaScript object from a common mapping.
pub fn map_to_object<'js>(ctx: &Ctx<'js>, map: &ScriptMap) -> rquickjs::Result<Object<'js>> {
    let object = Object::new(ctx.clone())?;
    for (key, value) in map {
        object.set(key.as_str(), common_to_js(ctx, value)?)?;
    }
    Ok(object)
}

/// Builds a JavaScript array of document objects.
pub fn docs_to_array<'js>(ctx: &Ctx<'js>, docs: &[GenericModel]) -> rquickjs::Result<Array<'js>> {
    let array = Array::new(ctx.clone())?;
    for (i, doc) in docs.iter().enumerate() {
        array.set(i, map_to_object(ctx, doc.fields())?)?;
    }
    Ok(array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rquickjs::{Context, Runtime};

    fn with_ctx(f: impl for<'js> FnOnce(Ctx<'js>)) {
        let rt = Runtime::new().unwrap();
        let context = Context::full(&rt).unwrap();
        context.with(f);
    }

    #[test]
    fn scalars_round_trip() {
        with_ctx(|ctx| {
            for v in [
                ScriptValue::None,
                ScriptValue::Bool(true),
                ScriptValue::Int(-3),
                ScriptValue::Float(1.5),
                ScriptValue::Str("hi".into()),
            ] {
                let native = common_to_js(&ctx, &v).unwrap();
                assert_eq!(js_to_common(&native).unwrap(), v);
            }
        });
    }

    #[test]
    fn objects_preserve_insertion_order() {
        with_ctx(|ctx| {
            let value: Value = ctx.eval(r#"({ z: 1, a: "two", nested: { deep: true } })"#).unwrap();
            let common = js_to_common(&value).unwrap();
            let map = common.as_map().unwrap();
            let keys: Vec<_> = map.keys().cloned().collect();
            assert_eq!(keys, vec!["z", "a", "nested"]);
            assert_eq!(map.get("z"), Some(&ScriptValue::Int(1)));
        });
    }

    #[test]
    fn arrays_become_decimal_keyed_maps() {
        with_ctx(|ctx| {
            let value: Value = ctx.eval(r#"(["a", "b"])"#).unwrap();
            let common = js_to_common(&value).unwrap();
            let map = common.as_map().unwrap();
            assert_eq!(map.get("1"), Some(&ScriptValue::Str("a".into())));
            assert_eq!(map.get("2"), Some(&ScriptValue::Str("b".into())));
        });
    }

    #[test]
    fn functions_are_unsupported() {
        with_ctx(|ctx| {
            let value: Value = ctx.eval(r#"(function () {})"#).unwrap();
            assert!(matches!(
                js_to_common(&value),
                Err(MarshalError::Unsupported(_))
            ));
        });
    }

    #[test]
    fn undefined_and_null_are_none() {
        with_ctx(|ctx| {
            let null: Value = ctx.eval("null").unwrap();
            let undefined: Value = ctx.eval("undefined").unwrap();
            assert!(js_to_common(&null).unwrap().is_none());
            assert!(js_to_common(&undefined).unwrap().is_none());
        });
    }
}
