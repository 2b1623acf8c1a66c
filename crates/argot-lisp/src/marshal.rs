//! Type conversions between Ketos values and the common model.
//!
//! Ketos has no native mapping type; a [`ScriptMap`] crosses the boundary
//! as an association list — a list of two-element `(key value)` lists
//! with string keys — and comes back the same way.

use argot_store::GenericModel;
use argot_types::{MarshalError, ScriptMap, ScriptValue};
use ketos::integer::Integer;
use ketos::Value;

/// Converts a Ketos value into the common model.
pub fn ketos_to_common(value: &Value) -> Result<ScriptValue, MarshalError> {
    match value {
        Value::Unit => Ok(ScriptValue::None),
        Value::Bool(b) => Ok(ScriptValue::Bool(*b)),
        Value::Integer(i) => i
            .to_i64()
            .map(ScriptValue::Int)
            .ok_or_else(|| MarshalError::OutOfRange(i.to_string())),
        Value::Float(f) => Ok(ScriptValue::Float(*f)),
        Value::String(s) => Ok(ScriptValue::Str(s.to_string())),
        Value::List(items) => {
            let mut map = ScriptMap::new();
            for item in items.iter() {
                let Value::List(pair) = item else {
                    return Err(MarshalError::Unsupported(
                        "list items must be (key value) pairs".into(),
                    ));
                };
                if pair.len() != 2 {
                    return Err(MarshalError::Unsupported(format!(
                        "association pair must have 2 elements, got {}",
                        pair.len()
                    )));
                }
                let Value::String(key) = &pair[0] else {
                    return Err(MarshalError::NonStringKey(pair[0].type_name().to_string()));
                };
                map.insert(key.to_string(), ketos_to_common(&pair[1])?);
            }
            Ok(ScriptValue::Map(map))
        }
        other => Err(MarshalError::Unsupported(format!(
            "ketos {}",
            other.type_name()
        ))),
    }
}

/// Converts a common value into a Ketos value.
pub fn common_to_ketos(value: &ScriptValue) -> Value {
    match value {
        ScriptValue::None => Value::Unit,
        ScriptValue::Bool(b) => Value::Bool(*b),
        ScriptValue::Int(i) => Value::Integer(Integer::from_i64(*i)),
        ScriptValue::Float(f) => Value::Float(*f),
        ScriptValue::Str(s) => Value::from(s.clone()),
        ScriptValue::Map(map) => list(
            map.iter()
                .map(|(key, value)| {
                    list(vec![Value::from(key.clone()), common_to_ketos(value)])
                })
                .collect(),
        ),
    }
}

/// Builds a Ketos list of document association lists.
pub fn docs_to_ketos(docs: &[GenericModel]) -> Value {
    list(
        docs.iter()
            .map(|doc| common_to_ketos(&ScriptValue::Map(doc.fields().clone())))
            .collect(),
    )
}

fn list(values: Vec<Value>) -> Value {
    values.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_round_trip() {
        for v in [
            ScriptValue::None,
            ScriptValue::Bool(true),
            ScriptValue::Int(-3),
            ScriptValue::Float(1.5),
            ScriptValue::Str("hi".into()),
        ] {
            let native = common_to_ketos(&v);
            assert_eq!(ketos_to_common(&native).unwrap(), v);
        }
    }

    #[test]
    fn maps_round_trip_as_association_lists() {
        let mut map = ScriptMap::new();
        map.insert("nick".into(), ScriptValue::from("rex"));
        let mut nested = ScriptMap::new();
        nested.insert("deep".into(), ScriptValue::Bool(true));
        map.insert("nested".into(), ScriptValue::Map(nested));

        let native = common_to_ketos(&ScriptValue::Map(map.clone()));
        assert!(matches!(native, Value::List(_)));
        assert_eq!(ketos_to_common(&native).unwrap(), ScriptValue::Map(map));
    }

    #[test]
    fn non_pair_list_is_unsupported() {
        let native = common_to_ketos(&ScriptValue::Int(1));
        let bad: Value = vec![native].into();
        assert!(matches!(
            ketos_to_common(&bad),
            Err(MarshalError::Unsupported(_))
        ));
    }

    #[test]
    fn non_string_key_is_rejected() {
        let pair: Value = vec![
            Value::Integer(Integer::from_i64(1)),
            Value::from("v".to_string()),
        ]
        .into();
        let assoc: Value = vec![pair].into();
        assert!(matches!(
            ketos_to_common(&assoc),
            Err(MarshalError::NonStringKey(_))
        ));
    }
}
