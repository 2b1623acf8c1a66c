//! The common intermediate value model.
//!
//! Every value that crosses a language boundary — event payloads, documents,
//! key/value entries, query predicates — is marshaled into [`ScriptValue`]
//! first and back out on the far side. The model is deliberately small:
//! scalars, an ordered string-keyed mapping, and nothing else. Interpreter
//! natives that do not fit (functions, userdata, opaque objects) are a
//! [`MarshalError`], surfaced to the offending script as that interpreter's
//! own catchable error, never a host panic.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ErrorCode;

/// Insertion-ordered mapping from string keys to [`ScriptValue`]s.
///
/// Ordering matters: handlers observe payload fields in the order the
/// producer inserted them, regardless of which language produced them.
pub type ScriptMap = IndexMap<String, ScriptValue>;

/// A value in the common intermediate model.
///
/// The tagged union the bridge marshals through. `None` stands for the
/// absent value of each language (Lua `nil`, JS `null`/`undefined`, Rhai
/// `()`, Ketos `()`); it serializes as JSON `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptValue {
    /// Absent value.
    None,
    /// Boolean.
    Bool(bool),
    /// Signed 64-bit integer.
    Int(i64),
    /// Double-precision float.
    Float(f64),
    /// UTF-8 string.
    Str(String),
    /// Nested ordered mapping.
    Map(ScriptMap),
}

impl ScriptValue {
    /// Returns a short name for the variant, for error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Map(_) => "map",
        }
    }

    /// Returns `true` for [`ScriptValue::None`].
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Returns the contained string, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the contained map, if any.
    #[must_use]
    pub fn as_map(&self) -> Option<&ScriptMap> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Coerces this value to an `i64` if it is integral.
    ///
    /// Accepts `Int` directly and `Float` with a zero fractional part —
    /// the closed set of numeric shapes the embedded interpreters produce
    /// for one logical integer (JavaScript numbers arrive as floats).
    /// Returns `None` for everything else.
    #[must_use]
    pub fn as_integral(&self) -> Option<i64> {
        match *self {
            Self::Int(i) => Some(i),
            Self::Float(f) if f.fract() == 0.0 && f.is_finite() => {
                // i64::MAX is not exactly representable as f64; the cast
                // saturates, so bound-check through the cast itself.
                let i = f as i64;
                (i as f64 == f).then_some(i)
            }
            _ => None,
        }
    }

    /// Converts a JSON value into the common model.
    ///
    /// # Errors
    ///
    /// Returns [`MarshalError::Unsupported`] for JSON arrays, which have no
    /// counterpart in the payload model.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, MarshalError> {
        match value {
            serde_json::Value::Null => Ok(Self::None),
            serde_json::Value::Bool(b) => Ok(Self::Bool(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Self::Float(f))
                } else {
                    Err(MarshalError::OutOfRange(n.to_string()))
                }
            }
            serde_json::Value::String(s) => Ok(Self::Str(s.clone())),
            serde_json::Value::Object(obj) => {
                let mut map = ScriptMap::new();
                for (k, v) in obj {
                    map.insert(k.clone(), Self::from_json(v)?);
                }
                Ok(Self::Map(map))
            }
            serde_json::Value::Array(_) => {
                Err(MarshalError::Unsupported("json array".into()))
            }
        }
    }

    /// Converts this value into JSON.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::None => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(i) => serde_json::Value::Number((*i).into()),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::Str(s) => serde_json::Value::String(s.clone()),
            Self::Map(m) => {
                let mut obj = serde_json::Map::new();
                for (k, v) in m {
                    obj.insert(k.clone(), v.to_json());
                }
                serde_json::Value::Object(obj)
            }
        }
    }
}

impl From<bool> for ScriptValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for ScriptValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for ScriptValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for ScriptValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for ScriptValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<ScriptMap> for ScriptValue {
    fn from(m: ScriptMap) -> Self {
        Self::Map(m)
    }
}

/// Errors converting between a native interpreter value and the common model.
///
/// These are programming errors in the calling script (e.g. passing a
/// function where a data value is expected). Each registrar converts them
/// to its interpreter's native error convention.
#[derive(Debug, Error)]
pub enum MarshalError {
    /// The native value has no representation in the common model.
    #[error("unsupported value: {0}")]
    Unsupported(String),

    /// A mapping key was not a string (and not coercible to one).
    #[error("mapping key must be a string, got {0}")]
    NonStringKey(String),

    /// A numeric value does not fit the common model's number types.
    #[error("number out of range: {0}")]
    OutOfRange(String),
}

impl ErrorCode for MarshalError {
    fn code(&self) -> &'static str {
        match self {
            Self::Unsupported(_) => "MARSHAL_UNSUPPORTED",
            Self::NonStringKey(_) => "MARSHAL_NON_STRING_KEY",
            Self::OutOfRange(_) => "MARSHAL_OUT_OF_RANGE",
        }
    }

    fn is_recoverable(&self) -> bool {
        // The same conversion will fail the same way every time.
        false
    }
}
