//! The schemaless document model.

use argot_types::{ScriptMap, ScriptValue};
use serde::{Deserialize, Serialize};

use crate::StoreError;

/// Reserved field holding a document's integer identifier.
pub const ID_FIELD: &str = "ID";

/// A schemaless document: an ordered mapping of field names to values,
/// with the reserved [`ID_FIELD`] of integer type.
///
/// `ID == 0` or absent means "not yet persisted"; any non-zero value
/// refers to an existing document. Different interpreters hand the bridge
/// different numeric subtypes for the same logical id (JavaScript numbers
/// arrive as floats); [`GenericModel::id`] folds the closed set of those
/// shapes into one `i64` before anything reaches the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenericModel(ScriptMap);

impl GenericModel {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the document's identifier, normalized to `i64`.
    ///
    /// Absent or `None`-valued `ID` normalizes to `0` (not persisted).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidId`] when `ID` holds a value outside
    /// the closed numeric set (`Int`, integral `Float`).
    pub fn id(&self) -> Result<i64, StoreError> {
        match self.0.get(ID_FIELD) {
            None | Some(ScriptValue::None) => Ok(0),
            Some(v) => v
                .as_integral()
                .ok_or_else(|| StoreError::InvalidId(v.type_name())),
        }
    }

    /// Sets the identifier, always as a canonical `Int`.
    pub fn set_id(&mut self, id: i64) {
        self.0.insert(ID_FIELD.to_string(), ScriptValue::Int(id));
    }

    /// Returns a field's value.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&ScriptValue> {
        self.0.get(field)
    }

    /// Sets a field's value.
    pub fn insert(&mut self, field: impl Into<String>, value: ScriptValue) {
        self.0.insert(field.into(), value);
    }

    /// Borrows the underlying field map.
    #[must_use]
    pub fn fields(&self) -> &ScriptMap {
        &self.0
    }

    /// Consumes the document into its field map.
    #[must_use]
    pub fn into_fields(self) -> ScriptMap {
        self.0
    }

    /// Returns `true` when the document matches an equality predicate:
    /// every key in `predicate` exists in the document with an equal value.
    #[must_use]
    pub fn matches(&self, predicate: &ScriptMap) -> bool {
        predicate.iter().all(|(k, v)| self.0.get(k) == Some(v))
    }
}

impl From<ScriptMap> for GenericModel {
    fn from(map: ScriptMap) -> Self {
        Self(map)
    }
}

impl From<GenericModel> for ScriptValue {
    fn from(model: GenericModel) -> Self {
        ScriptValue::Map(model.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_id_is_zero() {
        let model = GenericModel::new();
        assert_eq!(model.id().unwrap(), 0);
    }

    #[test]
    fn none_id_is_zero() {
        let mut model = GenericModel::new();
        model.insert(ID_FIELD, ScriptValue::None);
        assert_eq!(model.id().unwrap(), 0);
    }

    #[test]
    fn float_id_normalizes() {
        // A JavaScript-born document: ID arrives as a float.
        let mut model = GenericModel::new();
        model.insert(ID_FIELD, ScriptValue::Float(7.0));
        assert_eq!(model.id().unwrap(), 7);
    }

    #[test]
    fn non_numeric_id_is_rejected() {
        let mut model = GenericModel::new();
        model.insert(ID_FIELD, ScriptValue::Str("7".into()));
        assert!(matches!(model.id(), Err(StoreError::InvalidId("string"))));
    }

    #[test]
    fn set_id_is_canonical_int() {
        let mut model = GenericModel::new();
        model.insert(ID_FIELD, ScriptValue::Float(7.0));
        model.set_id(model.id().unwrap());
        assert_eq!(model.get(ID_FIELD), Some(&ScriptValue::Int(7)));
    }

    #[test]
    fn equality_predicate() {
        let mut model = GenericModel::new();
        model.insert("name", ScriptValue::from("argot"));
        model.insert("stars", ScriptValue::Int(9));

        let mut pred = ScriptMap::new();
        pred.insert("name".into(), ScriptValue::from("argot"));
        assert!(model.matches(&pred));

        pred.insert("stars".into(), ScriptValue::Int(10));
        assert!(!model.matches(&pred));
    }
}
