//! In-memory reference backend.

use argot_types::ScriptValue;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use crate::{Collection, DocumentStore, GenericModel, StoreError};

/// In-memory document store.
///
/// The reference [`DocumentStore`] implementation: per-collection ordered
/// maps with a monotonic id counter. Indexes are recorded but are purely
/// advisory (queries scan). Predicates are equality mappings: a document
/// matches when every predicate field equals the document's field.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Arc<MemoryCollection>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn open(&self, name: &str) -> Result<Arc<dyn Collection>, StoreError> {
        let mut collections = self.collections.lock();
        let coll = collections
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MemoryCollection::default()));
        Ok(Arc::clone(coll) as Arc<dyn Collection>)
    }
}

#[derive(Default)]
struct MemoryCollection {
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    docs: BTreeMap<i64, GenericModel>,
    next_id: i64,
    indexed: BTreeSet<String>,
}

impl Collection for MemoryCollection {
    fn insert(&self, model: &GenericModel) -> Result<i64, StoreError> {
        let mut state = self.state.lock();
        state.next_id += 1;
        let id = state.next_id;
        let mut stored = model.clone();
        stored.set_id(id);
        state.docs.insert(id, stored);
        Ok(id)
    }

    fn update(&self, id: i64, model: &GenericModel) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        if !state.docs.contains_key(&id) {
            return Err(StoreError::Missing(id));
        }
        let mut stored = model.clone();
        stored.set_id(id);
        state.docs.insert(id, stored);
        Ok(())
    }

    fn fetch(&self, id: i64) -> Result<Option<GenericModel>, StoreError> {
        Ok(self.state.lock().docs.get(&id).cloned())
    }

    fn fetch_all(&self) -> Result<Vec<GenericModel>, StoreError> {
        Ok(self.state.lock().docs.values().cloned().collect())
    }

    fn ensure_index(&self, fields: &[String]) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        for field in fields {
            state.indexed.insert(field.clone());
        }
        Ok(())
    }

    fn query(&self, predicate: &ScriptValue) -> Result<Vec<GenericModel>, StoreError> {
        let ScriptValue::Map(pred) = predicate else {
            return Err(StoreError::Predicate(format!(
                "expected a mapping, got {}",
                predicate.type_name()
            )));
        };
        Ok(self
            .state
            .lock()
            .docs
            .values()
            .filter(|doc| doc.matches(pred))
            .cloned()
            .collect())
    }
}
