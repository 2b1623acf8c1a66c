//! Adapter between registrars and a [`DocumentStore`] collaborator.

use argot_types::ScriptValue;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::{Collection, DocumentStore, GenericModel, StoreError};

/// Shared, caching front-end over a document store.
///
/// One adapter is shared by every registrar. Collections are opened on
/// demand by name and cached for the adapter's lifetime, so repeated
/// `use("repos")` calls from any language hit the same handle.
pub struct StoreAdapter {
    store: Arc<dyn DocumentStore>,
    cache: Mutex<HashMap<String, CollectionHandle>>,
}

impl StoreAdapter {
    /// Wraps a store collaborator.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Opens (or returns the cached handle for) the named collection.
    ///
    /// # Errors
    ///
    /// Propagates the backend's open failure.
    pub fn collection(&self, name: &str) -> Result<CollectionHandle, StoreError> {
        if let Some(handle) = self.cache.lock().get(name) {
            return Ok(handle.clone());
        }
        // Open outside the cache lock; a racing open of the same name is
        // harmless (last one wins, both point at the same backend state).
        let inner = self.store.open(name)?;
        debug!(collection = name, "opened collection");
        let handle = CollectionHandle {
            name: name.to_string(),
            inner,
        };
        self.cache
            .lock()
            .insert(name.to_string(), handle.clone());
        Ok(handle)
    }

    /// Number of cached collection handles.
    #[must_use]
    pub fn cached_collections(&self) -> usize {
        self.cache.lock().len()
    }
}

/// A script-facing handle to one collection.
///
/// This is what `use(name)` hands to a script (in whatever shape the
/// language expresses it). All identifier normalization happens here,
/// before the backend sees a model.
#[derive(Clone)]
pub struct CollectionHandle {
    name: String,
    inner: Arc<dyn Collection>,
}

impl CollectionHandle {
    /// The collection's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Saves a document: inserts when `ID` is zero or absent, otherwise
    /// updates the document with that id.
    ///
    /// On return the model's `ID` field holds the (possibly newly
    /// assigned) identifier as a canonical `Int`, and the same id is
    /// returned.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidId`] for a non-integer `ID`;
    /// [`StoreError::Missing`] when updating an id that does not exist;
    /// otherwise whatever the backend reports.
    pub fn save(&self, model: &mut GenericModel) -> Result<i64, StoreError> {
        let id = model.id()?;
        if id == 0 {
            let id = self.inner.insert(model)?;
            model.set_id(id);
            debug!(collection = %self.name, id, "inserted document");
            Ok(id)
        } else {
            // Canonicalize the subtype (e.g. a JavaScript float id) so the
            // stored document round-trips into every language.
            model.set_id(id);
            self.inner.update(id, model)?;
            debug!(collection = %self.name, id, "updated document");
            Ok(id)
        }
    }

    /// Fetches by id, accepting any member of the closed numeric set.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidId`] when `id` is not integral.
    pub fn fetch(&self, id: &ScriptValue) -> Result<Option<GenericModel>, StoreError> {
        let id = id
            .as_integral()
            .ok_or_else(|| StoreError::InvalidId(id.type_name()))?;
        self.inner.fetch(id)
    }

    /// Fetches by already-normalized id.
    pub fn fetch_by_id(&self, id: i64) -> Result<Option<GenericModel>, StoreError> {
        self.inner.fetch(id)
    }

    /// Returns every document in the collection (store-defined order).
    pub fn fetch_all(&self) -> Result<Vec<GenericModel>, StoreError> {
        self.inner.fetch_all()
    }

    /// Declares indexed fields. Idempotent.
    pub fn index(&self, fields: &[String]) -> Result<(), StoreError> {
        self.inner.ensure_index(fields)
    }

    /// Runs a store-native predicate query.
    pub fn query(&self, predicate: &ScriptValue) -> Result<Vec<GenericModel>, StoreError> {
        self.inner.query(predicate)
    }
}
