//! Generic document store adapter.
//!
//! Scripts persist free-form documents into named collections through a
//! single adapter, regardless of which language they are written in:
//!
//! ```text
//! script: use("repos").Save({ name = "argot", ID = 0 })
//!             │
//!             ▼ marshal (registrar)
//! ┌───────────────────────────────┐
//! │  StoreAdapter                 │  id normalization,
//! │   └─ CollectionHandle "repos" │  collection cache
//! └───────────────────────────────┘
//!             │ Collection trait
//!             ▼
//!   MemoryStore / JsonFileStore / any DocumentStore impl
//! ```
//!
//! The store itself — its query engine, its on-disk layout — is a
//! collaborator behind the [`DocumentStore`]/[`Collection`] traits. This
//! crate owns what the collaborator must not be burdened with: the
//! **identifier normalization** that keeps ids round-tripping across
//! languages with different numeric models, and the save/insert-vs-update
//! split driven by the reserved `ID` field.

mod adapter;
mod error;
mod json_file;
mod memory;
mod model;

pub use adapter::{CollectionHandle, StoreAdapter};
pub use error::StoreError;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use model::{GenericModel, ID_FIELD};

use std::sync::Arc;

/// A named partition of a document store.
///
/// Implementations own storage and query semantics. Ordering of
/// [`fetch_all`](Collection::fetch_all) results is store-defined and not
/// guaranteed stable across calls unless the backend commits to it.
pub trait Collection: Send + Sync {
    /// Inserts a new document and returns its newly assigned id.
    ///
    /// The model's `ID` field, if present, is ignored; the backend picks
    /// the identifier.
    fn insert(&self, model: &GenericModel) -> Result<i64, StoreError>;

    /// Replaces the document with identifier `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Missing`] if no such document exists.
    fn update(&self, id: i64, model: &GenericModel) -> Result<(), StoreError>;

    /// Returns the document with identifier `id`, or `None`.
    fn fetch(&self, id: i64) -> Result<Option<GenericModel>, StoreError>;

    /// Returns every document in the collection.
    fn fetch_all(&self) -> Result<Vec<GenericModel>, StoreError>;

    /// Declares fields to index. Idempotent.
    fn ensure_index(&self, fields: &[String]) -> Result<(), StoreError>;

    /// Returns documents matching a store-native predicate.
    fn query(&self, predicate: &argot_types::ScriptValue)
        -> Result<Vec<GenericModel>, StoreError>;
}

/// A document store that opens [`Collection`]s by name.
pub trait DocumentStore: Send + Sync {
    /// Opens (creating if needed) the named collection.
    fn open(&self, name: &str) -> Result<Arc<dyn Collection>, StoreError>;
}
