//! JSON-file-backed store.
//!
//! One JSON file per collection under a base directory. Every mutation
//! rewrites the collection file atomically (write to a sibling temp file,
//! then rename). Suited to a single bot process with a handful of small
//! collections; anything larger should bring its own [`DocumentStore`].

use argot_types::ScriptValue;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::{Collection, DocumentStore, GenericModel, StoreError};

/// File-backed document store rooted at a directory.
pub struct JsonFileStore {
    dir: PathBuf,
    collections: Mutex<HashMap<String, Arc<JsonCollection>>>,
}

impl JsonFileStore {
    /// Creates a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            collections: Mutex::new(HashMap::new()),
        })
    }
}

impl DocumentStore for JsonFileStore {
    fn open(&self, name: &str) -> Result<Arc<dyn Collection>, StoreError> {
        // Collection names become file names; keep them flat.
        if name.is_empty()
            || name
                .chars()
                .any(|c| c == '/' || c == '\\' || c == '.' || c.is_control())
        {
            return Err(StoreError::Backend(format!(
                "invalid collection name: {name:?}"
            )));
        }

        let mut collections = self.collections.lock();
        if let Some(coll) = collections.get(name) {
            return Ok(Arc::clone(coll) as Arc<dyn Collection>);
        }

        let path = self.dir.join(format!("{name}.json"));
        let coll = Arc::new(JsonCollection::load(path)?);
        collections.insert(name.to_string(), Arc::clone(&coll));
        Ok(coll as Arc<dyn Collection>)
    }
}

/// Serialized form of one collection file.
#[derive(Default, Serialize, Deserialize)]
struct FileState {
    indexed: BTreeSet<String>,
    docs: Vec<GenericModel>,
}

struct JsonCollection {
    path: PathBuf,
    state: Mutex<LoadedState>,
}

struct LoadedState {
    file: FileState,
    next_id: i64,
}

impl JsonCollection {
    fn load(path: PathBuf) -> Result<Self, StoreError> {
        let file = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            FileState::default()
        };

        let next_id = file
            .docs
            .iter()
            .filter_map(|doc| doc.id().ok())
            .max()
            .unwrap_or(0);
        debug!(path = %path.display(), docs = file.docs.len(), "loaded collection");

        Ok(Self {
            path,
            state: Mutex::new(LoadedState { file, next_id }),
        })
    }

    fn persist(path: &Path, file: &FileState) -> Result<(), StoreError> {
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(file)?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    fn position(file: &FileState, id: i64) -> Option<usize> {
        file.docs.iter().position(|doc| doc.id().ok() == Some(id))
    }
}

impl Collection for JsonCollection {
    fn insert(&self, model: &GenericModel) -> Result<i64, StoreError> {
        let mut state = self.state.lock();
        state.next_id += 1;
        let id = state.next_id;
        let mut stored = model.clone();
        stored.set_id(id);
        state.file.docs.push(stored);
        Self::persist(&self.path, &state.file)?;
        Ok(id)
    }

    fn update(&self, id: i64, model: &GenericModel) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        let Some(pos) = Self::position(&state.file, id) else {
            return Err(StoreError::Missing(id));
        };
        let mut stored = model.clone();
        stored.set_id(id);
        state.file.docs[pos] = stored;
        Self::persist(&self.path, &state.file)
    }

    fn fetch(&self, id: i64) -> Result<Option<GenericModel>, StoreError> {
        let state = self.state.lock();
        Ok(Self::position(&state.file, id).map(|pos| state.file.docs[pos].clone()))
    }

    fn fetch_all(&self) -> Result<Vec<GenericModel>, StoreError> {
        Ok(self.state.lock().file.docs.clone())
    }

    fn ensure_index(&self, fields: &[String]) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        let mut changed = false;
        for field in fields {
            changed |= state.file.indexed.insert(field.clone());
        }
        if changed {
            Self::persist(&self.path, &state.file)?;
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
            .file
            .docs
            .iter()
            .filter(|doc| doc.matches(pred))
            .cloned()
            .collect())
    }
}
