//! Key/value data collaborator.

use argot_types::ScriptValue;
use parking_lot::Mutex;
use std::collections::HashMap;

/// The shared `data.Get`/`data.Set` surface.
///
/// Values are [`ScriptValue`]s, so whatever one language stores another
/// can read — this map is a deliberate cross-language side channel.
pub trait KvStore: Send + Sync {
    /// Returns the stored value for `key`, if any.
    fn get(&self, key: &str) -> Option<ScriptValue>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: ScriptValue);
}

/// Process-scoped in-memory [`KvStore`].
#[derive(Default)]
pub struct MemoryKv {
    entries: Mutex<HashMap<String, ScriptValue>>,
}

impl MemoryKv {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Option<ScriptValue> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: ScriptValue) {
        self.entries.lock().insert(key.to_string(), value);
    }
}
