//! Config accessor collaborator.

use parking_lot::Mutex;
use std::collections::HashMap;

/// String-keyed configuration, as scripts see it.
///
/// Loading configuration from files or the environment is the host's
/// concern; the bridge only reads and writes keys.
pub trait ConfigStore: Send + Sync {
    /// Returns the value for `key`, if set.
    fn get(&self, key: &str) -> Option<String>;

    /// Sets `key` to `value`.
    fn set(&self, key: &str, value: &str);
}

/// Process-scoped in-memory [`ConfigStore`].
#[derive(Default)]
pub struct MemoryConfig {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryConfig {
    /// Creates an empty config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config pre-populated from an iterator of pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Mutex::new(entries),
        }
    }
}

impl ConfigStore for MemoryConfig {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
    }
}
