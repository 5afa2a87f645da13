//! In-memory key-value storage.
//!
//! Thread-safe implementation of [`KeyValueStore`] used by tests and by
//! hosts that keep state only for the lifetime of the process.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{PulseError, Result};
use crate::storage::KeyValueStore;

/// In-memory key-value store.
///
/// Values are lost when the store is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of keys in the store.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned(key: &str) -> PulseError {
        PulseError::persistence(key, "memory store lock poisoned")
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().map_err(|_| Self::poisoned(key))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned(key))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned(key))?;
        entries.remove(key);
        Ok(())
    }

    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<&str>) -> Result<Option<String>>,
    ) -> Result<()> {
        // Held across `apply` so concurrent updates run one at a time
        let mut entries = self.entries.write().map_err(|_| Self::poisoned(key))?;
        let next = apply(entries.get(key).map(String::as_str))?;
        if let Some(value) = next {
            entries.insert(key.to_string(), value);
        }
        Ok(())
    }
}
