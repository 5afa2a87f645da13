//! Key-value storage trait for Pulse.
//!
//! This module defines the `KeyValueStore` trait, the local-storage seam that
//! every stateful component reads and writes through.

use std::sync::Arc;

use crate::error::Result;

/// Trait for string-keyed, string-valued storage backends.
///
/// Stores hold opaque strings. Encoding and decoding happen in the
/// components, so a store never needs to know what it is holding.
pub trait KeyValueStore: Send + Sync {
    /// Retrieve the value for a key.
    ///
    /// Returns `Ok(None)` if the key has never been written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key.
    ///
    /// Returns `Ok(())` even if the key doesn't exist.
    fn remove(&self, key: &str) -> Result<()>;

    /// Replace a key's value with one computed from its current value.
    ///
    /// `apply` sees the current value (`None` if absent) and returns the
    /// value to store, or `None` to leave the key untouched. Updates, sets
    /// and removes on one store are serialized, so two read-modify-write
    /// cycles on the same key never lose a write.
    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<&str>) -> Result<Option<String>>,
    ) -> Result<()>;

    /// Check if a key exists.
    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// Blanket implementation of KeyValueStore for Arc-wrapped stores.
///
/// Lets several components share one store.
impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }

    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<&str>) -> Result<Option<String>>,
    ) -> Result<()> {
        (**self).update(key, apply)
    }
}
