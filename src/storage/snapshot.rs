//! Typed reads and updates of JSON values held in a [`KeyValueStore`].
//!
//! A read distinguishes a key that was never written from one that holds
//! data we cannot parse. Read paths may still fall back to an empty value,
//! but the fallback is logged instead of silent. Updates run inside the
//! store's own serialization, so every component sharing a store shares it.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{FailOpen, PulseError, Result};
use crate::storage::KeyValueStore;

/// Outcome of reading and decoding one stored value.
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot<T> {
    /// The key has never been written (or was removed).
    Absent,
    /// The stored value decoded successfully.
    Valid(T),
    /// A value is stored but cannot be decoded.
    Corrupted {
        /// Decoder error message.
        reason: String,
    },
}

impl<T: DeserializeOwned> Snapshot<T> {
    /// Read `key` from `store` and decode it.
    ///
    /// Only a failing store produces `Err`; undecodable data is reported as
    /// [`Snapshot::Corrupted`].
    pub fn read<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Result<Self> {
        let raw = store.get(key)?;
        Ok(Self::decode(raw.as_deref()))
    }

    /// Decode a raw stored value.
    pub fn decode(raw: Option<&str>) -> Self {
        match raw {
            None => Self::Absent,
            Some(text) => match serde_json::from_str(text) {
                Ok(value) => Self::Valid(value),
                Err(e) => Self::Corrupted {
                    reason: e.to_string(),
                },
            },
        }
    }
}

impl<T> Snapshot<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub fn is_corrupted(&self) -> bool {
        matches!(self, Self::Corrupted { .. })
    }

    /// The decoded value, if any.
    pub fn valid(self) -> Option<T> {
        match self {
            Self::Valid(value) => Some(value),
            _ => None,
        }
    }
}

impl<T: Default> Snapshot<T> {
    /// Collapse to a usable value, substituting the default for absent or
    /// corrupted data. Corruption is logged against `key`.
    pub fn recover(self, key: &str) -> T {
        match self {
            Self::Valid(value) => value,
            Self::Absent => T::default(),
            Self::Corrupted { reason } => {
                tracing::warn!(
                    key,
                    reason = %reason,
                    "stored value is corrupted, starting from empty"
                );
                T::default()
            }
        }
    }
}

/// Read a value for a query path.
///
/// Never fails: store errors and corruption both yield `T::default()` and a
/// warning.
pub fn load_lenient<T, S>(store: &S, key: &str) -> T
where
    T: DeserializeOwned + Default,
    S: KeyValueStore + ?Sized,
{
    Snapshot::read(store, key)
        .map(|snapshot| snapshot.recover(key))
        .fail_open_default(&format!("reading {}", key))
}

/// Read-modify-write a JSON value through [`KeyValueStore::update`].
///
/// `apply` receives the decoded value and returns its result plus whether it
/// changed the value; unchanged values are not written back. Corruption is
/// recovered as `T::default()` so the write repairs the key. A failing store
/// is surfaced, since writing over data we could not read would destroy it.
pub fn update_json<T, S, R>(
    store: &S,
    key: &str,
    apply: impl FnOnce(&mut T) -> (R, bool),
) -> Result<R>
where
    T: Serialize + DeserializeOwned + Default,
    S: KeyValueStore + ?Sized,
{
    let mut apply = Some(apply);
    let mut output = None;

    store.update(key, &mut |raw| {
        let Some(apply) = apply.take() else {
            return Ok(None);
        };

        let mut value = Snapshot::<T>::decode(raw).recover(key);
        let (result, changed) = apply(&mut value);
        output = Some(result);

        if changed {
            Ok(Some(serde_json::to_string(&value)?))
        } else {
            Ok(None)
        }
    })?;

    output.ok_or_else(|| PulseError::persistence(key, "store did not run the update"))
}
