//! File-based key-value storage for Pulse.
//!
//! Each key is stored as `<dir>/<key>.value`. Writes go through a temp file
//! and a rename so a crash mid-write never leaves a half-written value.
//! Every `FileStore` opened on the same directory in this process shares one
//! write lock.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use crate::error::{PulseError, Result};
use crate::storage::KeyValueStore;
use crate::util::read_to_string_limited;

/// Longest accepted key.
const MAX_KEY_LEN: usize = 128;

/// Write lock for `dir`, shared by every store opened on it.
fn dir_lock(dir: &Path) -> Arc<Mutex<()>> {
    static LOCKS: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();

    let key = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
    let mut locks = LOCKS
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    Arc::clone(locks.entry(key).or_default())
}

/// File-based key-value store.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Directory holding one file per key.
    dir: PathBuf,
    /// Serializes writes to `dir`.
    write_lock: Arc<Mutex<()>>,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();

        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| PulseError::storage(&dir, e))?;
        }

        let write_lock = dir_lock(&dir);
        Ok(Self { dir, write_lock })
    }

    /// Directory this store writes to.
    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }

    /// Validate a key so it maps to exactly one file inside `dir`.
    ///
    /// Keys are limited to ASCII letters, digits, `_` and `-`.
    fn validate_key(key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(PulseError::persistence(key, "key must not be empty"));
        }
        if key.len() > MAX_KEY_LEN {
            return Err(PulseError::persistence(
                key,
                format!("key longer than {} bytes", MAX_KEY_LEN),
            ));
        }
        if !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(PulseError::persistence(
                key,
                "key may only contain ASCII letters, digits, '_' and '-'",
            ));
        }
        Ok(())
    }

    fn value_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.value", key))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!(".{}.value.tmp", key))
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The guarded data is `()`, so a poisoned lock carries no broken state
        self.write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn read_value(&self, key: &str) -> Result<Option<String>> {
        let path = self.value_path(key);

        if !path.exists() {
            return Ok(None);
        }

        read_to_string_limited(&path).map(Some)
    }

    fn atomic_write(&self, key: &str, value: &str) -> Result<()> {
        let final_path = self.value_path(key);
        let temp_path = self.temp_path(key);

        {
            let mut file =
                fs::File::create(&temp_path).map_err(|e| PulseError::storage(&temp_path, e))?;
            file.write_all(value.as_bytes())
                .map_err(|e| PulseError::storage(&temp_path, e))?;
            file.sync_all()
                .map_err(|e| PulseError::storage(&temp_path, e))?;
        }

        // Rename is atomic on POSIX
        fs::rename(&temp_path, &final_path).map_err(|e| PulseError::storage(&final_path, e))?;

        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Self::validate_key(key)?;
        self.read_value(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        Self::validate_key(key)?;
        let _guard = self.lock();
        self.atomic_write(key, value)
    }

    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<&str>) -> Result<Option<String>>,
    ) -> Result<()> {
        Self::validate_key(key)?;
        let _guard = self.lock();

        let current = self.read_value(key)?;
        match apply(current.as_deref())? {
            Some(value) => self.atomic_write(key, &value),
            None => Ok(()),
        }
    }

    fn remove(&self, key: &str) -> Result<()> {
        Self::validate_key(key)?;
        let _guard = self.lock();
        let path = self.value_path(key);

        if path.exists() {
            fs::remove_file(&path).map_err(|e| PulseError::storage(&path, e))?;
        }

        // Leftover from an interrupted write
        let temp_path = self.temp_path(key);
        if temp_path.exists() {
            let _ = fs::remove_file(&temp_path);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::traits::tests::{test_concurrent_updates, test_key_value_store_crud};
    use tempfile::TempDir;

    fn create_test_store() -> (FileStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = FileStore::with_dir(dir.path()).unwrap();
        (store, dir)
    }

    #[test]
    fn test_file_store_crud() {
        let (store, _dir) = create_test_store();
        test_key_value_store_crud(&store);
    }

    #[test]
    fn test_stores_on_same_dir_serialize_updates() {
        let dir = TempDir::new().unwrap();
        let first = FileStore::with_dir(dir.path()).unwrap();
        let second = FileStore::with_dir(dir.path()).unwrap();

        assert!(Arc::ptr_eq(&first.write_lock, &second.write_lock));
        test_concurrent_updates(first, second);
    }

    #[test]
    fn test_stores_on_different_dirs_do_not_share_lock() {
        let (first, _a) = create_test_store();
        let (second, _b) = create_test_store();
        assert!(!Arc::ptr_eq(&first.write_lock, &second.write_lock));
    }

    #[test]
    fn test_with_dir_creates_directory() {
        let dir = TempDir::new().unwrap();
        let store_path = dir.path().join("nested").join("store");

        assert!(!store_path.exists());
        let store = FileStore::with_dir(&store_path).unwrap();

        assert!(store_path.is_dir());
        assert_eq!(store.dir(), store_path.as_path());
    }

    #[test]
    fn test_value_written_to_key_file() {
        let (store, dir) = create_test_store();

        store.set("shared_images", r#"["a.png"]"#).unwrap();

        let content = fs::read_to_string(dir.path().join("shared_images.value")).unwrap();
        assert_eq!(content, r#"["a.png"]"#);
        assert!(!store.temp_path("shared_images").exists());
    }

    #[test]
    fn test_values_survive_reopen() {
        let (store, dir) = create_test_store();
        store.set("membership_tier", "gold").unwrap();
        drop(store);

        let reopened = FileStore::with_dir(dir.path()).unwrap();
        assert_eq!(
            reopened.get("membership_tier").unwrap().as_deref(),
            Some("gold")
        );
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let (store, _dir) = create_test_store();

        for key in ["", "../escape", "a/b", ".hidden", "white space"] {
            let err = store.set(key, "x").unwrap_err();
            assert!(
                matches!(err, PulseError::Persistence { .. }),
                "key {:?} should be rejected",
                key
            );
        }

        let long_key = "k".repeat(MAX_KEY_LEN + 1);
        assert!(store.get(&long_key).is_err());
    }

    #[test]
    fn test_remove_cleans_temp_file() {
        let (store, _dir) = create_test_store();
        store.set("achievements", "[]").unwrap();
        fs::write(store.temp_path("achievements"), "partial").unwrap();

        store.remove("achievements").unwrap();

        assert!(!store.value_path("achievements").exists());
        assert!(!store.temp_path("achievements").exists());
    }
}
