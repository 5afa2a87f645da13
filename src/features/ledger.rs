//! Shared and unlocked items.
//!
//! Sharing an item unlocks its high-resolution reward. Both sets are stored
//! as JSON arrays in first-seen order.

use crate::error::Result;
use crate::stats::validate_item_id;
use crate::storage::{load_lenient, update_json, KeyValueStore};

/// Store key for items the visitor has shared.
pub const SHARED_IMAGES_KEY: &str = "shared_images";

/// Store key for items whose reward has been unlocked.
pub const UNLOCKED_IMAGES_KEY: &str = "unlocked_images";

/// Tracks which items were shared and which rewards are unlocked.
#[derive(Debug)]
pub struct ShareLedger<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> ShareLedger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Note a share. Returns `true` the first time an item is shared.
    pub fn record_share(&self, item_id: &str) -> Result<bool> {
        self.insert(SHARED_IMAGES_KEY, item_id)
    }

    /// Unlock an item's reward. Returns `true` if it was not unlocked before.
    pub fn unlock(&self, item_id: &str) -> Result<bool> {
        self.insert(UNLOCKED_IMAGES_KEY, item_id)
    }

    pub fn has_shared(&self, item_id: &str) -> bool {
        self.shared_items().iter().any(|id| id == item_id)
    }

    pub fn is_unlocked(&self, item_id: &str) -> bool {
        self.unlocked_items().iter().any(|id| id == item_id)
    }

    /// Shared items in first-share order.
    pub fn shared_items(&self) -> Vec<String> {
        load_lenient(&self.store, SHARED_IMAGES_KEY)
    }

    /// Unlocked items in unlock order.
    pub fn unlocked_items(&self) -> Vec<String> {
        load_lenient(&self.store, UNLOCKED_IMAGES_KEY)
    }

    fn insert(&self, key: &str, item_id: &str) -> Result<bool> {
        validate_item_id(item_id)?;

        let inserted = update_json(&self.store, key, |items: &mut Vec<String>| {
            if items.iter().any(|id| id == item_id) {
                return (false, false);
            }
            items.push(item_id.to_string());
            (true, true)
        })?;

        if inserted {
            tracing::debug!(key, item_id, "added item to ledger");
        }
        Ok(inserted)
    }
}
