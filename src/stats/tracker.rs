//! Engagement tracker backed by a key-value store.
//!
//! Every recorded event is a read-modify-write of the whole
//! [`EngagementStore`] under one key, run through the store's `update` so
//! concurrent increments never collapse into one, even across trackers
//! sharing a store.

use crate::error::Result;
use crate::stats::{rank, validate_item_id, Action, EngagementStore, ItemStats, RankedItem};
use crate::storage::{load_lenient, update_json, KeyValueStore, Snapshot};

/// Store key holding the engagement map.
pub const TRENDING_STATS_KEY: &str = "trending_stats";

/// Records engagement events and answers ranked queries.
#[derive(Debug)]
pub struct EngagementTracker<S: KeyValueStore> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> EngagementTracker<S> {
    /// Create a tracker using the default `trending_stats` key.
    pub fn new(store: S) -> Self {
        Self::with_key(store, TRENDING_STATS_KEY)
    }

    /// Create a tracker that persists under a custom key.
    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// The store key this tracker persists under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record one event given as a string action name.
    ///
    /// Unknown actions fail with `InvalidActionKind` before the store is
    /// touched.
    pub fn record(&self, item_id: &str, action: &str) -> Result<ItemStats> {
        let action: Action = action.parse()?;
        self.record_event(item_id, action)
    }

    /// Record one event and persist the updated store.
    ///
    /// Returns the item's counters after the increment. Calling twice counts
    /// twice.
    pub fn record_event(&self, item_id: &str, action: Action) -> Result<ItemStats> {
        validate_item_id(item_id)?;

        let stats = update_json(&self.store, &self.key, |engagement: &mut EngagementStore| {
            (engagement.record(item_id, action), true)
        })?;

        tracing::debug!(
            item_id,
            action = %action,
            score = stats.score(),
            "recorded engagement event"
        );

        Ok(stats)
    }

    /// The `n` highest-scoring items, highest first.
    ///
    /// Ties are ordered by ascending item identifier. Unreadable or corrupted
    /// data yields an empty list.
    pub fn top_n(&self, n: usize) -> Vec<RankedItem> {
        if n == 0 {
            return Vec::new();
        }
        rank(&self.load(), n)
    }

    /// Counters for an item, or `None` if it has never been recorded.
    pub fn get_stats(&self, item_id: &str) -> Result<Option<ItemStats>> {
        validate_item_id(item_id)?;
        Ok(self.load().get(item_id).copied())
    }

    /// Read the stored map, reporting whether it is absent, valid or
    /// corrupted.
    pub fn snapshot(&self) -> Result<Snapshot<EngagementStore>> {
        Snapshot::read(&self.store, &self.key)
    }

    /// The stored map, or an empty one if it cannot be read.
    pub fn load(&self) -> EngagementStore {
        load_lenient(&self.store, &self.key)
    }

    /// Delete every item's counters.
    pub fn clear(&self) -> Result<()> {
        self.store.remove(&self.key)?;
        tracing::debug!(key = %self.key, "cleared engagement stats");
        Ok(())
    }
}
