//! The persisted map of item identifiers to engagement counters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::stats::{Action, ItemStats};

/// All tracked items and their counters.
///
/// Encoded as a JSON object keyed by item identifier, matching what the
/// gallery page keeps under `trending_stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EngagementStore {
    items: BTreeMap<String, ItemStats>,
}

impl EngagementStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters for an item, if it has ever been recorded.
    pub fn get(&self, item_id: &str) -> Option<&ItemStats> {
        self.items.get(item_id)
    }

    /// Count one event, creating the item's record on first sight.
    pub fn record(&mut self, item_id: &str, action: Action) -> ItemStats {
        let stats = self.items.entry(item_id.to_string()).or_default();
        stats.increment(action);
        *stats
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate items in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ItemStats)> {
        self.items.iter().map(|(id, stats)| (id.as_str(), stats))
    }

    /// Encode as JSON.
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from JSON.
    pub fn decode(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

impl FromIterator<(String, ItemStats)> for EngagementStore {
    fn from_iter<I: IntoIterator<Item = (String, ItemStats)>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PulseError;

    #[test]
    fn test_record_creates_then_updates() {
        let mut store = EngagementStore::new();
        assert!(store.get("a.png").is_none());

        store.record("a.png", Action::View);
        let stats = store.record("a.png", Action::View);

        assert_eq!(stats.views(), 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a.png"), Some(&stats));
    }

    #[test]
    fn test_round_trip_preserves_counters_and_scores() {
        let mut store = EngagementStore::new();
        store.record("sunset.png", Action::View);
        store.record("sunset.png", Action::Download);
        store.record("forest.png", Action::Share);
        store.record("café ☕.jpg", Action::Favorite);

        let decoded = EngagementStore::decode(&store.encode().unwrap()).unwrap();

        assert_eq!(decoded, store);
        for (id, stats) in store.iter() {
            assert_eq!(decoded.get(id).map(|s| s.score()), Some(stats.score()));
        }
    }

    #[test]
    fn test_decode_stored_format() {
        let text = r#"{
            "sunset.png": {"views": 1, "downloads": 2, "shares": 0, "favorites": 0, "score": 7},
            "forest.png": {"views": 0, "downloads": 0, "shares": 1, "favorites": 0, "score": 5}
        }"#;
        let store = EngagementStore::decode(text).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("sunset.png").unwrap().score(), 7);
        assert_eq!(store.get("forest.png").unwrap().shares(), 1);
    }

    #[test]
    fn test_decode_rejects_malformed() {
        for text in ["", "null", "[]", r#"{"a.png": {"views": -1}}"#, "{"] {
            let err = EngagementStore::decode(text).unwrap_err();
            assert!(matches!(err, PulseError::Serde { .. }), "{:?}", text);
        }
    }

    #[test]
    fn test_iter_is_in_identifier_order() {
        let store: EngagementStore = ["c", "a", "b"]
            .into_iter()
            .map(|id| (id.to_string(), ItemStats::new()))
            .collect();

        let ids: Vec<&str> = store.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
