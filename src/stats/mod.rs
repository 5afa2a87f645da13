//! Engagement stats for Pulse.
//!
//! Per-item counters (views, downloads, shares, favorites), the weighted
//! trending score derived from them, and the tracker that persists them
//! through a [`KeyValueStore`](crate::storage::KeyValueStore).

pub mod engagement;
pub mod item;
pub mod scoring;
pub mod tracker;

pub use engagement::EngagementStore;
pub use item::{validate_item_id, Action, ItemStats, MAX_ITEM_ID_LEN};
pub use scoring::{rank, score, weights, RankedItem};
pub use tracker::{EngagementTracker, TRENDING_STATS_KEY};
