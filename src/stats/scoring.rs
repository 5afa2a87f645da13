//! Trending score and top-N ranking.
//!
//! Scoring weights:
//! - Share: 5
//! - Download: 3
//! - Favorite: 2
//! - View: 1
//!
//! Scores are summed, saturating at `u64::MAX`.

use serde::{Deserialize, Serialize};

use crate::stats::{EngagementStore, ItemStats};

/// Score weights per action.
pub mod weights {
    /// Weight for a view.
    pub const VIEW: u64 = 1;
    /// Weight for a download.
    pub const DOWNLOAD: u64 = 3;
    /// Weight for a share.
    pub const SHARE: u64 = 5;
    /// Weight for a favorite.
    pub const FAVORITE: u64 = 2;
}

/// Weighted trending score for a set of counters.
pub fn score(views: u64, downloads: u64, shares: u64, favorites: u64) -> u64 {
    downloads
        .saturating_mul(weights::DOWNLOAD)
        .saturating_add(shares.saturating_mul(weights::SHARE))
        .saturating_add(favorites.saturating_mul(weights::FAVORITE))
        .saturating_add(views.saturating_mul(weights::VIEW))
}

/// An item with its counters, as returned by ranked queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedItem {
    /// The item identifier.
    pub item_id: String,
    /// The item's counters and score.
    pub stats: ItemStats,
}

impl RankedItem {
    pub fn new(item_id: impl Into<String>, stats: ItemStats) -> Self {
        Self {
            item_id: item_id.into(),
            stats,
        }
    }

    pub fn score(&self) -> u64 {
        self.stats.score()
    }
}

/// Rank items by score, highest first, and keep the top `limit`.
///
/// Equal scores are ordered by ascending item identifier so the result does
/// not depend on map or sort internals.
pub fn rank(store: &EngagementStore, limit: usize) -> Vec<RankedItem> {
    if limit == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<RankedItem> = store
        .iter()
        .map(|(id, stats)| RankedItem::new(id, *stats))
        .collect();

    ranked.sort_by(|a, b| {
        b.score()
            .cmp(&a.score())
            .then_with(|| a.item_id.cmp(&b.item_id))
    });

    ranked.truncate(limit);
    ranked
}
