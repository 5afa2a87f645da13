//! Per-item engagement counters and the actions that drive them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PulseError, Result};
use crate::stats::scoring;

/// Longest accepted item identifier, in bytes.
pub const MAX_ITEM_ID_LEN: usize = 512;

/// An engagement event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    View,
    Download,
    Share,
    Favorite,
}

impl Action {
    /// Every action, in display order.
    pub const ALL: [Action; 4] = [
        Action::View,
        Action::Download,
        Action::Share,
        Action::Favorite,
    ];

    /// The action's wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Download => "download",
            Self::Share => "share",
            Self::Favorite => "favorite",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = PulseError;

    /// Parse an exact lowercase action name.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "view" => Ok(Self::View),
            "download" => Ok(Self::Download),
            "share" => Ok(Self::Share),
            "favorite" => Ok(Self::Favorite),
            _ => Err(PulseError::invalid_action(s)),
        }
    }
}

/// Check that an item identifier is usable as a store key.
///
/// Identifiers must be non-blank, free of control characters and at most
/// [`MAX_ITEM_ID_LEN`] bytes.
pub fn validate_item_id(item_id: &str) -> Result<()> {
    if item_id.trim().is_empty() {
        return Err(PulseError::invalid_item_id(item_id, "must not be empty"));
    }
    if item_id.len() > MAX_ITEM_ID_LEN {
        return Err(PulseError::invalid_item_id(
            item_id,
            format!("longer than {} bytes", MAX_ITEM_ID_LEN),
        ));
    }
    if item_id.chars().any(char::is_control) {
        return Err(PulseError::invalid_item_id(
            item_id,
            "contains control characters",
        ));
    }
    Ok(())
}

/// Engagement counters for one item.
///
/// `score` is derived from the counters and recomputed on every mutation and
/// on decode; a stored score is never trusted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "StoredItemStats")]
pub struct ItemStats {
    views: u64,
    downloads: u64,
    shares: u64,
    favorites: u64,
    score: u64,
}

/// On-disk shape. Missing counters read as zero and any stored `score` is
/// ignored.
#[derive(Deserialize)]
struct StoredItemStats {
    #[serde(default)]
    views: u64,
    #[serde(default)]
    downloads: u64,
    #[serde(default)]
    shares: u64,
    #[serde(default)]
    favorites: u64,
}

impl From<StoredItemStats> for ItemStats {
    fn from(stored: StoredItemStats) -> Self {
        Self::from_counts(
            stored.views,
            stored.downloads,
            stored.shares,
            stored.favorites,
        )
    }
}

impl ItemStats {
    /// A record with every counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from counter values.
    pub fn from_counts(views: u64, downloads: u64, shares: u64, favorites: u64) -> Self {
        let mut stats = Self {
            views,
            downloads,
            shares,
            favorites,
            score: 0,
        };
        stats.recompute();
        stats
    }

    pub fn views(&self) -> u64 {
        self.views
    }

    pub fn downloads(&self) -> u64 {
        self.downloads
    }

    pub fn shares(&self) -> u64 {
        self.shares
    }

    pub fn favorites(&self) -> u64 {
        self.favorites
    }

    /// Weighted trending score.
    pub fn score(&self) -> u64 {
        self.score
    }

    /// Counter for a given action.
    pub fn count(&self, action: Action) -> u64 {
        match action {
            Action::View => self.views,
            Action::Download => self.downloads,
            Action::Share => self.shares,
            Action::Favorite => self.favorites,
        }
    }

    /// Count one event. Counters saturate rather than wrap.
    pub fn increment(&mut self, action: Action) {
        let counter = match action {
            Action::View => &mut self.views,
            Action::Download => &mut self.downloads,
            Action::Share => &mut self.shares,
            Action::Favorite => &mut self.favorites,
        };
        *counter = counter.saturating_add(1);
        self.recompute();
    }

    /// Sum of all counters.
    pub fn total_events(&self) -> u64 {
        Action::ALL
            .iter()
            .fold(0u64, |acc, a| acc.saturating_add(self.count(*a)))
    }

    fn recompute(&mut self) {
        self.score = scoring::score(self.views, self.downloads, self.shares, self.favorites);
    }
}
