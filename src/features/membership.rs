//! Membership tier and badge lookup.
//!
//! The tier is display-only; nothing here enforces paid access.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FailOpen, Result};
use crate::storage::KeyValueStore;

/// Store key for the visitor's membership tier.
pub const MEMBERSHIP_TIER_KEY: &str = "membership_tier";

/// Membership levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipTier {
    #[default]
    Free,
    Silver,
    Gold,
    Platinum,
}

/// Badge shown next to the visitor's stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub tier: MembershipTier,
    pub name: &'static str,
    pub icon: &'static str,
}

impl MembershipTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Silver => "silver",
            Self::Gold => "gold",
            Self::Platinum => "platinum",
        }
    }

    /// Parse a stored tier name.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "free" => Some(Self::Free),
            "silver" => Some(Self::Silver),
            "gold" => Some(Self::Gold),
            "platinum" => Some(Self::Platinum),
            _ => None,
        }
    }

    /// Badge for paid tiers; free members get none.
    pub fn badge(&self) -> Option<Badge> {
        let (name, icon) = match self {
            Self::Free => return None,
            Self::Silver => ("Silver", "🥈"),
            Self::Gold => ("Gold", "🥇"),
            Self::Platinum => ("Platinum", "💎"),
        };
        Some(Badge {
            tier: *self,
            name,
            icon,
        })
    }
}

impl fmt::Display for MembershipTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reads and writes the stored membership tier.
#[derive(Debug)]
pub struct Membership<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> Membership<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The stored tier, `Free` when unset or unrecognized.
    pub fn tier(&self) -> MembershipTier {
        let Some(raw) = self
            .store
            .get(MEMBERSHIP_TIER_KEY)
            .fail_open_default("reading membership tier")
        else {
            return MembershipTier::Free;
        };

        MembershipTier::parse(&raw).unwrap_or_else(|| {
            tracing::warn!(value = %raw, "unknown membership tier, treating as free");
            MembershipTier::Free
        })
    }

    pub fn set_tier(&self, tier: MembershipTier) -> Result<()> {
        self.store.set(MEMBERSHIP_TIER_KEY, tier.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_default_tier_is_free() {
        let membership = Membership::new(MemoryStore::new());
        assert_eq!(membership.tier(), MembershipTier::Free);
        assert!(membership.tier().badge().is_none());
    }

    #[test]
    fn test_set_and_read_tier() {
        let membership = Membership::new(MemoryStore::new());
        membership.set_tier(MembershipTier::Gold).unwrap();

        assert_eq!(membership.tier(), MembershipTier::Gold);
        let badge = membership.tier().badge().unwrap();
        assert_eq!(badge.name, "Gold");
        assert_eq!(badge.tier, MembershipTier::Gold);
    }

    #[test]
    fn test_unknown_tier_is_free() {
        let store = MemoryStore::new();
        store.set(MEMBERSHIP_TIER_KEY, "diamond").unwrap();
        assert_eq!(Membership::new(store).tier(), MembershipTier::Free);
    }

    #[test]
    fn test_every_paid_tier_has_badge() {
        for tier in [
            MembershipTier::Silver,
            MembershipTier::Gold,
            MembershipTier::Platinum,
        ] {
            assert_eq!(MembershipTier::parse(tier.as_str()), Some(tier));
            assert!(tier.badge().is_some());
        }
    }
}
