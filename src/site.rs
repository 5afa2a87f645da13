//! The gallery site's engagement features, wired to one store.
//!
//! A `Site` is constructed once per session with its store injected and
//! handed to whatever needs it. Each widget is gated by its feature flag;
//! a disabled widget reads as empty rather than failing.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::Config;
use crate::error::Result;
use crate::features::{
    Achievement, Achievements, Badge, EmailPrompt, Membership, ShareLedger,
};
use crate::stats::{Action, EngagementTracker, ItemStats, RankedItem};
use crate::storage::KeyValueStore;

/// What happened when an item was shared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareReceipt {
    /// The shared item.
    pub item_id: String,
    /// The item's counters after the share.
    pub stats: ItemStats,
    /// First time this visitor shared the item.
    pub first_share: bool,
    /// The item's reward was unlocked by this share.
    pub newly_unlocked: bool,
    /// Achievement earned by this share, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub achievement: Option<Achievement>,
}

/// What happened when the visitor subscribed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscribeReceipt {
    /// The visitor was not subscribed before.
    pub newly_subscribed: bool,
    /// Achievement earned by subscribing, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub achievement: Option<Achievement>,
}

/// Engagement features for one gallery, sharing one store.
#[derive(Debug)]
pub struct Site<S: KeyValueStore> {
    config: Config,
    tracker: EngagementTracker<Arc<S>>,
    ledger: ShareLedger<Arc<S>>,
    achievements: Achievements<Arc<S>>,
    prompt: EmailPrompt<Arc<S>>,
    membership: Membership<Arc<S>>,
}

impl<S: KeyValueStore> Site<S> {
    pub fn new(config: Config, store: Arc<S>) -> Self {
        let cooldown = config.prompt.cooldown();
        Self {
            tracker: EngagementTracker::new(Arc::clone(&store)),
            ledger: ShareLedger::new(Arc::clone(&store)),
            achievements: Achievements::new(Arc::clone(&store)),
            prompt: EmailPrompt::new(Arc::clone(&store), cooldown),
            membership: Membership::new(store),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tracker(&self) -> &EngagementTracker<Arc<S>> {
        &self.tracker
    }

    pub fn ledger(&self) -> &ShareLedger<Arc<S>> {
        &self.ledger
    }

    pub fn achievements(&self) -> &Achievements<Arc<S>> {
        &self.achievements
    }

    pub fn prompt(&self) -> &EmailPrompt<Arc<S>> {
        &self.prompt
    }

    pub fn membership(&self) -> &Membership<Arc<S>> {
        &self.membership
    }

    /// Share an item: count the share, unlock the item's reward and grant
    /// the sharer achievement.
    ///
    /// The share is counted first. If a later step fails, the item is not
    /// yet marked shared, so a retry still reports `first_share`.
    ///
    /// Returns `None` when social sharing is disabled.
    pub fn share(&self, item_id: &str) -> Result<Option<ShareReceipt>> {
        if !self.config.features.social_share {
            tracing::debug!(item_id, "social share disabled, ignoring share");
            return Ok(None);
        }

        let stats = self.tracker.record_event(item_id, Action::Share)?;
        let first_share = self.ledger.record_share(item_id)?;
        let newly_unlocked = self.ledger.unlock(item_id)?;
        let achievement = self.award(Achievement::SocialSharer)?;

        Ok(Some(ShareReceipt {
            item_id: item_id.to_string(),
            stats,
            first_share,
            newly_unlocked,
            achievement,
        }))
    }

    /// The trending list, `trending.limit` items long at most.
    ///
    /// Empty when the trending feature is disabled.
    pub fn trending(&self) -> Vec<RankedItem> {
        if !self.config.features.trending {
            return Vec::new();
        }
        self.tracker.top_n(self.config.trending.limit)
    }

    /// Whether the email prompt should be shown at `now`.
    pub fn email_prompt_due(&self, now: DateTime<Utc>) -> bool {
        self.config.features.email_prompt && self.prompt.is_due(now)
    }

    pub fn mark_email_prompt_shown(&self, now: DateTime<Utc>) -> Result<()> {
        self.prompt.mark_shown(now)
    }

    /// Subscribe the visitor and grant the newsletter achievement.
    pub fn subscribe(&self, email: &str) -> Result<SubscribeReceipt> {
        let newly_subscribed = self.prompt.subscribe(email)?;
        let achievement = self.award(Achievement::NewsletterSubscriber)?;

        Ok(SubscribeReceipt {
            newly_subscribed,
            achievement,
        })
    }

    /// Grant `achievement` if achievements are enabled. Returns it when this
    /// call earned it.
    fn award(&self, achievement: Achievement) -> Result<Option<Achievement>> {
        if !self.config.features.achievements {
            return Ok(None);
        }
        Ok(self.achievements.grant(achievement)?.then_some(achievement))
    }

    /// The visitor's membership badge, if the feature is on and the tier
    /// has one.
    pub fn membership_badge(&self) -> Option<Badge> {
        if !self.config.features.membership {
            return None;
        }
        self.membership.tier().badge()
    }
}
