//! Visitor achievements.
//!
//! Earned achievements live in the `achievements` array of the visitor's
//! progress object, next to counters (visits, streak, favorites) owned by
//! the page's progress tracker. Those other fields, and achievement ids we
//! do not know, are carried through every update unchanged.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{PulseError, Result};
use crate::storage::{load_lenient, update_json, KeyValueStore};

/// Store key for the visitor progress object.
pub const PROGRESS_KEY: &str = "freefineai_progress";

/// The stored progress object. Only `achievements` is interpreted.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Progress {
    #[serde(default)]
    achievements: Vec<String>,
    #[serde(flatten)]
    other: Map<String, Value>,
}

/// Achievements this crate can grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    /// First shared image.
    SocialSharer,
    /// Subscribed to the newsletter.
    NewsletterSubscriber,
}

impl Achievement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SocialSharer => "social_sharer",
            Self::NewsletterSubscriber => "newsletter_subscriber",
        }
    }

    /// Human-readable name.
    pub fn title(&self) -> &'static str {
        match self {
            Self::SocialSharer => "Social Sharer",
            Self::NewsletterSubscriber => "Newsletter Subscriber",
        }
    }

    /// How the achievement is earned.
    pub fn description(&self) -> &'static str {
        match self {
            Self::SocialSharer => "Share your first image!",
            Self::NewsletterSubscriber => "Subscribe to weekly inspiration",
        }
    }
}

impl fmt::Display for Achievement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Achievement {
    type Err = PulseError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "social_sharer" => Ok(Self::SocialSharer),
            "newsletter_subscriber" => Ok(Self::NewsletterSubscriber),
            other => Err(PulseError::serde(format!("unknown achievement: {}", other))),
        }
    }
}

/// Earned achievements for the current visitor.
#[derive(Debug)]
pub struct Achievements<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> Achievements<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Grant an achievement. Returns `true` if it was not already earned.
    pub fn grant(&self, achievement: Achievement) -> Result<bool> {
        let granted = update_json(&self.store, PROGRESS_KEY, |progress: &mut Progress| {
            if progress.achievements.iter().any(|a| a == achievement.as_str()) {
                return (false, false);
            }
            progress.achievements.push(achievement.as_str().to_string());
            (true, true)
        })?;

        if granted {
            tracing::debug!(achievement = %achievement, "achievement granted");
        }
        Ok(granted)
    }

    pub fn has(&self, achievement: Achievement) -> bool {
        self.raw().iter().any(|a| a == achievement.as_str())
    }

    /// Earned achievements this crate knows about, in the order earned.
    pub fn list(&self) -> Vec<Achievement> {
        self.raw().iter().filter_map(|a| a.parse().ok()).collect()
    }

    fn raw(&self) -> Vec<String> {
        load_lenient::<Progress, _>(&self.store, PROGRESS_KEY).achievements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    #[test]
    fn test_grant_once() {
        let achievements = Achievements::new(MemoryStore::new());
        assert!(!achievements.has(Achievement::SocialSharer));

        assert!(achievements.grant(Achievement::SocialSharer).unwrap());
        assert!(!achievements.grant(Achievement::SocialSharer).unwrap());

        assert!(achievements.has(Achievement::SocialSharer));
        assert_eq!(achievements.list(), vec![Achievement::SocialSharer]);
    }

    #[test]
    fn test_progress_fields_preserved() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                PROGRESS_KEY,
                r#"{"visits":3,"streak":2,"favoriteImages":["a.png"],"achievements":["first_download"]}"#,
            )
            .unwrap();
        let achievements = Achievements::new(Arc::clone(&store));

        assert!(achievements
            .grant(Achievement::NewsletterSubscriber)
            .unwrap());

        assert_eq!(achievements.list(), vec![Achievement::NewsletterSubscriber]);
        let raw = store.get(PROGRESS_KEY).unwrap().unwrap();
        let progress: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(progress["visits"], 3);
        assert_eq!(progress["streak"], 2);
        assert_eq!(progress["favoriteImages"][0], "a.png");
        assert_eq!(
            progress["achievements"],
            serde_json::json!(["first_download", "newsletter_subscriber"])
        );
    }

    #[test]
    fn test_progress_without_achievements_array() {
        let store = Arc::new(MemoryStore::new());
        store.set(PROGRESS_KEY, r#"{"visits":1}"#).unwrap();
        let achievements = Achievements::new(Arc::clone(&store));

        assert!(achievements.list().is_empty());
        assert!(achievements.grant(Achievement::SocialSharer).unwrap());

        let raw = store.get(PROGRESS_KEY).unwrap().unwrap();
        let progress: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(progress["visits"], 1);
        assert_eq!(progress["achievements"], serde_json::json!(["social_sharer"]));
    }

    #[test]
    fn test_parse_round_trip() {
        for achievement in [Achievement::SocialSharer, Achievement::NewsletterSubscriber] {
            assert_eq!(achievement.as_str().parse::<Achievement>().unwrap(), achievement);
            assert_eq!(
                serde_json::to_string(&achievement).unwrap(),
                format!("\"{}\"", achievement)
            );
        }
        assert!("top_fan".parse::<Achievement>().is_err());
    }

    #[test]
    fn test_concurrent_grants_through_separate_handles() {
        use std::thread;

        for _ in 0..20 {
            let store = Arc::new(MemoryStore::new());
            let handles: Vec<_> = [Achievement::SocialSharer, Achievement::NewsletterSubscriber]
                .into_iter()
                .map(|achievement| {
                    let achievements = Achievements::new(Arc::clone(&store));
                    thread::spawn(move || achievements.grant(achievement).unwrap())
                })
                .collect();

            for handle in handles {
                assert!(handle.join().unwrap());
            }
            assert_eq!(Achievements::new(store).list().len(), 2);
        }
    }
}
