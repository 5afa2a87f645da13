//! Status command for Pulse.
//!
//! Summarizes the visitor's feature state: enabled widgets, email prompt,
//! membership, achievements and rewards.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cli::{render, OutputOptions};
use crate::config::FeaturesConfig;
use crate::features::{Achievement, Badge, MembershipTier};
use crate::site::Site;
use crate::storage::KeyValueStore;

/// Output format for the status command.
#[derive(Debug, Clone, Serialize)]
pub struct StatusOutput {
    pub success: bool,
    pub features: FeaturesConfig,
    /// Number of items with recorded engagement.
    pub tracked_items: usize,
    pub email_prompt_due: bool,
    /// The prompt was marked shown by this run.
    pub email_prompt_marked: bool,
    pub subscribed: bool,
    pub membership_tier: MembershipTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<Badge>,
    pub achievements: Vec<Achievement>,
    pub shared_items: usize,
    pub unlocked_items: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The status command implementation.
pub struct StatusCommand<'a, S: KeyValueStore> {
    site: &'a Site<S>,
}

impl<'a, S: KeyValueStore> StatusCommand<'a, S> {
    pub fn new(site: &'a Site<S>) -> Self {
        Self { site }
    }

    /// Report status at `now`. With `mark_prompt_shown`, a due prompt is
    /// recorded as shown so the cooldown starts.
    pub fn run(&self, now: DateTime<Utc>, mark_prompt_shown: bool) -> StatusOutput {
        let site = self.site;
        let email_prompt_due = site.email_prompt_due(now);

        let mut email_prompt_marked = false;
        let mut error = None;
        if mark_prompt_shown && email_prompt_due {
            match site.mark_email_prompt_shown(now) {
                Ok(()) => email_prompt_marked = true,
                Err(e) => error = Some(e.to_string()),
            }
        }

        StatusOutput {
            success: error.is_none(),
            features: site.config().features.clone(),
            tracked_items: site.tracker().load().len(),
            email_prompt_due,
            email_prompt_marked,
            subscribed: site.prompt().is_subscribed(),
            membership_tier: site.membership().tier(),
            badge: site.membership_badge(),
            achievements: site.achievements().list(),
            shared_items: site.ledger().shared_items().len(),
            unlocked_items: site.ledger().unlocked_items().len(),
            error,
        }
    }

    pub fn format_output(&self, output: &StatusOutput, options: &OutputOptions) -> String {
        render(output, options, || {
            let on_off = |enabled: bool| if enabled { "on" } else { "off" };
            let features = &output.features;

            let mut lines = vec![
                "Pulse Status".to_string(),
                format!(
                    "  Features: social share {}, email prompt {}, trending {}, membership {}, achievements {}",
                    on_off(features.social_share),
                    on_off(features.email_prompt),
                    on_off(features.trending),
                    on_off(features.membership),
                    on_off(features.achievements)
                ),
                format!("  Tracked items: {}", output.tracked_items),
                format!(
                    "  Shared: {} | Unlocked: {}",
                    output.shared_items, output.unlocked_items
                ),
            ];

            let prompt = if output.subscribed {
                "subscribed"
            } else if output.email_prompt_marked {
                "shown now"
            } else if output.email_prompt_due {
                "due"
            } else {
                "not due"
            };
            lines.push(format!("  Email prompt: {}", prompt));

            match output.badge {
                Some(badge) => lines.push(format!("  Membership: {} {}", badge.icon, badge.name)),
                None => lines.push(format!(
                    "  Membership: {}",
                    output.membership_tier.as_str()
                )),
            }

            if output.achievements.is_empty() {
                lines.push("  Achievements: none".to_string());
            } else {
                lines.push("  Achievements:".to_string());
                for achievement in &output.achievements {
                    lines.push(format!(
                        "    🏆 {} - {}",
                        achievement.title(),
                        achievement.description()
                    ));
                }
            }

            if let Some(error) = &output.error {
                lines.push(format!("  Error: {}", error));
            }
            lines.join("\n")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::stats::Action;
    use crate::storage::MemoryStore;
    use chrono::Duration;
    use std::sync::Arc;

    fn site() -> Site<MemoryStore> {
        Site::new(Config::default(), Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_fresh_status() {
        let site = site();
        let cmd = StatusCommand::new(&site);
        let output = cmd.run(Utc::now(), false);

        assert!(output.success);
        assert_eq!(output.tracked_items, 0);
        assert!(output.email_prompt_due);
        assert!(!output.email_prompt_marked);
        assert_eq!(output.membership_tier, MembershipTier::Free);
        assert!(output.badge.is_none());
        assert!(output.achievements.is_empty());

        let text = cmd.format_output(&output, &OutputOptions::default());
        assert!(text.contains("Email prompt: due"));
        assert!(text.contains("Achievements: none"));
    }

    #[test]
    fn test_mark_prompt_shown() {
        let site = site();
        let cmd = StatusCommand::new(&site);
        let now = Utc::now();

        let output = cmd.run(now, true);
        assert!(output.email_prompt_marked);

        // Within the cooldown the prompt is neither due nor re-marked
        let later = cmd.run(now + Duration::hours(1), true);
        assert!(!later.email_prompt_due);
        assert!(!later.email_prompt_marked);
    }

    #[test]
    fn test_status_after_activity() {
        let site = site();
        site.tracker().record_event("a.png", Action::View).unwrap();
        site.share("b.png").unwrap();
        site.subscribe("artist@example.com").unwrap();
        site.membership().set_tier(MembershipTier::Gold).unwrap();

        let cmd = StatusCommand::new(&site);
        let output = cmd.run(Utc::now(), false);

        assert_eq!(output.tracked_items, 2);
        assert_eq!(output.shared_items, 1);
        assert_eq!(output.unlocked_items, 1);
        assert!(output.subscribed);
        assert!(!output.email_prompt_due);
        assert_eq!(output.achievements.len(), 2);
        assert_eq!(output.badge.unwrap().tier, MembershipTier::Gold);

        let text = cmd.format_output(&output, &OutputOptions::default());
        assert!(text.contains("Email prompt: subscribed"));
        assert!(text.contains("Social Sharer"));
        assert!(text.contains("Gold"));
    }
}
