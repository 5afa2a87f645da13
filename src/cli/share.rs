//! Share command for Pulse.
//!
//! Shares an item and reports rewards earned by the share.

use serde::Serialize;

use crate::cli::{render, OutputOptions};
use crate::site::{ShareReceipt, Site};
use crate::storage::KeyValueStore;

/// Output format for the share command.
#[derive(Debug, Clone, Serialize)]
pub struct ShareOutput {
    pub success: bool,
    pub item_id: String,
    /// Whether social sharing is enabled.
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<ShareReceipt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The share command implementation.
pub struct ShareCommand<'a, S: KeyValueStore> {
    site: &'a Site<S>,
}

impl<'a, S: KeyValueStore> ShareCommand<'a, S> {
    pub fn new(site: &'a Site<S>) -> Self {
        Self { site }
    }

    pub fn run(&self, item_id: &str) -> ShareOutput {
        let (receipt, error) = match self.site.share(item_id) {
            Ok(receipt) => (receipt, None),
            Err(e) => (None, Some(e.to_string())),
        };

        ShareOutput {
            success: error.is_none(),
            item_id: item_id.to_string(),
            enabled: self.site.config().features.social_share,
            receipt,
            error,
        }
    }

    pub fn format_output(&self, output: &ShareOutput, options: &OutputOptions) -> String {
        render(output, options, || {
            if let Some(error) = &output.error {
                return format!("Share failed: {}", error);
            }

            let Some(receipt) = &output.receipt else {
                return "Social sharing is disabled.".to_string();
            };

            let mut lines = vec![format!(
                "Shared {} (shares {}, score {})",
                receipt.item_id,
                receipt.stats.shares(),
                receipt.stats.score()
            )];
            if receipt.newly_unlocked {
                lines.push("🎉 Reward unlocked: high-res version available".to_string());
            }
            if let Some(achievement) = receipt.achievement {
                lines.push(format!(
                    "🏆 Achievement unlocked: {} - {}",
                    achievement.title(),
                    achievement.description()
                ));
            }
            lines.join("\n")
        })
    }
}
