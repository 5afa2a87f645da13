//! Show command for Pulse.
//!
//! Prints one item's counters and reward state.

use serde::Serialize;

use crate::cli::{render, OutputOptions};
use crate::site::Site;
use crate::stats::ItemStats;
use crate::storage::KeyValueStore;

/// Output format for the show command.
#[derive(Debug, Clone, Serialize)]
pub struct ShowOutput {
    pub success: bool,
    pub item_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ItemStats>,
    /// The visitor has shared this item.
    pub shared: bool,
    /// The item's reward is unlocked.
    pub unlocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The show command implementation.
pub struct ShowCommand<'a, S: KeyValueStore> {
    site: &'a Site<S>,
}

impl<'a, S: KeyValueStore> ShowCommand<'a, S> {
    pub fn new(site: &'a Site<S>) -> Self {
        Self { site }
    }

    pub fn run(&self, item_id: &str) -> ShowOutput {
        let (stats, error) = match self.site.tracker().get_stats(item_id) {
            Ok(stats) => (stats, None),
            Err(e) => (None, Some(e.to_string())),
        };

        ShowOutput {
            success: error.is_none(),
            item_id: item_id.to_string(),
            stats,
            shared: self.site.ledger().has_shared(item_id),
            unlocked: self.site.ledger().is_unlocked(item_id),
            error,
        }
    }

    pub fn format_output(&self, output: &ShowOutput, options: &OutputOptions) -> String {
        render(output, options, || {
            if let Some(error) = &output.error {
                return format!("Show failed: {}", error);
            }

            let Some(stats) = &output.stats else {
                return format!("No engagement recorded for {}", output.item_id);
            };

            let mut lines = vec![
                output.item_id.clone(),
                format!("  👁  views      {}", stats.views()),
                format!("  ⬇  downloads  {}", stats.downloads()),
                format!("  🔗 shares     {}", stats.shares()),
                format!("  ❤  favorites  {}", stats.favorites()),
                format!("  score {}", stats.score()),
            ];
            if output.unlocked {
                lines.push("  high-res version unlocked".to_string());
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
    use std::sync::Arc;

    fn site() -> Site<MemoryStore> {
        Site::new(Config::default(), Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_show_tracked_item() {
        let site = site();
        site.tracker().record_event("sunset.png", Action::Download).unwrap();
        site.share("sunset.png").unwrap();

        let cmd = ShowCommand::new(&site);
        let output = cmd.run("sunset.png");

        assert!(output.success);
        assert!(output.shared);
        assert!(output.unlocked);
        assert_eq!(output.stats.as_ref().unwrap().score(), 8);

        let text = cmd.format_output(&output, &OutputOptions::default());
        assert!(text.contains("score 8"));
        assert!(text.contains("unlocked"));
    }

    #[test]
    fn test_show_unknown_item() {
        let site = site();
        let cmd = ShowCommand::new(&site);
        let output = cmd.run("nothing.png");

        assert!(output.success);
        assert!(output.stats.is_none());
        assert_eq!(
            cmd.format_output(&output, &OutputOptions::default()),
            "No engagement recorded for nothing.png"
        );
    }

    #[test]
    fn test_show_invalid_item() {
        let site = site();
        let cmd = ShowCommand::new(&site);
        let output = cmd.run("   ");

        assert!(!output.success);
        assert!(output.error.is_some());
    }
}
