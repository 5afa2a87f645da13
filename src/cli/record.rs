//! Record command for Pulse.
//!
//! Counts one engagement event for an item.

use serde::Serialize;

use crate::cli::{render, OutputOptions};
use crate::site::Site;
use crate::stats::ItemStats;
use crate::storage::KeyValueStore;

/// Output format for the record command.
#[derive(Debug, Clone, Serialize)]
pub struct RecordOutput {
    pub success: bool,
    pub item_id: String,
    pub action: String,
    /// Counters after the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ItemStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The record command implementation.
pub struct RecordCommand<'a, S: KeyValueStore> {
    site: &'a Site<S>,
}

impl<'a, S: KeyValueStore> RecordCommand<'a, S> {
    pub fn new(site: &'a Site<S>) -> Self {
        Self { site }
    }

    pub fn run(&self, item_id: &str, action: &str) -> RecordOutput {
        let result = self.site.tracker().record(item_id, action);

        let (stats, error) = match result {
            Ok(stats) => (Some(stats), None),
            Err(e) => (None, Some(e.to_string())),
        };

        RecordOutput {
            success: error.is_none(),
            item_id: item_id.to_string(),
            action: action.to_string(),
            stats,
            error,
        }
    }

    pub fn format_output(&self, output: &RecordOutput, options: &OutputOptions) -> String {
        render(output, options, || match (&output.stats, &output.error) {
            (Some(stats), _) => format!(
                "Recorded {} for {}\n  views {} | downloads {} | shares {} | favorites {} | score {}",
                output.action,
                output.item_id,
                stats.views(),
                stats.downloads(),
                stats.shares(),
                stats.favorites(),
                stats.score()
            ),
            (None, error) => format!(
                "Record failed: {}",
                error.as_deref().unwrap_or("unknown error")
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    fn site() -> Site<MemoryStore> {
        Site::new(Config::default(), Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_record_success() {
        let site = site();
        let cmd = RecordCommand::new(&site);

        cmd.run("sunset.png", "view");
        let output = cmd.run("sunset.png", "download");

        assert!(output.success);
        let stats = output.stats.unwrap();
        assert_eq!(stats.views(), 1);
        assert_eq!(stats.downloads(), 1);
        assert_eq!(stats.score(), 4);
    }

    #[test]
    fn test_record_invalid_action() {
        let site = site();
        let cmd = RecordCommand::new(&site);

        let output = cmd.run("sunset.png", "like");

        assert!(!output.success);
        assert!(output.error.unwrap().contains("invalid action kind"));
        assert_eq!(site.tracker().get_stats("sunset.png").unwrap(), None);
    }

    #[test]
    fn test_record_rejects_non_canonical_action() {
        let site = site();
        let cmd = RecordCommand::new(&site);

        let output = cmd.run("sunset.png", " Download ");

        assert!(!output.success);
        assert!(output.error.unwrap().contains("invalid action kind"));
        assert_eq!(site.tracker().get_stats("sunset.png").unwrap(), None);
    }

    #[test]
    fn test_format_human() {
        let site = site();
        let cmd = RecordCommand::new(&site);
        let output = cmd.run("sunset.png", "share");

        let text = cmd.format_output(&output, &OutputOptions::default());
        assert!(text.contains("Recorded share for sunset.png"));
        assert!(text.contains("score 5"));
    }

    #[test]
    fn test_format_json() {
        let site = site();
        let cmd = RecordCommand::new(&site);
        let output = cmd.run("sunset.png", "favorite");

        let json = cmd.format_output(
            &output,
            &OutputOptions {
                json: true,
                quiet: false,
            },
        );
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["stats"]["favorites"], 1);
        assert_eq!(value["stats"]["score"], 2);
        assert!(value.get("error").is_none());
    }
}
