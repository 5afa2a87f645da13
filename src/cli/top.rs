//! Top command for Pulse.
//!
//! Shows the trending list.

use serde::Serialize;

use crate::cli::{render, OutputOptions};
use crate::site::Site;
use crate::stats::RankedItem;
use crate::storage::KeyValueStore;

/// Output format for the top command.
#[derive(Debug, Clone, Serialize)]
pub struct TopOutput {
    pub success: bool,
    /// Whether the trending widget is enabled.
    pub trending_enabled: bool,
    /// Requested list size.
    pub limit: usize,
    /// Ranked items, highest score first.
    pub items: Vec<RankedItem>,
}

/// Caption for an item: file stem with underscores as spaces.
pub fn display_name(item_id: &str) -> String {
    let stem = item_id.split('.').next().unwrap_or(item_id);
    stem.replace('_', " ")
}

/// The top command implementation.
pub struct TopCommand<'a, S: KeyValueStore> {
    site: &'a Site<S>,
}

impl<'a, S: KeyValueStore> TopCommand<'a, S> {
    pub fn new(site: &'a Site<S>) -> Self {
        Self { site }
    }

    /// Without a limit this is the trending widget's list (empty when the
    /// widget is disabled). An explicit limit queries the tracker directly.
    pub fn run(&self, limit: Option<usize>) -> TopOutput {
        let (limit, items) = match limit {
            Some(n) => (n, self.site.tracker().top_n(n)),
            None => (self.site.config().trending.limit, self.site.trending()),
        };

        TopOutput {
            success: true,
            trending_enabled: self.site.config().features.trending,
            limit,
            items,
        }
    }

    pub fn format_output(&self, output: &TopOutput, options: &OutputOptions) -> String {
        render(output, options, || {
            if output.items.is_empty() {
                return if output.trending_enabled {
                    "No trending items yet.".to_string()
                } else {
                    "Trending is disabled.".to_string()
                };
            }

            let mut lines = vec!["🔥 Trending Now".to_string()];
            for (index, item) in output.items.iter().enumerate() {
                lines.push(format!(
                    "  #{:<3} {:<32} score {:>6}  ({} downloads)",
                    index + 1,
                    display_name(&item.item_id),
                    item.score(),
                    item.stats.downloads()
                ));
            }
            lines.join("\n")
        })
    }
}
