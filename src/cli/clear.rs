//! Clear command for Pulse.
//!
//! Deletes all engagement counters. Requires explicit confirmation.

use serde::Serialize;

use crate::cli::{render, OutputOptions};
use crate::site::Site;
use crate::storage::KeyValueStore;

/// Output format for the clear command.
#[derive(Debug, Clone, Serialize)]
pub struct ClearOutput {
    pub success: bool,
    /// Number of items whose counters were removed.
    pub cleared: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ClearOutput {
    fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            cleared: 0,
            error: Some(error.into()),
        }
    }
}

/// The clear command implementation.
pub struct ClearCommand<'a, S: KeyValueStore> {
    site: &'a Site<S>,
}

impl<'a, S: KeyValueStore> ClearCommand<'a, S> {
    pub fn new(site: &'a Site<S>) -> Self {
        Self { site }
    }

    pub fn run(&self, confirmed: bool) -> ClearOutput {
        if !confirmed {
            return ClearOutput::failure("refusing to clear engagement stats without --yes");
        }

        let tracker = self.site.tracker();
        let cleared = tracker.load().len();
        match tracker.clear() {
            Ok(()) => ClearOutput {
                success: true,
                cleared,
                error: None,
            },
            Err(e) => ClearOutput::failure(e.to_string()),
        }
    }

    pub fn format_output(&self, output: &ClearOutput, options: &OutputOptions) -> String {
        render(output, options, || match &output.error {
            Some(error) => format!("Clear failed: {}", error),
            None => format!("Cleared engagement stats for {} item(s)", output.cleared),
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

    fn seeded_site() -> Site<MemoryStore> {
        let site = Site::new(Config::default(), Arc::new(MemoryStore::new()));
        site.tracker().record_event("a.png", Action::View).unwrap();
        site.tracker().record_event("b.png", Action::Share).unwrap();
        site
    }

    #[test]
    fn test_clear_requires_confirmation() {
        let site = seeded_site();
        let output = ClearCommand::new(&site).run(false);

        assert!(!output.success);
        assert!(output.error.unwrap().contains("--yes"));
        assert_eq!(site.tracker().load().len(), 2);
    }

    #[test]
    fn test_clear() {
        let site = seeded_site();
        let cmd = ClearCommand::new(&site);
        let output = cmd.run(true);

        assert!(output.success);
        assert_eq!(output.cleared, 2);
        assert!(site.tracker().top_n(5).is_empty());
        assert_eq!(
            cmd.format_output(&output, &OutputOptions::default()),
            "Cleared engagement stats for 2 item(s)"
        );
    }
}
