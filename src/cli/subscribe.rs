//! Subscribe command for Pulse.
//!
//! Stores the visitor's newsletter email.

use serde::Serialize;

use crate::cli::{render, OutputOptions};
use crate::site::{Site, SubscribeReceipt};
use crate::storage::KeyValueStore;

/// Output format for the subscribe command.
#[derive(Debug, Clone, Serialize)]
pub struct SubscribeOutput {
    pub success: bool,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<SubscribeReceipt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The subscribe command implementation.
pub struct SubscribeCommand<'a, S: KeyValueStore> {
    site: &'a Site<S>,
}

impl<'a, S: KeyValueStore> SubscribeCommand<'a, S> {
    pub fn new(site: &'a Site<S>) -> Self {
        Self { site }
    }

    pub fn run(&self, email: &str) -> SubscribeOutput {
        let (receipt, error) = match self.site.subscribe(email) {
            Ok(receipt) => (Some(receipt), None),
            Err(e) => (None, Some(e.to_string())),
        };

        SubscribeOutput {
            success: error.is_none(),
            email: email.trim().to_string(),
            receipt,
            error,
        }
    }

    pub fn format_output(&self, output: &SubscribeOutput, options: &OutputOptions) -> String {
        render(output, options, || {
            let Some(receipt) = &output.receipt else {
                return format!(
                    "Subscribe failed: {}",
                    output.error.as_deref().unwrap_or("unknown error")
                );
            };

            let mut lines = vec![if receipt.newly_subscribed {
                format!("Subscribed {}", output.email)
            } else {
                format!("Updated subscription email to {}", output.email)
            }];
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
