//! CLI commands for Pulse.
//!
//! Each command borrows a [`Site`](crate::site::Site), returns a
//! serializable output struct, and formats it as text or JSON:
//! - **Engagement**: record, top, show, clear
//! - **Visitor features**: share, subscribe, status

pub mod clear;
pub mod record;
pub mod share;
pub mod show;
pub mod status;
pub mod subscribe;
pub mod top;

pub use clear::ClearCommand;
pub use record::RecordCommand;
pub use share::ShareCommand;
pub use show::ShowCommand;
pub use status::StatusCommand;
pub use subscribe::SubscribeCommand;
pub use top::TopCommand;

use serde::Serialize;

/// Output options shared by every command.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Render an output struct according to `options`.
pub(crate) fn render<T: Serialize>(
    output: &T,
    options: &OutputOptions,
    human: impl FnOnce() -> String,
) -> String {
    if options.quiet {
        return String::new();
    }

    if options.json {
        serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
    } else {
        human()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        success: bool,
    }

    #[test]
    fn test_render_modes() {
        let sample = Sample { success: true };

        let quiet = OutputOptions {
            json: true,
            quiet: true,
        };
        assert_eq!(render(&sample, &quiet, || "text".to_string()), "");

        let json = OutputOptions {
            json: true,
            quiet: false,
        };
        let rendered = render(&sample, &json, || "text".to_string());
        assert!(rendered.contains("\"success\": true"));

        let text = OutputOptions::default();
        assert_eq!(render(&sample, &text, || "text".to_string()), "text");
    }
}
