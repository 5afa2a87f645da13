//! Pulse - engagement tracking for a gallery site
//!
//! CLI entry point with global panic handler.

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use pulse::cli::{
    ClearCommand, OutputOptions, RecordCommand, ShareCommand, ShowCommand, StatusCommand,
    SubscribeCommand, TopCommand,
};
use pulse::config::{pulse_home, Config};
use pulse::error::{exit_codes, PulseError};
use pulse::site::Site;
use pulse::storage::FileStore;

// =============================================================================
// CLI Definition
// =============================================================================

/// Pulse - engagement tracking for a gallery site
#[derive(Parser)]
#[command(name = "pulse")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output as JSON
    #[arg(long, short, global = true)]
    json: bool,
    /// Suppress output
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record one engagement event (view, download, share, favorite)
    Record {
        /// Item identifier, e.g. the image file name
        item_id: String,
        /// Kind of engagement
        action: String,
    },

    /// Show the trending list
    Top {
        /// Number of items (defaults to trending.limit)
        #[arg(long, short)]
        limit: Option<usize>,
    },

    /// Show one item's counters and score
    Show {
        /// Item identifier
        item_id: String,
    },

    /// Share an item and unlock its reward
    Share {
        /// Item identifier
        item_id: String,
    },

    /// Subscribe to the newsletter
    Subscribe {
        /// Email address
        email: String,
    },

    /// Show feature status for the visitor
    Status {
        /// Record the email prompt as shown if it is due
        #[arg(long)]
        mark_prompt_shown: bool,
    },

    /// Delete all engagement counters
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() -> ExitCode {
    setup_panic_handler();
    init_logging();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("pulse error: {}", e);
            ExitCode::from(exit_codes::ERROR as u8)
        }
    }
}

/// Set up the global panic handler.
///
/// On panic, logs to ~/.pulse/crash.log and exits with code 3.
fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("pulse panic: {}", info);

        if let Some(home) = pulse_home() {
            let crash_log = home.join("crash.log");
            let _ = std::fs::create_dir_all(&home);
            if let Ok(mut file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&crash_log)
            {
                let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
                let _ = writeln!(file, "[{}] {}", timestamp, info);
            }
        }

        std::process::exit(exit_codes::CRASH);
    }));
}

/// Log to stderr, filtered by `PULSE_LOG` (default `warn`).
fn init_logging() {
    let filter = EnvFilter::try_from_env("PULSE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Run the CLI and return the exit code.
fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let options = OutputOptions {
        json: cli.json,
        quiet: cli.quiet,
    };

    let config = Config::load();
    let dir = config
        .store_dir()
        .ok_or_else(|| PulseError::config("could not determine store directory"))?;
    let store = FileStore::with_dir(dir)?;
    let site = Site::new(config, Arc::new(store));

    let (formatted, success) = match cli.command {
        Commands::Record { item_id, action } => {
            let cmd = RecordCommand::new(&site);
            let output = cmd.run(&item_id, &action);
            (cmd.format_output(&output, &options), output.success)
        }
        Commands::Top { limit } => {
            let cmd = TopCommand::new(&site);
            let output = cmd.run(limit);
            (cmd.format_output(&output, &options), output.success)
        }
        Commands::Show { item_id } => {
            let cmd = ShowCommand::new(&site);
            let output = cmd.run(&item_id);
            (cmd.format_output(&output, &options), output.success)
        }
        Commands::Share { item_id } => {
            let cmd = ShareCommand::new(&site);
            let output = cmd.run(&item_id);
            (cmd.format_output(&output, &options), output.success)
        }
        Commands::Subscribe { email } => {
            let cmd = SubscribeCommand::new(&site);
            let output = cmd.run(&email);
            (cmd.format_output(&output, &options), output.success)
        }
        Commands::Status { mark_prompt_shown } => {
            let cmd = StatusCommand::new(&site);
            let output = cmd.run(chrono::Utc::now(), mark_prompt_shown);
            (cmd.format_output(&output, &options), output.success)
        }
        Commands::Clear { yes } => {
            let cmd = ClearCommand::new(&site);
            let output = cmd.run(yes);
            (cmd.format_output(&output, &options), output.success)
        }
    };

    if !formatted.is_empty() {
        println!("{}", formatted);
    }

    Ok(success_to_exit_code(success))
}

/// Convert a success boolean to an exit code.
fn success_to_exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::from(exit_codes::SUCCESS as u8)
    } else {
        ExitCode::from(exit_codes::ERROR as u8)
    }
}

// =============================================================================
// Tests
// =============================================================================
