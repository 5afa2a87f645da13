//! Pulse - engagement tracking for a gallery site
//!
//! Pulse counts views, downloads, shares and favorites per gallery item,
//! ranks items by a weighted score for a trending list, and keeps the
//! visitor-side feature state (share rewards, achievements, the newsletter
//! prompt and membership badges) in an injected key-value store.

pub mod cli;
pub mod config;
pub mod error;
pub mod features;
pub mod site;
pub mod stats;
pub mod storage;
pub mod util;

pub use config::Config;
pub use error::{PulseError, Result};
pub use features::{
    Achievement, Achievements, Badge, EmailPrompt, Membership, MembershipTier, ShareLedger,
};
pub use site::{ShareReceipt, Site, SubscribeReceipt};
pub use stats::{
    rank, score, weights, Action, EngagementStore, EngagementTracker, ItemStats, RankedItem,
};
pub use storage::{FileStore, KeyValueStore, MemoryStore, Snapshot};

// CLI commands
pub use cli::{
    ClearCommand, RecordCommand, ShareCommand, ShowCommand, StatusCommand, SubscribeCommand,
    TopCommand,
};
