//! Unified error types for Pulse.
//!
//! Input errors (bad item identifiers, unknown actions) are surfaced to the
//! caller immediately. Persistence errors are surfaced on writes; read paths
//! that only feed cosmetic widgets recover through [`FailOpen`] and log.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Pulse operations.
#[derive(Error, Debug)]
pub enum PulseError {
    /// An engagement action outside `view | download | share | favorite`.
    #[error("invalid action kind: {action:?} (expected view, download, share or favorite)")]
    InvalidActionKind { action: String },

    /// Empty or malformed item identifier.
    #[error("invalid item id {item_id:?}: {reason}")]
    InvalidItemId { item_id: String, reason: String },

    /// Malformed email address.
    #[error("invalid email address: {email:?}")]
    InvalidEmail { email: String },

    /// Key-value store read/write failure.
    #[error("persistence error for key {key:?}: {message}")]
    Persistence { key: String, message: String },

    /// I/O errors from the file store or config files.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON encoding/decoding errors.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// Configuration loading errors.
    #[error("config error: {message}")]
    Config { message: String },
}

/// A specialized Result type for Pulse operations.
pub type Result<T> = std::result::Result<T, PulseError>;

impl PulseError {
    /// Create an invalid action error.
    pub fn invalid_action(action: impl Into<String>) -> Self {
        Self::InvalidActionKind {
            action: action.into(),
        }
    }

    /// Create an invalid item id error.
    pub fn invalid_item_id(item_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidItemId {
            item_id: item_id.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid email error.
    pub fn invalid_email(email: impl Into<String>) -> Self {
        Self::InvalidEmail {
            email: email.into(),
        }
    }

    /// Create a persistence error for a store key.
    pub fn persistence(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Persistence {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether the error came from the persistence layer rather than from
    /// caller input.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            Self::Persistence { .. } | Self::Storage { .. } | Self::Serde { .. }
        )
    }
}

impl From<serde_json::Error> for PulseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

/// Lenient handling for read paths.
///
/// Logs the error as a warning and substitutes a default, so a damaged store
/// degrades a widget instead of failing it.
pub trait FailOpen<T> {
    /// Log a warning and return `T::default()` on error.
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default;

    /// Log a warning and return `fallback` on error.
    fn fail_open_with(self, context: &str, fallback: T) -> T;
}

impl<T> FailOpen<T> for Result<T> {
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, "{} (fail-open: using default)", context);
                T::default()
            }
        }
    }

    fn fail_open_with(self, context: &str, fallback: T) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, "{} (fail-open: using fallback)", context);
                fallback
            }
        }
    }
}

/// Exit codes for the `pulse` CLI.
pub mod exit_codes {
    /// Command completed.
    pub const SUCCESS: i32 = 0;

    /// Command failed (bad input or persistence error).
    pub const ERROR: i32 = 1;

    /// Process panicked.
    pub const CRASH: i32 = 3;
}
