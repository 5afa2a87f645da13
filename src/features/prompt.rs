//! Email capture prompt gating.
//!
//! The prompt is offered unless the visitor already subscribed or saw it
//! within the cooldown window. Values are stored as raw strings, the way the
//! gallery page writes them (`"true"`, epoch milliseconds, the address).

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::error::{FailOpen, PulseError, Result};
use crate::storage::KeyValueStore;

/// Store key for the subscribed flag.
pub const EMAIL_SUBSCRIBED_KEY: &str = "email_subscribed";

/// Store key for when the prompt was last shown, in epoch milliseconds.
pub const EMAIL_LAST_SHOWN_KEY: &str = "email_popup_last_shown";

/// Store key for the subscribed address.
pub const USER_EMAIL_KEY: &str = "user_email";

/// Longest accepted email address (RFC 5321 path limit).
const MAX_EMAIL_LEN: usize = 254;

/// Check that `email` looks like a deliverable address.
///
/// Requires exactly one `@` with a non-empty local part and a domain
/// containing a dot, and no whitespace.
pub fn validate_email(email: &str) -> Result<()> {
    let invalid = || PulseError::invalid_email(email);

    if email.is_empty() || email.len() > MAX_EMAIL_LEN {
        return Err(invalid());
    }
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid());
    }
    Ok(())
}

/// Email prompt state for the current visitor.
#[derive(Debug)]
pub struct EmailPrompt<S: KeyValueStore> {
    store: S,
    cooldown: Duration,
}

impl<S: KeyValueStore> EmailPrompt<S> {
    pub fn new(store: S, cooldown: Duration) -> Self {
        Self { store, cooldown }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Whether the visitor has subscribed. Any non-empty stored flag counts.
    pub fn is_subscribed(&self) -> bool {
        self.store
            .get(EMAIL_SUBSCRIBED_KEY)
            .map(|value| value.is_some_and(|v| !v.is_empty()))
            .fail_open_with("reading subscription flag", false)
    }

    /// The subscribed address, if any.
    pub fn email(&self) -> Option<String> {
        self.store
            .get(USER_EMAIL_KEY)
            .fail_open_default("reading subscribed email")
    }

    /// When the prompt was last shown.
    ///
    /// An unparseable timestamp is treated as never shown.
    pub fn last_shown(&self) -> Option<DateTime<Utc>> {
        let raw = self
            .store
            .get(EMAIL_LAST_SHOWN_KEY)
            .fail_open_default("reading prompt timestamp")?;

        let parsed = raw
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single());

        if parsed.is_none() {
            tracing::warn!(
                key = EMAIL_LAST_SHOWN_KEY,
                value = %raw,
                "unparseable prompt timestamp, treating as never shown"
            );
        }
        parsed
    }

    /// Whether the prompt should be offered at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        if self.is_subscribed() {
            return false;
        }
        match self.last_shown() {
            Some(shown) => now.signed_duration_since(shown) >= self.cooldown,
            None => true,
        }
    }

    /// Remember that the prompt was shown at `now`.
    pub fn mark_shown(&self, now: DateTime<Utc>) -> Result<()> {
        self.store
            .set(EMAIL_LAST_SHOWN_KEY, &now.timestamp_millis().to_string())
    }

    /// Store a subscription. Returns `true` if the visitor was not subscribed
    /// before.
    pub fn subscribe(&self, email: &str) -> Result<bool> {
        let email = email.trim();
        validate_email(email)?;

        let newly_subscribed = !self.is_subscribed();
        self.store.set(USER_EMAIL_KEY, email)?;
        self.store.set(EMAIL_SUBSCRIBED_KEY, "true")?;

        tracing::debug!(newly_subscribed, "email subscription stored");
        Ok(newly_subscribed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::traits::tests::BrokenStore;
    use crate::storage::MemoryStore;

    fn prompt() -> EmailPrompt<MemoryStore> {
        EmailPrompt::new(MemoryStore::new(), Duration::hours(24))
    }

    fn at(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).single().unwrap()
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("artist@example.com").is_ok());
        assert!(validate_email("a.b+tag@mail.example.org").is_ok());

        for bad in [
            "",
            "no-at-sign",
            "@example.com",
            "user@",
            "user@localhost",
            "user@@example.com",
            "us er@example.com",
            "user@.example.com",
            "user@example.com.",
        ] {
            assert!(validate_email(bad).is_err(), "{:?}", bad);
        }
    }

    #[test]
    fn test_due_when_never_shown() {
        assert!(prompt().is_due(Utc::now()));
    }

    #[test]
    fn test_not_due_within_cooldown() {
        let prompt = prompt();
        let shown = at(1_700_000_000_000);
        prompt.mark_shown(shown).unwrap();

        assert_eq!(prompt.last_shown(), Some(shown));
        assert!(!prompt.is_due(shown + Duration::hours(23)));
        assert!(prompt.is_due(shown + Duration::hours(24)));
        assert!(prompt.is_due(shown + Duration::days(3)));
    }

    #[test]
    fn test_stored_as_epoch_millis() {
        let prompt = prompt();
        prompt.mark_shown(at(1_700_000_000_123)).unwrap();
        assert_eq!(
            prompt.store.get(EMAIL_LAST_SHOWN_KEY).unwrap().as_deref(),
            Some("1700000000123")
        );
    }

    #[test]
    fn test_unparseable_timestamp_counts_as_never_shown() {
        let prompt = prompt();
        prompt.store.set(EMAIL_LAST_SHOWN_KEY, "yesterday").unwrap();

        assert_eq!(prompt.last_shown(), None);
        assert!(prompt.is_due(Utc::now()));
    }

    #[test]
    fn test_subscribe() {
        let prompt = prompt();
        assert!(!prompt.is_subscribed());

        assert!(prompt.subscribe("  artist@example.com ").unwrap());
        assert!(prompt.is_subscribed());
        assert_eq!(prompt.email().as_deref(), Some("artist@example.com"));

        // Resubscribing updates the address
        assert!(!prompt.subscribe("new@example.com").unwrap());
        assert_eq!(prompt.email().as_deref(), Some("new@example.com"));
    }

    #[test]
    fn test_subscribed_visitor_never_prompted() {
        let prompt = prompt();
        prompt.subscribe("artist@example.com").unwrap();
        assert!(!prompt.is_due(Utc::now()));
    }

    #[test]
    fn test_subscribe_rejects_bad_email() {
        let prompt = prompt();
        let err = prompt.subscribe("not an email").unwrap_err();
        assert!(matches!(err, PulseError::InvalidEmail { .. }));
        assert!(!prompt.is_subscribed());
    }

    #[test]
    fn test_broken_store() {
        let prompt = EmailPrompt::new(BrokenStore, Duration::hours(24));
        assert!(!prompt.is_subscribed());
        assert!(prompt.is_due(Utc::now()));
        assert!(prompt.mark_shown(Utc::now()).is_err());
    }
}
