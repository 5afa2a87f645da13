//! Visitor-facing gallery features backed by the key-value store.
//!
//! Share rewards, achievements, the email prompt and membership badges.
//! Rendering is left to the caller.

pub mod achievements;
pub mod ledger;
pub mod membership;
pub mod prompt;

pub use achievements::{Achievement, Achievements, PROGRESS_KEY};
pub use ledger::{ShareLedger, SHARED_IMAGES_KEY, UNLOCKED_IMAGES_KEY};
pub use membership::{Badge, Membership, MembershipTier, MEMBERSHIP_TIER_KEY};
pub use prompt::{
    validate_email, EmailPrompt, EMAIL_LAST_SHOWN_KEY, EMAIL_SUBSCRIBED_KEY, USER_EMAIL_KEY,
};
