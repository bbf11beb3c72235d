//! External collaborators
//!
//! The core never talks to a network service directly. Breach intelligence, domain
//! reputation and code delivery are reached through these traits so that the HTTP clients
//! (and the mailer) live in their own crates.

use async_trait::async_trait;

use crate::{
    Error,
    signal::{RawBreachEntry, SiteVerdict},
};

/// Breach intelligence for one email address
#[async_trait]
pub trait BreachLookup: Send + Sync + 'static {
    /// Name used in logs and collaborator errors.
    fn name(&self) -> &'static str;

    /// Every breach the address appears in. No exposure is an empty list, not an error.
    async fn lookup(&self, email: &str) -> Result<Vec<RawBreachEntry>, Error>;
}

/// Domain reputation verdicts
#[async_trait]
pub trait ReputationLookup: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    async fn check_domain(&self, domain: &str) -> Result<SiteVerdict, Error>;
}

/// Out-of-band delivery of one-time codes
#[async_trait]
pub trait CodeDelivery: Send + Sync + 'static {
    async fn deliver_code(&self, email: &str, code: &str, valid_minutes: i64)
    -> Result<(), Error>;
}
