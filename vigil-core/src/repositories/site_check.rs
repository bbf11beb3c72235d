use crate::{Error, UserId, signal::SiteCheck};
use async_trait::async_trait;

/// Repository for site reputation checks
#[async_trait]
pub trait SiteCheckRepository: Send + Sync + 'static {
    /// Append a check. Checks are history and are never merged.
    async fn append(&self, check: SiteCheck) -> Result<SiteCheck, Error>;

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<SiteCheck>, Error>;

    /// Malicious checks only, newest first
    async fn list_malicious(&self, user_id: &UserId) -> Result<Vec<SiteCheck>, Error>;
}
