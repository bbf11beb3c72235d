use crate::{Error, UserId, signal::BreachSignal};
use async_trait::async_trait;

/// Repository for breach signals
#[async_trait]
pub trait BreachRepository: Send + Sync + 'static {
    /// Insert signals, skipping any whose `(user_id, breached_site)` already exists.
    ///
    /// Returns the number of rows actually written. Must stay correct when two calls race
    /// on the same site.
    async fn insert_many(&self, signals: &[BreachSignal]) -> Result<u64, Error>;

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<BreachSignal>, Error>;
}
