use crate::{
    Error, UserId,
    session::{DeviceSession, Fingerprint},
};
use async_trait::async_trait;

/// Repository for device sessions
#[async_trait]
pub trait SessionRepository: Send + Sync + 'static {
    /// Insert the session, or replace the credential of the existing one for the same
    /// `(user_id, fingerprint)`. Returns the stored row.
    async fn upsert(&self, session: DeviceSession) -> Result<DeviceSession, Error>;

    /// The most recently updated session for `fingerprint` across all users
    async fn find_by_fingerprint(
        &self,
        fingerprint: &Fingerprint,
    ) -> Result<Option<DeviceSession>, Error>;

    /// All sessions for a user, most recently updated first
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<DeviceSession>, Error>;

    /// Every stored session. Used to rebuild the in-process cache.
    async fn list_all(&self) -> Result<Vec<DeviceSession>, Error>;

    /// Delete one session. Returns whether a row was removed.
    async fn delete(&self, user_id: &UserId, fingerprint: &Fingerprint) -> Result<bool, Error>;
}
