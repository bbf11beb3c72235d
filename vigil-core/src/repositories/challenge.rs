use crate::{Error, UserId, otp::OtpChallenge};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository for the one live code challenge each user may hold
#[async_trait]
pub trait ChallengeRepository: Send + Sync + 'static {
    /// Store `challenge`, overwriting any pending one
    async fn set_challenge(&self, user_id: &UserId, challenge: &OtpChallenge)
    -> Result<(), Error>;

    async fn find_challenge(&self, user_id: &UserId) -> Result<Option<OtpChallenge>, Error>;

    /// Clear the challenge only if it still holds `code` and has not expired at `now`.
    ///
    /// Returns `false` when nothing was cleared, which is how a losing concurrent verifier
    /// finds out.
    async fn consume_challenge(
        &self,
        user_id: &UserId,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, Error>;
}
