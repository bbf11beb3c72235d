use crate::{Error, UserId, signal::PasswordRating};
use async_trait::async_trait;

/// Repository for password ratings
#[async_trait]
pub trait PasswordRatingRepository: Send + Sync + 'static {
    /// Insert the rating, or overwrite the rating of the existing row for the same
    /// `(user_id, domain)`. Returns the stored row.
    async fn upsert(&self, rating: PasswordRating) -> Result<PasswordRating, Error>;

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<PasswordRating>, Error>;
}
