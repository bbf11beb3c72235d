use crate::{
    Error,
    error::AuthError,
    repositories::{PasswordRatingRepository, UserRepository},
    signal::{PasswordRating, RatingScale},
    validation::{normalize_domain, validate_email},
};
use std::sync::Arc;

/// Service for per-domain password ratings
pub struct PasswordRatingService<U: UserRepository, P: PasswordRatingRepository> {
    user_repository: Arc<U>,
    rating_repository: Arc<P>,
}

impl<U: UserRepository, P: PasswordRatingRepository> PasswordRatingService<U, P> {
    pub fn new(user_repository: Arc<U>, rating_repository: Arc<P>) -> Self {
        Self {
            user_repository,
            rating_repository,
        }
    }

    /// Store the rating for `domain`, rescaled from `scale` to 0-100. Last write wins.
    pub async fn ingest(
        &self,
        owner_email: &str,
        domain: &str,
        raw_rating: f64,
        scale: RatingScale,
    ) -> Result<PasswordRating, Error> {
        validate_email(owner_email)?;
        let domain = normalize_domain(domain)?;
        let rating = scale.to_percent(raw_rating)?;

        let owner = self
            .user_repository
            .find_by_email(owner_email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let stored = self
            .rating_repository
            .upsert(PasswordRating::new(&owner.id, domain, rating))
            .await?;

        tracing::info!(
            user_id = %owner.id,
            domain = %stored.domain,
            rating = stored.rating,
            "Stored password rating"
        );
        Ok(stored)
    }

    pub async fn list(&self, owner_email: &str) -> Result<Vec<PasswordRating>, Error> {
        validate_email(owner_email)?;
        let owner = self
            .user_repository
            .find_by_email(owner_email)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        self.rating_repository.list_for_user(&owner.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;

    async fn setup() -> PasswordRatingService<MemoryStore, MemoryStore> {
        let store = MemoryStore::shared();
        store
            .find_or_create_by_email("ada@example.com")
            .await
            .unwrap();
        PasswordRatingService::new(store.clone(), store)
    }

    #[tokio::test]
    async fn test_ingest_rescales_and_overwrites() {
        let service = setup().await;

        let first = service
            .ingest("ada@example.com", "example.com", 8.0, RatingScale::OutOfTen)
            .await
            .unwrap();
        assert_eq!(first.rating, 80.0);

        let second = service
            .ingest(
                "ada@example.com",
                "www.example.com",
                35.0,
                RatingScale::OutOfHundred,
            )
            .await
            .unwrap();
        assert_eq!(second.rating, 35.0);
        assert_eq!(second.id, first.id);

        let ratings = service.list("ada@example.com").await.unwrap();
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].rating, 35.0);
    }

    #[tokio::test]
    async fn test_ingest_range_check() {
        let service = setup().await;
        let err = service
            .ingest(
                "ada@example.com",
                "example.com",
                80.0,
                RatingScale::OutOfTen,
            )
            .await
            .unwrap_err();
        assert!(err.is_validation_error());
    }

    #[tokio::test]
    async fn test_ingest_requires_owner() {
        let service = setup().await;
        let err = service
            .ingest(
                "ghost@example.com",
                "example.com",
                5.0,
                RatingScale::OutOfTen,
            )
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_reserved_domain_is_stored() {
        let service = setup().await;
        let stored = service
            .ingest("ada@example.com", "overall", 4.0, RatingScale::OutOfTen)
            .await
            .unwrap();
        assert!(stored.is_reserved());
    }
}
