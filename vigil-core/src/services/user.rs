use crate::{
    Error, User,
    error::AuthError,
    repositories::UserRepository,
    user::UserProfile,
    validation::{validate_email, validate_name},
};
use std::sync::Arc;

/// Service for the identity store
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    /// Create a new UserService with the given repository
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Get or create a user by email
    pub async fn find_or_create(&self, email: &str) -> Result<User, Error> {
        validate_email(email)?;

        self.repository.find_or_create_by_email(email).await
    }

    /// Get a user by email, failing when absent
    pub async fn get(&self, email: &str) -> Result<User, Error> {
        validate_email(email)?;

        self.repository
            .find_by_email(email)
            .await?
            .ok_or_else(|| AuthError::UserNotFound.into())
    }

    pub async fn update_name(&self, email: &str, name: &str) -> Result<User, Error> {
        let name = validate_name(name)?;
        let user = self.get(email).await?;

        let user = self.repository.update_name(&user.id, &name).await?;
        tracing::debug!(user_id = %user.id, "Updated display name");
        Ok(user)
    }

    pub async fn profile(&self, email: &str) -> Result<UserProfile, Error> {
        self.get(email).await.map(UserProfile::from)
    }
}
