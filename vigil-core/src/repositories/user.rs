use crate::{Error, User, UserId, user::NewUser};
use async_trait::async_trait;

/// Repository for user data access
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Create a new user
    async fn create(&self, user: NewUser) -> Result<User, Error>;

    /// Find a user by ID
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error>;

    /// Find a user by email, compared exactly as stored
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error>;

    /// Create a user if it doesn't exist, otherwise return the existing user
    ///
    /// Concurrent calls for the same email must resolve to a single user.
    async fn find_or_create_by_email(&self, email: &str) -> Result<User, Error>;

    /// Set the display name, failing with a not-found error if the user is absent
    async fn update_name(&self, id: &UserId, name: &str) -> Result<User, Error>;
}
