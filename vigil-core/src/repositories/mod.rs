//! Storage interfaces
//!
//! Three layers, from narrow to wide:
//!
//! - one `*Repository` trait per table-sized concern (users, challenges, sessions, and the
//!   three signal kinds);
//! - one `*RepositoryProvider` trait per repository, handing out the backend's implementation;
//! - [`RepositoryProvider`], which a backend implements once to be usable by the services.
//!
//! Every signal repository is keyed by [`UserId`](crate::UserId). Emails are resolved to a
//! user once, by the services, and never compared in signal storage.

pub mod adapter;
pub mod breach;
pub mod challenge;
pub mod password_rating;
pub mod session;
pub mod site_check;
pub mod user;

pub use adapter::{
    BreachRepositoryAdapter, ChallengeRepositoryAdapter, PasswordRatingRepositoryAdapter,
    SessionRepositoryAdapter, SiteCheckRepositoryAdapter, UserRepositoryAdapter,
};
pub use breach::BreachRepository;
pub use challenge::ChallengeRepository;
pub use password_rating::PasswordRatingRepository;
pub use session::SessionRepository;
pub use site_check::SiteCheckRepository;
pub use user::UserRepository;

use async_trait::async_trait;

use crate::Error;

// ----------------------------------------------------------------------------
// Per-repository providers
// ----------------------------------------------------------------------------

pub trait UserRepositoryProvider: Send + Sync + 'static {
    type UserRepo: UserRepository;

    fn user(&self) -> &Self::UserRepo;
}

/// Provider trait for code challenge repository access.
pub trait ChallengeRepositoryProvider: Send + Sync + 'static {
    type ChallengeRepo: ChallengeRepository;

    fn challenge(&self) -> &Self::ChallengeRepo;
}

/// Provider trait for device session repository access.
pub trait SessionRepositoryProvider: Send + Sync + 'static {
    type SessionRepo: SessionRepository;

    fn session(&self) -> &Self::SessionRepo;
}

/// Provider trait for breach signal repository access.
pub trait BreachRepositoryProvider: Send + Sync + 'static {
    type BreachRepo: BreachRepository;

    fn breach(&self) -> &Self::BreachRepo;
}

/// Provider trait for site check repository access.
pub trait SiteCheckRepositoryProvider: Send + Sync + 'static {
    type SiteCheckRepo: SiteCheckRepository;

    fn site_check(&self) -> &Self::SiteCheckRepo;
}

/// Provider trait for password rating repository access.
pub trait PasswordRatingRepositoryProvider: Send + Sync + 'static {
    type PasswordRatingRepo: PasswordRatingRepository;

    fn password_rating(&self) -> &Self::PasswordRatingRepo;
}

// ----------------------------------------------------------------------------
// Backend
// ----------------------------------------------------------------------------

/// Everything the services need from a storage backend.
///
/// A backend implements the six repository traits, exposes them through the six provider
/// traits, and adds the two lifecycle hooks below. `vigil-storage-sqlite` is the reference
/// implementation.
#[async_trait]
pub trait RepositoryProvider:
    UserRepositoryProvider
    + ChallengeRepositoryProvider
    + SessionRepositoryProvider
    + BreachRepositoryProvider
    + SiteCheckRepositoryProvider
    + PasswordRatingRepositoryProvider
{
    /// Bring the schema up to date. Safe to call on every start.
    async fn migrate(&self) -> Result<(), Error>;

    /// Fails when the backend cannot answer a trivial query.
    async fn health_check(&self) -> Result<(), Error>;
}
