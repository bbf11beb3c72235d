//! Repository implementations for SQLite storage

pub mod breach;
pub mod challenge;
pub mod password_rating;
pub mod session;
pub mod site_check;
pub mod user;

pub use breach::SqliteBreachRepository;
pub use challenge::SqliteChallengeRepository;
pub use password_rating::SqlitePasswordRatingRepository;
pub use session::SqliteSessionRepository;
pub use site_check::SqliteSiteCheckRepository;
pub use user::SqliteUserRepository;

use async_trait::async_trait;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{str::FromStr, sync::Arc};
use vigil_core::{
    Error,
    error::StorageError,
    repositories::{
        BreachRepositoryProvider, ChallengeRepositoryProvider, PasswordRatingRepositoryProvider,
        RepositoryProvider, SessionRepositoryProvider, SiteCheckRepositoryProvider,
        UserRepositoryProvider,
    },
};
use vigil_migration::MigrationManager;

use crate::{
    database_error,
    migrations::{self, SqliteMigrationManager},
};

/// Repository provider implementation for SQLite
///
/// This struct implements all the individual repository provider traits
/// as well as the unified `RepositoryProvider` trait.
pub struct SqliteRepositoryProvider {
    pool: SqlitePool,
    user: Arc<SqliteUserRepository>,
    challenge: Arc<SqliteChallengeRepository>,
    session: Arc<SqliteSessionRepository>,
    breach: Arc<SqliteBreachRepository>,
    site_check: Arc<SqliteSiteCheckRepository>,
    password_rating: Arc<SqlitePasswordRatingRepository>,
}

impl SqliteRepositoryProvider {
    pub fn new(pool: SqlitePool) -> Self {
        let user = Arc::new(SqliteUserRepository::new(pool.clone()));
        let challenge = Arc::new(SqliteChallengeRepository::new(pool.clone()));
        let session = Arc::new(SqliteSessionRepository::new(pool.clone()));
        let breach = Arc::new(SqliteBreachRepository::new(pool.clone()));
        let site_check = Arc::new(SqliteSiteCheckRepository::new(pool.clone()));
        let password_rating = Arc::new(SqlitePasswordRatingRepository::new(pool.clone()));

        Self {
            pool,
            user,
            challenge,
            session,
            breach,
            site_check,
            password_rating,
        }
    }

    /// Open a pool for `database_url`, creating the database file when it is missing.
    pub async fn connect(database_url: &str) -> Result<Self, Error> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| Error::Storage(StorageError::Connection(e.to_string())))?
            .create_if_missing(true)
            .foreign_keys(true);

        // every connection to `:memory:` is its own database
        let max_connections = if database_url.contains(":memory:") { 1 } else { 10 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to open SQLite database");
                Error::Storage(StorageError::Connection(e.to_string()))
            })?;

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

// Implement individual provider traits

impl UserRepositoryProvider for SqliteRepositoryProvider {
    type UserRepo = SqliteUserRepository;

    fn user(&self) -> &Self::UserRepo {
        &self.user
    }
}

impl ChallengeRepositoryProvider for SqliteRepositoryProvider {
    type ChallengeRepo = SqliteChallengeRepository;

    fn challenge(&self) -> &Self::ChallengeRepo {
        &self.challenge
    }
}

impl SessionRepositoryProvider for SqliteRepositoryProvider {
    type SessionRepo = SqliteSessionRepository;

    fn session(&self) -> &Self::SessionRepo {
        &self.session
    }
}

impl BreachRepositoryProvider for SqliteRepositoryProvider {
    type BreachRepo = SqliteBreachRepository;

    fn breach(&self) -> &Self::BreachRepo {
        &self.breach
    }
}

impl SiteCheckRepositoryProvider for SqliteRepositoryProvider {
    type SiteCheckRepo = SqliteSiteCheckRepository;

    fn site_check(&self) -> &Self::SiteCheckRepo {
        &self.site_check
    }
}

impl PasswordRatingRepositoryProvider for SqliteRepositoryProvider {
    type PasswordRatingRepo = SqlitePasswordRatingRepository;

    fn password_rating(&self) -> &Self::PasswordRatingRepo {
        &self.password_rating
    }
}

// Implement the unified RepositoryProvider trait

#[async_trait]
impl RepositoryProvider for SqliteRepositoryProvider {
    async fn migrate(&self) -> Result<(), Error> {
        let manager = SqliteMigrationManager::new(self.pool.clone());
        manager.initialize().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to initialize migrations");
            Error::from(e)
        })?;

        manager.up(&migrations::all()).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to run migrations");
            Error::from(e)
        })?;

        Ok(())
    }

    async fn health_check(&self) -> Result<(), Error> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(database_error("health check"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::provider;

    #[tokio::test]
    async fn test_migrate_twice_and_health_check() {
        let storage = provider().await;
        storage.migrate().await.unwrap();
        storage.health_check().await.unwrap();
    }

    #[tokio::test]
    async fn test_connect_rejects_bad_url() {
        let err = SqliteRepositoryProvider::connect("postgres://nope")
            .await
            .err()
            .unwrap();
        assert!(err.is_storage_error());
    }
}
