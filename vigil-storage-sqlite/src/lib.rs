//! SQLite storage backend for vigil
//!
//! [`SqliteRepositoryProvider`] implements every repository trait from `vigil-core` on a
//! single [`SqlitePool`]. Uniqueness rules live in the schema:
//!
//! - `users(email)` is unique, so concurrent first contacts for one email create one user;
//! - `device_sessions(user_id, fingerprint)` is unique and written with an upsert;
//! - `breaches(user_id, breached_site)` is unique and written with `ON CONFLICT DO NOTHING`;
//! - `password_ratings(user_id, domain)` is unique and written with an upsert.
//!
//! Timestamps are stored as unix milliseconds.
//!
//! ```rust,no_run
//! use vigil_storage_sqlite::SqliteRepositoryProvider;
//! use vigil_core::repositories::RepositoryProvider;
//!
//! # async fn run() -> Result<(), vigil_core::Error> {
//! let provider = SqliteRepositoryProvider::connect("sqlite://vigil.db?mode=rwc").await?;
//! provider.migrate().await?;
//! # Ok(())
//! # }
//! ```

pub mod migrations;
pub mod repositories;

pub use repositories::{
    SqliteBreachRepository, SqliteChallengeRepository, SqlitePasswordRatingRepository,
    SqliteRepositoryProvider, SqliteSessionRepository, SqliteSiteCheckRepository,
    SqliteUserRepository,
};

use chrono::{DateTime, Utc};
use thiserror::Error;
use vigil_core::error::StorageError;

/// Problems turning stored rows back into domain values
#[derive(Debug, Error)]
pub enum RowError {
    #[error("Invalid timestamp in {column}: {value}")]
    InvalidTimestamp { column: &'static str, value: i64 },

    #[error("Invalid JSON in {column}: {source}")]
    InvalidJson {
        column: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid value in {column}: {value}")]
    InvalidValue { column: &'static str, value: i64 },
}

impl From<RowError> for vigil_core::Error {
    fn from(error: RowError) -> Self {
        tracing::error!(error = %error, "Failed to decode row");
        vigil_core::Error::Storage(StorageError::Database(error.to_string()))
    }
}

pub(crate) fn from_millis(column: &'static str, value: i64) -> Result<DateTime<Utc>, RowError> {
    DateTime::from_timestamp_millis(value).ok_or(RowError::InvalidTimestamp { column, value })
}

/// Map a sqlx error onto the storage taxonomy, logging it once here.
pub(crate) fn database_error(
    context: &'static str,
) -> impl FnOnce(sqlx::Error) -> vigil_core::Error {
    move |e| {
        tracing::error!(error = %e, context, "Database operation failed");
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                vigil_core::Error::Storage(StorageError::Constraint(e.to_string()))
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                vigil_core::Error::Storage(StorageError::Connection(e.to_string()))
            }
            _ => vigil_core::Error::Storage(StorageError::Database(e.to_string())),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
    use vigil_core::repositories::RepositoryProvider;

    use crate::SqliteRepositoryProvider;

    /// A migrated single-connection in-memory database.
    pub(crate) async fn provider() -> SqliteRepositoryProvider {
        let _ = tracing_subscriber::fmt().try_init();
        let pool: SqlitePool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create pool");
        let provider = SqliteRepositoryProvider::new(pool);
        provider.migrate().await.expect("Failed to migrate");
        provider
    }
}
