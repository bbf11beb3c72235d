//! Schema migrations for vigil storage backends
//!
//! A backend lists its [`Migration`]s and hands them to its [`MigrationManager`], which
//! records applied versions in [`MIGRATION_TABLE`] and applies the rest in version order.

use async_trait::async_trait;
use sqlx::Database;
use thiserror::Error;
use vigil_core::error::StorageError;

pub const MIGRATION_TABLE: &str = "_vigil_migrations";

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Migration failed: {0}")]
    Migration(String),
    #[error("Duplicate migration version: {0}")]
    DuplicateVersion(i64),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, MigrationError>;

impl From<MigrationError> for vigil_core::Error {
    fn from(error: MigrationError) -> Self {
        vigil_core::Error::Storage(StorageError::Migration(error.to_string()))
    }
}

#[async_trait]
pub trait Migration<DB: Database>: Send + Sync {
    /// Apply the schema change inside the manager's transaction
    async fn up<'a>(&'a self, conn: &'a mut <DB as Database>::Connection) -> Result<()>;

    /// Undo [`Migration::up`]
    async fn down<'a>(&'a self, conn: &'a mut <DB as Database>::Connection) -> Result<()>;

    /// Position in the schema history; unique per backend
    fn version(&self) -> i64;

    fn name(&self) -> &str;
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MigrationRecord {
    pub version: i64,
    pub name: String,
    /// Unix seconds
    pub applied_at: i64,
}

/// Return `migrations` sorted by version, rejecting duplicate versions.
pub fn ordered<DB: Database>(
    migrations: &[Box<dyn Migration<DB>>],
) -> Result<Vec<&dyn Migration<DB>>> {
    let mut sorted: Vec<&dyn Migration<DB>> = migrations.iter().map(|m| m.as_ref()).collect();
    sorted.sort_by_key(|m| m.version());

    if let Some(pair) = sorted
        .windows(2)
        .find(|pair| pair[0].version() == pair[1].version())
    {
        return Err(MigrationError::DuplicateVersion(pair[0].version()));
    }

    Ok(sorted)
}

#[async_trait]
pub trait MigrationManager<DB: Database>: Send + Sync {
    fn get_migration_table_name(&self) -> &str {
        MIGRATION_TABLE
    }

    /// Create the bookkeeping table when missing
    async fn initialize(&self) -> Result<()>;

    /// Apply every migration not yet recorded, lowest version first
    async fn up(&self, migrations: &[Box<dyn Migration<DB>>]) -> Result<()>;

    /// Revert every recorded migration, highest version first
    async fn down(&self, migrations: &[Box<dyn Migration<DB>>]) -> Result<()>;

    async fn get_applied_migrations(&self) -> Result<Vec<MigrationRecord>>;

    async fn is_applied(&self, version: i64) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Any;

    struct Noop(i64);

    #[async_trait]
    impl Migration<Any> for Noop {
        async fn up<'a>(&'a self, _conn: &'a mut <Any as Database>::Connection) -> Result<()> {
            Ok(())
        }

        async fn down<'a>(&'a self, _conn: &'a mut <Any as Database>::Connection) -> Result<()> {
            Ok(())
        }

        fn version(&self) -> i64 {
            self.0
        }

        fn name(&self) -> &str {
            "noop"
        }
    }

    #[test]
    fn test_ordered_sorts_by_version() {
        let migrations: Vec<Box<dyn Migration<Any>>> =
            vec![Box::new(Noop(3)), Box::new(Noop(1)), Box::new(Noop(2))];
        let versions: Vec<i64> = ordered(&migrations)
            .unwrap()
            .iter()
            .map(|m| m.version())
            .collect();
        assert_eq!(versions, vec![1, 2, 3]);
    }

    #[test]
    fn test_ordered_rejects_duplicates() {
        let migrations: Vec<Box<dyn Migration<Any>>> = vec![Box::new(Noop(1)), Box::new(Noop(1))];
        assert!(matches!(
            ordered(&migrations),
            Err(MigrationError::DuplicateVersion(1))
        ));
    }

    #[test]
    fn test_converts_to_storage_error() {
        let error: vigil_core::Error = MigrationError::Migration("boom".to_string()).into();
        assert!(error.is_storage_error());
    }
}
