use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Database, Sqlite, SqlitePool};
use vigil_migration::{Migration, MigrationError, MigrationManager, MigrationRecord, ordered};

pub struct SqliteMigrationManager {
    pool: SqlitePool,
}

impl SqliteMigrationManager {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MigrationManager<Sqlite> for SqliteMigrationManager {
    async fn initialize(&self) -> Result<(), MigrationError> {
        sqlx::query(
            format!(
                r#"
            CREATE TABLE IF NOT EXISTS {} (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at INTEGER NOT NULL DEFAULT (unixepoch())
            );"#,
                self.get_migration_table_name()
            )
            .as_str(),
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn up(&self, migrations: &[Box<dyn Migration<Sqlite>>]) -> Result<(), MigrationError> {
        for migration in ordered(migrations)? {
            if !self.is_applied(migration.version()).await? {
                let mut tx = self.pool.begin().await?;

                tracing::info!(
                    name = migration.name(),
                    version = migration.version(),
                    "Applying migration"
                );

                migration
                    .up(&mut *tx as &mut <Sqlite as Database>::Connection)
                    .await?;

                sqlx::query(
                    format!(
                        "INSERT INTO {} (version, name, applied_at) VALUES (?, ?, ?)",
                        self.get_migration_table_name()
                    )
                    .as_str(),
                )
                .bind(migration.version())
                .bind(migration.name())
                .bind(Utc::now().timestamp())
                .execute(&mut *tx)
                .await?;

                tx.commit().await?;
            }
        }
        Ok(())
    }

    async fn down(&self, migrations: &[Box<dyn Migration<Sqlite>>]) -> Result<(), MigrationError> {
        for migration in ordered(migrations)?.into_iter().rev() {
            if self.is_applied(migration.version()).await? {
                let mut tx = self.pool.begin().await?;

                tracing::info!(
                    name = migration.name(),
                    version = migration.version(),
                    "Rolling back migration"
                );

                migration
                    .down(&mut *tx as &mut <Sqlite as Database>::Connection)
                    .await?;

                sqlx::query(
                    format!(
                        "DELETE FROM {} WHERE version = ?",
                        self.get_migration_table_name()
                    )
                    .as_str(),
                )
                .bind(migration.version())
                .execute(&mut *tx)
                .await?;

                tx.commit().await?;
            }
        }
        Ok(())
    }

    async fn get_applied_migrations(&self) -> Result<Vec<MigrationRecord>, MigrationError> {
        let records = sqlx::query_as::<_, MigrationRecord>(
            format!(
                "SELECT version, name, applied_at FROM {} ORDER BY version",
                self.get_migration_table_name()
            )
            .as_str(),
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn is_applied(&self, version: i64) -> Result<bool, MigrationError> {
        let result: bool = sqlx::query_scalar(
            format!(
                "SELECT EXISTS(SELECT 1 FROM {} WHERE version = ?)",
                self.get_migration_table_name()
            )
            .as_str(),
        )
        .bind(version)
        .fetch_one(&self.pool)
        .await?;
        Ok(result)
    }
}

pub struct CreateUsersTable;

#[async_trait]
impl Migration<Sqlite> for CreateUsersTable {
    fn version(&self) -> i64 {
        1
    }

    fn name(&self) -> &str {
        "CreateUsersTable"
    }

    async fn up<'a>(
        &'a self,
        conn: &'a mut <Sqlite as Database>::Connection,
    ) -> Result<(), MigrationError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL,
                name TEXT,
                otp_code TEXT,
                otp_expires_at INTEGER,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                UNIQUE(email)
            );"#,
        )
        .execute(conn)
        .await?;
        Ok(())
    }

    async fn down<'a>(
        &'a self,
        conn: &'a mut <Sqlite as Database>::Connection,
    ) -> Result<(), MigrationError> {
        sqlx::query("DROP TABLE IF EXISTS users")
            .execute(conn)
            .await?;
        Ok(())
    }
}

pub struct CreateDeviceSessionsTable;

#[async_trait]
impl Migration<Sqlite> for CreateDeviceSessionsTable {
    fn version(&self) -> i64 {
        2
    }

    fn name(&self) -> &str {
        "CreateDeviceSessionsTable"
    }

    async fn up<'a>(
        &'a self,
        conn: &'a mut <Sqlite as Database>::Connection,
    ) -> Result<(), MigrationError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS device_sessions (
                id INTEGER PRIMARY KEY,
                user_id TEXT NOT NULL,
                fingerprint TEXT NOT NULL,
                credential TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
                UNIQUE(user_id, fingerprint)
            );"#,
        )
        .execute(conn)
        .await?;
        Ok(())
    }

    async fn down<'a>(
        &'a self,
        conn: &'a mut <Sqlite as Database>::Connection,
    ) -> Result<(), MigrationError> {
        sqlx::query("DROP TABLE IF EXISTS device_sessions")
            .execute(conn)
            .await?;
        Ok(())
    }
}

pub struct CreateBreachesTable;

#[async_trait]
impl Migration<Sqlite> for CreateBreachesTable {
    fn version(&self) -> i64 {
        3
    }

    fn name(&self) -> &str {
        "CreateBreachesTable"
    }

    async fn up<'a>(
        &'a self,
        conn: &'a mut <Sqlite as Database>::Connection,
    ) -> Result<(), MigrationError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS breaches (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                email TEXT NOT NULL,
                breached_site TEXT NOT NULL,
                domain TEXT,
                industry TEXT,
                leaked_data TEXT NOT NULL DEFAULT '[]',
                breach_date TEXT,
                breach_year INTEGER,
                records INTEGER,
                password_risk TEXT,
                verified INTEGER NOT NULL DEFAULT 0,
                breach_references TEXT,
                created_at INTEGER NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
                UNIQUE(user_id, breached_site)
            );"#,
        )
        .execute(conn)
        .await?;
        Ok(())
    }

    async fn down<'a>(
        &'a self,
        conn: &'a mut <Sqlite as Database>::Connection,
    ) -> Result<(), MigrationError> {
        sqlx::query("DROP TABLE IF EXISTS breaches")
            .execute(conn)
            .await?;
        Ok(())
    }
}

pub struct CreateSiteChecksTable;

#[async_trait]
impl Migration<Sqlite> for CreateSiteChecksTable {
    fn version(&self) -> i64 {
        4
    }

    fn name(&self) -> &str {
        "CreateSiteChecksTable"
    }

    async fn up<'a>(
        &'a self,
        conn: &'a mut <Sqlite as Database>::Connection,
    ) -> Result<(), MigrationError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS site_checks (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                domain TEXT NOT NULL,
                malicious INTEGER NOT NULL,
                source TEXT,
                total_sources INTEGER NOT NULL,
                checked_at INTEGER NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );"#,
        )
        .execute(conn)
        .await?;
        Ok(())
    }

    async fn down<'a>(
        &'a self,
        conn: &'a mut <Sqlite as Database>::Connection,
    ) -> Result<(), MigrationError> {
        sqlx::query("DROP TABLE IF EXISTS site_checks")
            .execute(conn)
            .await?;
        Ok(())
    }
}

pub struct CreatePasswordRatingsTable;

#[async_trait]
impl Migration<Sqlite> for CreatePasswordRatingsTable {
    fn version(&self) -> i64 {
        5
    }

    fn name(&self) -> &str {
        "CreatePasswordRatingsTable"
    }

    async fn up<'a>(
        &'a self,
        conn: &'a mut <Sqlite as Database>::Connection,
    ) -> Result<(), MigrationError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS password_ratings (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                domain TEXT NOT NULL,
                rating REAL NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
                UNIQUE(user_id, domain)
            );"#,
        )
        .execute(conn)
        .await?;
        Ok(())
    }

    async fn down<'a>(
        &'a self,
        conn: &'a mut <Sqlite as Database>::Connection,
    ) -> Result<(), MigrationError> {
        sqlx::query("DROP TABLE IF EXISTS password_ratings")
            .execute(conn)
            .await?;
        Ok(())
    }
}

/// Lookup paths that are not covered by a unique constraint.
pub struct CreateIndexes;

const INDEXES: &[(&str, &str)] = &[
    (
        "idx_device_sessions_fingerprint",
        "CREATE INDEX IF NOT EXISTS idx_device_sessions_fingerprint ON device_sessions(fingerprint, updated_at)",
    ),
    (
        "idx_breaches_user_id",
        "CREATE INDEX IF NOT EXISTS idx_breaches_user_id ON breaches(user_id)",
    ),
    (
        "idx_site_checks_user_id",
        "CREATE INDEX IF NOT EXISTS idx_site_checks_user_id ON site_checks(user_id, checked_at)",
    ),
];

#[async_trait]
impl Migration<Sqlite> for CreateIndexes {
    fn version(&self) -> i64 {
        6
    }

    fn name(&self) -> &str {
        "CreateIndexes"
    }

    async fn up<'a>(
        &'a self,
        conn: &'a mut <Sqlite as Database>::Connection,
    ) -> Result<(), MigrationError> {
        for (_, statement) in INDEXES {
            sqlx::query(statement).execute(&mut *conn).await?;
        }
        Ok(())
    }

    async fn down<'a>(
        &'a self,
        conn: &'a mut <Sqlite as Database>::Connection,
    ) -> Result<(), MigrationError> {
        for (name, _) in INDEXES {
            sqlx::query(&format!("DROP INDEX IF EXISTS {name}"))
                .execute(&mut *conn)
                .await?;
        }
        Ok(())
    }
}

/// Every migration for this backend, in version order.
pub fn all() -> Vec<Box<dyn Migration<Sqlite>>> {
    vec![
        Box::new(CreateUsersTable),
        Box::new(CreateDeviceSessionsTable),
        Box::new(CreateBreachesTable),
        Box::new(CreateSiteChecksTable),
        Box::new(CreatePasswordRatingsTable),
        Box::new(CreateIndexes),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};

    fn setup_test() {
        let _ = tracing_subscriber::fmt().try_init();
    }

    async fn pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create pool")
    }

    #[tokio::test]
    async fn test_migrations() -> Result<(), MigrationError> {
        setup_test();

        let manager = SqliteMigrationManager::new(pool().await);
        manager.initialize().await?;

        let migrations = all();
        manager.up(&migrations).await?;

        let applied = manager.get_applied_migrations().await?;
        let versions: Vec<i64> = applied.iter().map(|m| m.version).collect();
        assert_eq!(versions, vec![1, 2, 3, 4, 5, 6]);

        manager.down(&migrations).await?;
        assert!(
            !manager.is_applied(1).await?,
            "Migration should be rolled back"
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_up_is_idempotent() -> Result<(), MigrationError> {
        setup_test();

        let manager = SqliteMigrationManager::new(pool().await);
        manager.initialize().await?;

        let migrations = all();
        manager.up(&migrations).await?;
        manager.up(&migrations).await?;
        manager.down(&migrations).await?;
        manager.up(&migrations).await?;

        assert!(manager.is_applied(6).await?, "Migration should be applied");
        Ok(())
    }

    #[tokio::test]
    async fn test_migration_table_name() {
        let manager = SqliteMigrationManager::new(pool().await);
        assert_eq!(manager.get_migration_table_name(), "_vigil_migrations");
    }
}
