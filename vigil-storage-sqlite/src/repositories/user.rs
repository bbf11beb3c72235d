use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use vigil_core::{
    Error, User, UserId, error::AuthError, repositories::UserRepository, user::NewUser,
};

use crate::{RowError, database_error, from_millis};

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, email, name, created_at, updated_at";

#[derive(Debug, Clone, sqlx::FromRow)]
struct SqliteUser {
    id: String,
    email: String,
    name: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<SqliteUser> for User {
    type Error = RowError;

    fn try_from(row: SqliteUser) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId::new(&row.id),
            email: row.email,
            name: row.name,
            created_at: from_millis("created_at", row.created_at)?,
            updated_at: from_millis("updated_at", row.updated_at)?,
        })
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, Error> {
        let now = Utc::now().timestamp_millis();

        let row = sqlx::query_as::<_, SqliteUser>(&format!(
            r#"
            INSERT INTO users (id, email, name, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id.as_str())
        .bind(&user.email)
        .bind(&user.name)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(database_error("create user"))?;

        Ok(row.try_into()?)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        let row = sqlx::query_as::<_, SqliteUser>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?1"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("find user by id"))?;

        Ok(row.map(User::try_from).transpose()?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let row = sqlx::query_as::<_, SqliteUser>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("find user by email"))?;

        Ok(row.map(User::try_from).transpose()?)
    }

    async fn find_or_create_by_email(&self, email: &str) -> Result<User, Error> {
        let now = Utc::now().timestamp_millis();

        // The unique index on email decides the winner when two callers race.
        sqlx::query(
            r#"
            INSERT INTO users (id, email, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            ON CONFLICT(email) DO NOTHING
            "#,
        )
        .bind(UserId::new_random().as_str())
        .bind(email)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(database_error("insert user if absent"))?;

        self.find_by_email(email)
            .await?
            .ok_or(Error::Auth(AuthError::UserNotFound))
    }

    async fn update_name(&self, id: &UserId, name: &str) -> Result<User, Error> {
        let now = Utc::now().timestamp_millis();

        let row = sqlx::query_as::<_, SqliteUser>(&format!(
            r#"
            UPDATE users
            SET name = ?2, updated_at = ?3
            WHERE id = ?1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id.as_str())
        .bind(name)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("update user name"))?;

        match row {
            Some(row) => Ok(row.try_into()?),
            None => Err(Error::Auth(AuthError::UserNotFound)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::provider;
    use vigil_core::repositories::UserRepositoryProvider;

    #[tokio::test]
    async fn test_create_and_find() {
        let storage = provider().await;
        let created = storage
            .user()
            .create(NewUser::new("alice@example.com").with_name("Alice"))
            .await
            .unwrap();

        let by_email = storage
            .user()
            .find_by_email("alice@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, created.id);
        assert_eq!(by_email.name.as_deref(), Some("Alice"));

        let by_id = storage.user().find_by_id(&created.id).await.unwrap();
        assert_eq!(by_id, Some(created));
    }

    #[tokio::test]
    async fn test_email_is_case_sensitive() {
        let storage = provider().await;
        storage
            .user()
            .create(NewUser::new("alice@example.com"))
            .await
            .unwrap();

        let found = storage
            .user()
            .find_by_email("Alice@example.com")
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_a_constraint_error() {
        let storage = provider().await;
        storage
            .user()
            .create(NewUser::new("alice@example.com"))
            .await
            .unwrap();

        let err = storage
            .user()
            .create(NewUser::new("alice@example.com"))
            .await
            .unwrap_err();
        assert!(err.is_storage_error());
    }

    #[tokio::test]
    async fn test_find_or_create_returns_existing() {
        let storage = provider().await;
        let first = storage
            .user()
            .find_or_create_by_email("bob@example.com")
            .await
            .unwrap();
        let second = storage
            .user()
            .find_or_create_by_email("bob@example.com")
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert!(first.id.as_str().starts_with("usr_"));
    }

    #[tokio::test]
    async fn test_concurrent_find_or_create_yields_one_user() {
        let storage = std::sync::Arc::new(provider().await);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let storage = storage.clone();
                tokio::spawn(async move {
                    storage
                        .user()
                        .find_or_create_by_email("race@example.com")
                        .await
                })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap().id);
        }
        ids.dedup();
        assert_eq!(ids.len(), 1);
    }

    #[tokio::test]
    async fn test_update_name() {
        let storage = provider().await;
        let user = storage
            .user()
            .find_or_create_by_email("carol@example.com")
            .await
            .unwrap();

        let updated = storage.user().update_name(&user.id, "Carol").await.unwrap();
        assert_eq!(updated.name.as_deref(), Some("Carol"));
        assert!(updated.updated_at >= user.updated_at);

        let err = storage
            .user()
            .update_name(&UserId::new("usr_missing"), "Nobody")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
