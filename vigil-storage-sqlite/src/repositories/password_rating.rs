use async_trait::async_trait;
use sqlx::SqlitePool;
use vigil_core::{Error, PasswordRating, UserId, repositories::PasswordRatingRepository};

use crate::{RowError, database_error, from_millis};

pub struct SqlitePasswordRatingRepository {
    pool: SqlitePool,
}

impl SqlitePasswordRatingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const RATING_COLUMNS: &str = "id, user_id, domain, rating, created_at, updated_at";

#[derive(Debug, Clone, sqlx::FromRow)]
struct SqlitePasswordRating {
    id: String,
    user_id: String,
    domain: String,
    rating: f64,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<SqlitePasswordRating> for PasswordRating {
    type Error = RowError;

    fn try_from(row: SqlitePasswordRating) -> Result<Self, Self::Error> {
        Ok(PasswordRating {
            id: row.id,
            user_id: UserId::from(row.user_id),
            domain: row.domain,
            rating: row.rating,
            created_at: from_millis("created_at", row.created_at)?,
            updated_at: from_millis("updated_at", row.updated_at)?,
        })
    }
}

#[async_trait]
impl PasswordRatingRepository for SqlitePasswordRatingRepository {
    async fn upsert(&self, rating: PasswordRating) -> Result<PasswordRating, Error> {
        let row = sqlx::query_as::<_, SqlitePasswordRating>(&format!(
            r#"
            INSERT INTO password_ratings (id, user_id, domain, rating, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(user_id, domain) DO UPDATE SET
                rating = excluded.rating,
                updated_at = excluded.updated_at
            RETURNING {RATING_COLUMNS}
            "#
        ))
        .bind(&rating.id)
        .bind(rating.user_id.as_str())
        .bind(&rating.domain)
        .bind(rating.rating)
        .bind(rating.created_at.timestamp_millis())
        .bind(rating.updated_at.timestamp_millis())
        .fetch_one(&self.pool)
        .await
        .map_err(database_error("upsert password rating"))?;

        Ok(row.try_into()?)
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<PasswordRating>, Error> {
        let rows = sqlx::query_as::<_, SqlitePasswordRating>(&format!(
            "SELECT {RATING_COLUMNS} FROM password_ratings WHERE user_id = ?1 ORDER BY domain"
        ))
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("list password ratings"))?;

        Ok(rows
            .into_iter()
            .map(PasswordRating::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }
}
