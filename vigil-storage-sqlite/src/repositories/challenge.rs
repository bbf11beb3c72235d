use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use vigil_core::{
    Error, UserId, error::AuthError, otp::OtpChallenge, repositories::ChallengeRepository,
};

use crate::{database_error, from_millis};

/// Code challenges live on the `users` row: one pending code per user.
pub struct SqliteChallengeRepository {
    pool: SqlitePool,
}

impl SqliteChallengeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SqliteChallenge {
    otp_code: Option<String>,
    otp_expires_at: Option<i64>,
}

#[async_trait]
impl ChallengeRepository for SqliteChallengeRepository {
    async fn set_challenge(
        &self,
        user_id: &UserId,
        challenge: &OtpChallenge,
    ) -> Result<(), Error> {
        let result = sqlx::query(
            "UPDATE users SET otp_code = ?2, otp_expires_at = ?3, updated_at = ?4 WHERE id = ?1",
        )
        .bind(user_id.as_str())
        .bind(&challenge.code)
        .bind(challenge.expires_at.timestamp_millis())
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(database_error("set challenge"))?;

        if result.rows_affected() == 0 {
            return Err(Error::Auth(AuthError::UserNotFound));
        }
        Ok(())
    }

    async fn find_challenge(&self, user_id: &UserId) -> Result<Option<OtpChallenge>, Error> {
        let row = sqlx::query_as::<_, SqliteChallenge>(
            "SELECT otp_code, otp_expires_at FROM users WHERE id = ?1",
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("find challenge"))?;

        match row {
            Some(SqliteChallenge {
                otp_code: Some(code),
                otp_expires_at: Some(expires_at),
            }) => Ok(Some(OtpChallenge::new(
                code,
                from_millis("otp_expires_at", expires_at)?,
            ))),
            _ => Ok(None),
        }
    }

    async fn consume_challenge(
        &self,
        user_id: &UserId,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, Error> {
        // A single conditional update, so only one of several concurrent verifiers wins.
        let result = sqlx::query(
            r#"
            UPDATE users
            SET otp_code = NULL, otp_expires_at = NULL
            WHERE id = ?1 AND otp_code = ?2 AND otp_expires_at > ?3
            "#,
        )
        .bind(user_id.as_str())
        .bind(code)
        .bind(now.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(database_error("consume challenge"))?;

        Ok(result.rows_affected() == 1)
    }
}
