use async_trait::async_trait;
use sqlx::SqlitePool;
use vigil_core::{
    Credential, DeviceSession, Error, Fingerprint, UserId, repositories::SessionRepository,
};

use crate::{RowError, database_error, from_millis};

pub struct SqliteSessionRepository {
    pool: SqlitePool,
}

impl SqliteSessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const SESSION_COLUMNS: &str = "user_id, fingerprint, credential, created_at, updated_at";

#[derive(Debug, Clone, sqlx::FromRow)]
struct SqliteSession {
    user_id: String,
    fingerprint: String,
    credential: String,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<SqliteSession> for DeviceSession {
    type Error = RowError;

    fn try_from(row: SqliteSession) -> Result<Self, Self::Error> {
        Ok(DeviceSession {
            user_id: UserId::from(row.user_id),
            fingerprint: Fingerprint::from(row.fingerprint),
            credential: Credential::from(row.credential),
            created_at: from_millis("created_at", row.created_at)?,
            updated_at: from_millis("updated_at", row.updated_at)?,
        })
    }
}

fn into_sessions(rows: Vec<SqliteSession>) -> Result<Vec<DeviceSession>, Error> {
    Ok(rows
        .into_iter()
        .map(DeviceSession::try_from)
        .collect::<Result<Vec<_>, _>>()?)
}

#[async_trait]
impl SessionRepository for SqliteSessionRepository {
    async fn upsert(&self, session: DeviceSession) -> Result<DeviceSession, Error> {
        let row = sqlx::query_as::<_, SqliteSession>(&format!(
            r#"
            INSERT INTO device_sessions (user_id, fingerprint, credential, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(user_id, fingerprint) DO UPDATE SET
                credential = excluded.credential,
                updated_at = excluded.updated_at
            RETURNING {SESSION_COLUMNS}
            "#
        ))
        .bind(session.user_id.as_str())
        .bind(session.fingerprint.as_str())
        .bind(session.credential.as_str())
        .bind(session.created_at.timestamp_millis())
        .bind(session.updated_at.timestamp_millis())
        .fetch_one(&self.pool)
        .await
        .map_err(database_error("upsert device session"))?;

        Ok(row.try_into()?)
    }

    async fn find_by_fingerprint(
        &self,
        fingerprint: &Fingerprint,
    ) -> Result<Option<DeviceSession>, Error> {
        let row = sqlx::query_as::<_, SqliteSession>(&format!(
            r#"
            SELECT {SESSION_COLUMNS} FROM device_sessions
            WHERE fingerprint = ?1
            ORDER BY updated_at DESC, id DESC
            LIMIT 1
            "#
        ))
        .bind(fingerprint.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("find session by fingerprint"))?;

        Ok(row.map(DeviceSession::try_from).transpose()?)
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<DeviceSession>, Error> {
        let rows = sqlx::query_as::<_, SqliteSession>(&format!(
            r#"
            SELECT {SESSION_COLUMNS} FROM device_sessions
            WHERE user_id = ?1
            ORDER BY updated_at DESC, id DESC
            "#
        ))
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("list sessions for user"))?;

        into_sessions(rows)
    }

    async fn list_all(&self) -> Result<Vec<DeviceSession>, Error> {
        let rows = sqlx::query_as::<_, SqliteSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM device_sessions ORDER BY updated_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("list all sessions"))?;

        into_sessions(rows)
    }

    async fn delete(&self, user_id: &UserId, fingerprint: &Fingerprint) -> Result<bool, Error> {
        let result =
            sqlx::query("DELETE FROM device_sessions WHERE user_id = ?1 AND fingerprint = ?2")
                .bind(user_id.as_str())
                .bind(fingerprint.as_str())
                .execute(&self.pool)
                .await
                .map_err(database_error("delete device session"))?;

        Ok(result.rows_affected() > 0)
    }
}
