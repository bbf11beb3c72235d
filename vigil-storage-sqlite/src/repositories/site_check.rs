use async_trait::async_trait;
use sqlx::SqlitePool;
use vigil_core::{Error, SiteCheck, UserId, repositories::SiteCheckRepository};

use crate::{RowError, database_error, from_millis};

pub struct SqliteSiteCheckRepository {
    pool: SqlitePool,
}

impl SqliteSiteCheckRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const SITE_CHECK_COLUMNS: &str =
    "id, user_id, domain, malicious, source, total_sources, checked_at";

#[derive(Debug, Clone, sqlx::FromRow)]
struct SqliteSiteCheck {
    id: String,
    user_id: String,
    domain: String,
    malicious: bool,
    source: Option<String>,
    total_sources: i64,
    checked_at: i64,
}

impl TryFrom<SqliteSiteCheck> for SiteCheck {
    type Error = RowError;

    fn try_from(row: SqliteSiteCheck) -> Result<Self, Self::Error> {
        let total_sources =
            u32::try_from(row.total_sources).map_err(|_| RowError::InvalidValue {
                column: "total_sources",
                value: row.total_sources,
            })?;

        Ok(SiteCheck {
            id: row.id,
            user_id: UserId::from(row.user_id),
            domain: row.domain,
            malicious: row.malicious,
            source: row.source,
            total_sources,
            checked_at: from_millis("checked_at", row.checked_at)?,
        })
    }
}

fn into_checks(rows: Vec<SqliteSiteCheck>) -> Result<Vec<SiteCheck>, Error> {
    Ok(rows
        .into_iter()
        .map(SiteCheck::try_from)
        .collect::<Result<Vec<_>, _>>()?)
}

#[async_trait]
impl SiteCheckRepository for SqliteSiteCheckRepository {
    async fn append(&self, check: SiteCheck) -> Result<SiteCheck, Error> {
        let row = sqlx::query_as::<_, SqliteSiteCheck>(&format!(
            r#"
            INSERT INTO site_checks (id, user_id, domain, malicious, source, total_sources, checked_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING {SITE_CHECK_COLUMNS}
            "#
        ))
        .bind(&check.id)
        .bind(check.user_id.as_str())
        .bind(&check.domain)
        .bind(check.malicious)
        .bind(&check.source)
        .bind(i64::from(check.total_sources))
        .bind(check.checked_at.timestamp_millis())
        .fetch_one(&self.pool)
        .await
        .map_err(database_error("append site check"))?;

        Ok(row.try_into()?)
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<SiteCheck>, Error> {
        let rows = sqlx::query_as::<_, SqliteSiteCheck>(&format!(
            "SELECT {SITE_CHECK_COLUMNS} FROM site_checks WHERE user_id = ?1 ORDER BY checked_at DESC, id"
        ))
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("list site checks"))?;

        into_checks(rows)
    }

    async fn list_malicious(&self, user_id: &UserId) -> Result<Vec<SiteCheck>, Error> {
        let rows = sqlx::query_as::<_, SqliteSiteCheck>(&format!(
            r#"
            SELECT {SITE_CHECK_COLUMNS} FROM site_checks
            WHERE user_id = ?1 AND malicious = 1
            ORDER BY checked_at DESC, id
            "#
        ))
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("list malicious site checks"))?;

        into_checks(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::provider;
    use chrono::{Duration, Utc};
    use vigil_core::{
        SiteVerdict,
        repositories::{SiteCheckRepositoryProvider, UserRepository, UserRepositoryProvider},
    };

    fn verdict(malicious: bool, total_sources: u32) -> SiteVerdict {
        SiteVerdict {
            malicious,
            source: malicious.then(|| "VirusTotal (4 detections)".to_string()),
            total_sources,
        }
    }

    #[tokio::test]
    async fn test_append_keeps_history() {
        let storage = provider().await;
        let user = storage
            .user()
            .find_or_create_by_email("alice@example.com")
            .await
            .unwrap();

        storage
            .site_check()
            .append(SiteCheck::new(&user.id, "example.com", verdict(false, 70)))
            .await
            .unwrap();
        storage
            .site_check()
            .append(SiteCheck::new(&user.id, "example.com", verdict(false, 70)))
            .await
            .unwrap();

        let checks = storage.site_check().list_for_user(&user.id).await.unwrap();
        assert_eq!(checks.len(), 2);
        assert!(checks.iter().all(|c| c.total_sources == 70));
    }

    #[tokio::test]
    async fn test_list_malicious_newest_first() {
        let storage = provider().await;
        let user = storage
            .user()
            .find_or_create_by_email("alice@example.com")
            .await
            .unwrap();
        let now = Utc::now();

        let mut old = SiteCheck::new(&user.id, "old-phish.test", verdict(true, 70));
        old.checked_at = now - Duration::hours(1);
        let mut new = SiteCheck::new(&user.id, "new-phish.test", verdict(true, 70));
        new.checked_at = now;
        let clean = SiteCheck::new(&user.id, "example.com", verdict(false, 70));

        for check in [old, clean, new] {
            storage.site_check().append(check).await.unwrap();
        }

        let malicious = storage.site_check().list_malicious(&user.id).await.unwrap();
        let domains: Vec<&str> = malicious.iter().map(|c| c.domain.as_str()).collect();
        assert_eq!(domains, vec!["new-phish.test", "old-phish.test"]);
        assert_eq!(
            malicious[0].source.as_deref(),
            Some("VirusTotal (4 detections)")
        );
    }

    #[tokio::test]
    async fn test_append_for_missing_user_fails() {
        let storage = provider().await;
        let err = storage
            .site_check()
            .append(SiteCheck::new(
                &UserId::new("usr_missing"),
                "example.com",
                verdict(false, 1),
            ))
            .await
            .unwrap_err();
        assert!(err.is_storage_error());
    }
}
