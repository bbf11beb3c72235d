use async_trait::async_trait;
use sqlx::SqlitePool;
use vigil_core::{BreachSignal, Error, UserId, repositories::BreachRepository};

use crate::{RowError, database_error, from_millis};

pub struct SqliteBreachRepository {
    pool: SqlitePool,
}

impl SqliteBreachRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct SqliteBreach {
    id: String,
    user_id: String,
    email: String,
    breached_site: String,
    domain: Option<String>,
    industry: Option<String>,
    leaked_data: String,
    breach_date: Option<String>,
    breach_year: Option<i64>,
    records: Option<i64>,
    password_risk: Option<String>,
    verified: bool,
    breach_references: Option<String>,
    created_at: i64,
}

impl TryFrom<SqliteBreach> for BreachSignal {
    type Error = RowError;

    fn try_from(row: SqliteBreach) -> Result<Self, Self::Error> {
        let leaked_data = serde_json::from_str(&row.leaked_data).map_err(|source| {
            RowError::InvalidJson {
                column: "leaked_data",
                source,
            }
        })?;
        let breach_year = row
            .breach_year
            .map(|year| {
                i32::try_from(year).map_err(|_| RowError::InvalidValue {
                    column: "breach_year",
                    value: year,
                })
            })
            .transpose()?;

        Ok(BreachSignal {
            id: row.id,
            user_id: UserId::from(row.user_id),
            email: row.email,
            breached_site: row.breached_site,
            domain: row.domain,
            industry: row.industry,
            leaked_data,
            breach_date: row.breach_date,
            breach_year,
            records: row.records,
            password_risk: row.password_risk,
            verified: row.verified,
            references: row.breach_references,
            created_at: from_millis("created_at", row.created_at)?,
        })
    }
}

#[async_trait]
impl BreachRepository for SqliteBreachRepository {
    async fn insert_many(&self, signals: &[BreachSignal]) -> Result<u64, Error> {
        if signals.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(database_error("begin breach insert"))?;

        let mut inserted = 0;
        for signal in signals {
            let leaked_data = serde_json::to_string(&signal.leaked_data).map_err(|source| {
                RowError::InvalidJson {
                    column: "leaked_data",
                    source,
                }
            })?;

            let result = sqlx::query(
                r#"
                INSERT INTO breaches (
                    id, user_id, email, breached_site, domain, industry, leaked_data,
                    breach_date, breach_year, records, password_risk, verified,
                    breach_references, created_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                ON CONFLICT(user_id, breached_site) DO NOTHING
                "#,
            )
            .bind(&signal.id)
            .bind(signal.user_id.as_str())
            .bind(&signal.email)
            .bind(&signal.breached_site)
            .bind(&signal.domain)
            .bind(&signal.industry)
            .bind(leaked_data)
            .bind(&signal.breach_date)
            .bind(signal.breach_year)
            .bind(signal.records)
            .bind(&signal.password_risk)
            .bind(signal.verified)
            .bind(&signal.references)
            .bind(signal.created_at.timestamp_millis())
            .execute(&mut *tx)
            .await
            .map_err(database_error("insert breach"))?;

            inserted += result.rows_affected();
        }

        tx.commit()
            .await
            .map_err(database_error("commit breach insert"))?;

        tracing::debug!(inserted, offered = signals.len(), "Stored breach signals");
        Ok(inserted)
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<BreachSignal>, Error> {
        let rows = sqlx::query_as::<_, SqliteBreach>(
            r#"
            SELECT id, user_id, email, breached_site, domain, industry, leaked_data,
                   breach_date, breach_year, records, password_risk, verified,
                   breach_references, created_at
            FROM breaches
            WHERE user_id = ?1
            ORDER BY created_at, breached_site
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("list breaches for user"))?;

        Ok(rows
            .into_iter()
            .map(BreachSignal::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }
}
