use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use vigil_core::{BreachLookup, Error, RawBreachEntry, error::CollaboratorError};

use crate::{http_client, request_error, trim_base_url};

const SERVICE: &str = "xposedornot";

/// Breach lookups against the XposedOrNot breach analytics endpoint.
pub struct XposedOrNotClient {
    base_url: String,
    http: reqwest::Client,
}

/// The subset of `/v1/breach-analytics` we read.
#[derive(Debug, Default, Deserialize)]
pub struct BreachAnalytics {
    #[serde(rename = "ExposedBreaches", default)]
    pub exposed_breaches: Option<ExposedBreaches>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExposedBreaches {
    #[serde(default)]
    pub breaches_details: Vec<BreachDetail>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BreachDetail {
    pub breach: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub xposed_data: Option<String>,
    #[serde(default)]
    pub xposed_date: Option<Value>,
    #[serde(default)]
    pub xposed_records: Option<Value>,
    #[serde(default)]
    pub password_risk: Option<String>,
    #[serde(default)]
    pub verified: Option<String>,
    #[serde(default)]
    pub references: Option<String>,
}

impl From<BreachDetail> for RawBreachEntry {
    fn from(detail: BreachDetail) -> Self {
        RawBreachEntry {
            site: detail.breach,
            domain: detail.domain,
            industry: detail.industry,
            leaked_data: detail.xposed_data,
            date: detail.xposed_date.as_ref().and_then(value_to_string),
            records: detail.xposed_records.as_ref().and_then(value_to_i64),
            password_risk: detail.password_risk,
            verified: detail
                .verified
                .is_some_and(|v| v.eq_ignore_ascii_case("yes")),
            references: detail.references,
        }
    }
}

impl BreachAnalytics {
    pub fn into_entries(self) -> Vec<RawBreachEntry> {
        self.exposed_breaches
            .map(|b| b.breaches_details)
            .unwrap_or_default()
            .into_iter()
            .map(RawBreachEntry::from)
            .collect()
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl XposedOrNotClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, Error> {
        Ok(Self {
            base_url: trim_base_url(base_url),
            http: http_client(SERVICE, timeout)?,
        })
    }

    /// Fetch the analytics document for `email`. `None` when the address is unknown.
    pub async fn breach_analytics(&self, email: &str) -> Result<Option<BreachAnalytics>, Error> {
        let response = self
            .http
            .get(format!("{}/v1/breach-analytics", self.base_url))
            .query(&[("email", email)])
            .send()
            .await
            .map_err(request_error(SERVICE))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body = response
            .error_for_status()
            .map_err(request_error(SERVICE))?
            .text()
            .await
            .map_err(request_error(SERVICE))?;

        // Unknown addresses sometimes come back as 200 with an error document.
        let analytics = serde_json::from_str::<BreachAnalytics>(&body).map_err(|e| {
            tracing::error!(error = %e, "Failed to parse breach analytics response");
            Error::Collaborator(CollaboratorError::invalid_response(SERVICE, e))
        })?;
        Ok(Some(analytics))
    }
}

#[async_trait]
impl BreachLookup for XposedOrNotClient {
    fn name(&self) -> &'static str {
        SERVICE
    }

    async fn lookup(&self, email: &str) -> Result<Vec<RawBreachEntry>, Error> {
        let entries = self
            .breach_analytics(email)
            .await?
            .map(BreachAnalytics::into_entries)
            .unwrap_or_default();

        tracing::debug!(count = entries.len(), "Breach lookup finished");
        Ok(entries)
    }
}
