use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use vigil_core::{Error, ReputationLookup, SiteVerdict, error::CollaboratorError};

use crate::{http_client, request_error, trim_base_url};

const SERVICE: &str = "virustotal";

/// A domain is flagged once more than this many engines call it malicious or suspicious.
pub const DETECTION_THRESHOLD: u32 = 3;

/// Domain reputation from the VirusTotal v3 API.
pub struct VirusTotalClient {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

#[derive(Debug, Default, Deserialize)]
pub struct DomainReport {
    #[serde(default)]
    pub data: Option<DomainData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DomainData {
    #[serde(default)]
    pub attributes: Option<DomainAttributes>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DomainAttributes {
    #[serde(default)]
    pub last_analysis_stats: AnalysisStats,
    #[serde(default)]
    pub last_analysis_results: HashMap<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalysisStats {
    #[serde(default)]
    pub malicious: u32,
    #[serde(default)]
    pub suspicious: u32,
    #[serde(default)]
    pub harmless: u32,
    #[serde(default)]
    pub undetected: u32,
}

impl DomainReport {
    pub fn verdict(&self) -> SiteVerdict {
        let Some(attributes) = self.data.as_ref().and_then(|d| d.attributes.as_ref()) else {
            return SiteVerdict {
                malicious: false,
                source: None,
                total_sources: 0,
            };
        };
        let stats = &attributes.last_analysis_stats;

        SiteVerdict {
            malicious: stats.malicious + stats.suspicious > DETECTION_THRESHOLD,
            source: (stats.malicious > 0)
                .then(|| format!("VirusTotal ({} detections)", stats.malicious)),
            total_sources: u32::try_from(attributes.last_analysis_results.len())
                .unwrap_or(u32::MAX),
        }
    }
}

impl VirusTotalClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, Error> {
        Ok(Self {
            base_url: trim_base_url(base_url),
            api_key: api_key.to_string(),
            http: http_client(SERVICE, timeout)?,
        })
    }

    pub async fn domain_report(&self, domain: &str) -> Result<DomainReport, Error> {
        self.http
            .get(format!("{}/api/v3/domains/{}", self.base_url, domain))
            .header("x-apikey", &self.api_key)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(request_error(SERVICE))?
            .error_for_status()
            .map_err(request_error(SERVICE))?
            .json::<DomainReport>()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, "Failed to parse VirusTotal domain report");
                Error::Collaborator(CollaboratorError::invalid_response(SERVICE, e))
            })
    }
}

#[async_trait]
impl ReputationLookup for VirusTotalClient {
    fn name(&self) -> &'static str {
        SERVICE
    }

    async fn check_domain(&self, domain: &str) -> Result<SiteVerdict, Error> {
        let verdict = self.domain_report(domain).await?.verdict();
        tracing::debug!(
            domain,
            malicious = verdict.malicious,
            total_sources = verdict.total_sources,
            "Domain reputation checked"
        );
        Ok(verdict)
    }
}
