//! HTTP clients for the external collaborators of vigil
//!
//! - [`XposedOrNotClient`] implements [`BreachLookup`](vigil_core::BreachLookup) on the
//!   XposedOrNot breach analytics API.
//! - [`VirusTotalClient`] implements [`ReputationLookup`](vigil_core::ReputationLookup) on
//!   the VirusTotal v3 domain report API.
//!
//! Both are built from a [`LookupConfig`], usually read from the environment:
//!
//! ```rust,no_run
//! use vigil_lookup::LookupConfig;
//!
//! let config = LookupConfig::from_env();
//! let breaches = config.breach_lookup().unwrap();
//! let reputation = config.reputation_lookup(); // None without VIRUSTOTAL_API_KEY
//! ```

pub mod virustotal;
pub mod xposedornot;

pub use virustotal::VirusTotalClient;
pub use xposedornot::XposedOrNotClient;

use std::time::Duration;

use vigil_core::{Error, error::CollaboratorError};

pub const DEFAULT_XPOSEDORNOT_BASE_URL: &str = "https://api.xposedornot.com";
pub const DEFAULT_VIRUSTOTAL_BASE_URL: &str = "https://www.virustotal.com";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("vigil/", env!("CARGO_PKG_VERSION"));

/// Where the collaborators live and how to authenticate against them
#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub xposedornot_base_url: String,
    pub virustotal_base_url: String,
    pub virustotal_api_key: Option<String>,
    pub request_timeout: Duration,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            xposedornot_base_url: DEFAULT_XPOSEDORNOT_BASE_URL.to_string(),
            virustotal_base_url: DEFAULT_VIRUSTOTAL_BASE_URL.to_string(),
            virustotal_api_key: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl LookupConfig {
    /// Read `XPOSEDORNOT_BASE_URL`, `VIRUSTOTAL_BASE_URL` and `VIRUSTOTAL_API_KEY`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            xposedornot_base_url: std::env::var("XPOSEDORNOT_BASE_URL")
                .unwrap_or(defaults.xposedornot_base_url),
            virustotal_base_url: std::env::var("VIRUSTOTAL_BASE_URL")
                .unwrap_or(defaults.virustotal_base_url),
            virustotal_api_key: std::env::var("VIRUSTOTAL_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            request_timeout: defaults.request_timeout,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn breach_lookup(&self) -> Result<XposedOrNotClient, Error> {
        XposedOrNotClient::new(&self.xposedornot_base_url, self.request_timeout)
    }

    /// `None` when no API key is configured.
    pub fn reputation_lookup(&self) -> Option<Result<VirusTotalClient, Error>> {
        self.virustotal_api_key.as_ref().map(|key| {
            VirusTotalClient::new(&self.virustotal_base_url, key, self.request_timeout)
        })
    }
}

pub(crate) fn http_client(
    service: &'static str,
    timeout: Duration,
) -> Result<reqwest::Client, Error> {
    reqwest::ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| {
            tracing::error!(error = ?e, service, "Failed to build HTTP client");
            Error::Collaborator(CollaboratorError::unavailable(service, e))
        })
}

/// Translate a transport failure, keeping timeouts distinct.
pub(crate) fn request_error(service: &'static str) -> impl FnOnce(reqwest::Error) -> Error {
    move |e| {
        if e.is_timeout() {
            tracing::warn!(service, "Collaborator request timed out");
            Error::Collaborator(CollaboratorError::Timeout {
                service: service.to_string(),
            })
        } else {
            tracing::error!(
                error = ?e,
                status = ?e.status(),
                service,
                "Collaborator request failed"
            );
            Error::Collaborator(CollaboratorError::unavailable(service, e))
        }
    }
}

pub(crate) fn trim_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LookupConfig::default();
        assert_eq!(config.xposedornot_base_url, DEFAULT_XPOSEDORNOT_BASE_URL);
        assert!(config.reputation_lookup().is_none());
        assert!(config.breach_lookup().is_ok());
    }

    #[test]
    fn test_reputation_lookup_needs_key() {
        let config = LookupConfig {
            virustotal_api_key: Some("key".to_string()),
            ..Default::default()
        };
        assert!(matches!(config.reputation_lookup(), Some(Ok(_))));
    }

    #[test]
    fn test_trim_base_url() {
        assert_eq!(
            trim_base_url("https://api.example.com/"),
            "https://api.example.com"
        );
    }
}
