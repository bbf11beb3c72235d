use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vigil::{RatingScale, RawBreachEntry, Score, SiteCheckReport};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeResponse {
    pub accepted: bool,
    pub delivered: bool,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyChallengeRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialResponse {
    pub credential: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddSessionRequest {
    pub email: String,
    pub credential: String,
    pub fingerprint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptedResponse {
    pub accepted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveSessionRequest {
    pub email: String,
    pub fingerprint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovedResponse {
    pub removed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionLookupRequest {
    pub fingerprint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionLookupResponse {
    pub session_found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateNameRequest {
    pub name: String,
}

/// Breach ingestion. Without `entries` the breaches are fetched from the lookup service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestBreachesRequest {
    pub owner_email: String,
    pub target_email: String,
    #[serde(default)]
    pub entries: Option<Vec<RawBreachEntry>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestBreachesResponse {
    pub inserted_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestSiteCheckRequest {
    pub owner_email: String,
    #[serde(flatten)]
    pub report: SiteCheckReport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckSiteRequest {
    pub owner_email: String,
    pub domain: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestPasswordRatingRequest {
    pub owner_email: String,
    pub domain: String,
    pub rating: f64,
    #[serde(default)]
    pub scale: RatingScale,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordRatingResponse {
    pub rating: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub score: Score,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
