//! Signals: persisted records derived from one external verdict
//!
//! Three kinds exist, all owned by exactly one user:
//!
//! - [`BreachSignal`]: one exposure of an address in a breached site. Unique per `(user, site)`.
//! - [`SiteCheck`]: one malicious/clean verdict for a visited domain. Appended, never merged.
//! - [`PasswordRating`]: one strength rating per `(user, domain)`, stored on a 0-100 scale.
//!
//! Collaborators hand over loosely shaped data. The `Raw*`/`*Report` types mirror that shape
//! and are normalized into the signal types here, so the score reducers only ever see
//! validated values.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::ValidationError,
    id::{BREACH_PREFIX, RATING_PREFIX, SITE_CHECK_PREFIX, generate_prefixed_id},
    user::UserId,
    validation::{normalize_domain, validate_email},
};

/// Pseudo-domains used to tag aggregate scores. Never averaged into the password score.
pub const RESERVED_DOMAINS: [&str; 3] = ["breach", "website", "overall"];

pub fn is_reserved_domain(domain: &str) -> bool {
    RESERVED_DOMAINS.contains(&domain)
}

/// A breach entry as a lookup service reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBreachEntry {
    pub site: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    /// Exposed data types joined by `;`
    #[serde(default)]
    pub leaked_data: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub records: Option<i64>,
    #[serde(default)]
    pub password_risk: Option<String>,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub references: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreachSignal {
    pub id: String,
    pub user_id: UserId,
    /// The exposed address. May differ from the owner's login email.
    pub email: String,
    pub breached_site: String,
    pub domain: Option<String>,
    pub industry: Option<String>,
    /// Lower-cased, trimmed, de-duplicated data-type tags
    pub leaked_data: Vec<String>,
    pub breach_date: Option<String>,
    pub breach_year: Option<i32>,
    pub records: Option<i64>,
    pub password_risk: Option<String>,
    pub verified: bool,
    pub references: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl BreachSignal {
    /// Normalize a raw entry for `target_email` owned by `user_id`.
    pub fn from_raw(
        user_id: &UserId,
        target_email: &str,
        raw: RawBreachEntry,
    ) -> Result<Self, ValidationError> {
        let site = raw.site.trim();
        if site.is_empty() {
            return Err(ValidationError::MissingField("breach site".to_string()));
        }
        validate_email(target_email)?;

        let breach_year = raw.date.as_deref().and_then(parse_breach_year);

        Ok(Self {
            id: generate_prefixed_id(BREACH_PREFIX),
            user_id: user_id.clone(),
            email: target_email.to_string(),
            breached_site: site.to_string(),
            domain: non_empty(raw.domain),
            industry: non_empty(raw.industry),
            leaked_data: split_tags(raw.leaked_data.as_deref().unwrap_or_default()),
            breach_date: non_empty(raw.date),
            breach_year,
            records: raw.records,
            password_risk: non_empty(raw.password_risk),
            verified: raw.verified,
            references: non_empty(raw.references),
            created_at: Utc::now(),
        })
    }
}

/// Split a `;`-joined list of data types into a sorted set of lower-cased tags.
pub fn split_tags(leaked: &str) -> Vec<String> {
    leaked
        .split(';')
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Leading four-digit year of a date such as `2019`, `2019-05` or `2019-05-01T00:00:00Z`.
pub fn parse_breach_year(date: &str) -> Option<i32> {
    let date = date.trim();
    let head = date.get(..4)?;
    if !head.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if date.as_bytes().get(4).is_some_and(u8::is_ascii_digit) {
        return None;
    }
    head.parse().ok()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A reputation verdict for one domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteVerdict {
    pub malicious: bool,
    pub source: Option<String>,
    pub total_sources: u32,
}

/// A site check as submitted by a client, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteCheckReport {
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub malicious: Option<bool>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub total_sources: Option<i64>,
}

impl SiteCheckReport {
    pub fn new(domain: impl Into<String>, verdict: SiteVerdict) -> Self {
        Self {
            domain: Some(domain.into()),
            malicious: Some(verdict.malicious),
            source: verdict.source,
            total_sources: Some(i64::from(verdict.total_sources)),
        }
    }

    /// Check required fields and return the normalized domain with its verdict.
    pub fn validate(self) -> Result<(String, SiteVerdict), ValidationError> {
        let domain = self
            .domain
            .ok_or_else(|| ValidationError::MissingField("domain".to_string()))?;
        let domain = normalize_domain(&domain)?;
        let malicious = self
            .malicious
            .ok_or_else(|| ValidationError::MissingField("malicious".to_string()))?;
        let total_sources = self
            .total_sources
            .ok_or_else(|| ValidationError::MissingField("total_sources".to_string()))?;
        let total_sources = u32::try_from(total_sources).map_err(|_| {
            ValidationError::OutOfRange(format!(
                "total_sources must be a non-negative count, got {total_sources}"
            ))
        })?;

        Ok((
            domain,
            SiteVerdict {
                malicious,
                source: non_empty(self.source),
                total_sources,
            },
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteCheck {
    pub id: String,
    pub user_id: UserId,
    pub domain: String,
    pub malicious: bool,
    pub source: Option<String>,
    pub total_sources: u32,
    pub checked_at: DateTime<Utc>,
}

impl SiteCheck {
    pub fn new(user_id: &UserId, domain: impl Into<String>, verdict: SiteVerdict) -> Self {
        Self {
            id: generate_prefixed_id(SITE_CHECK_PREFIX),
            user_id: user_id.clone(),
            domain: domain.into(),
            malicious: verdict.malicious,
            source: verdict.source,
            total_sources: verdict.total_sources,
            checked_at: Utc::now(),
        }
    }

    /// Checks with no consulted sources carry no information.
    pub fn has_data(&self) -> bool {
        self.total_sources > 0
    }
}

/// The scale a caller's raw password rating is expressed in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingScale {
    /// 0-10, as the browser extension reports strength
    #[default]
    OutOfTen,
    /// 0-100, already at rest scale
    OutOfHundred,
}

impl RatingScale {
    pub fn max(&self) -> f64 {
        match self {
            RatingScale::OutOfTen => 10.0,
            RatingScale::OutOfHundred => 100.0,
        }
    }

    /// Range-check `raw` for this scale and rescale it to 0-100.
    pub fn to_percent(&self, raw: f64) -> Result<f64, ValidationError> {
        if !raw.is_finite() || raw < 0.0 || raw > self.max() {
            return Err(ValidationError::OutOfRange(format!(
                "rating {raw} is outside 0..={}",
                self.max()
            )));
        }
        Ok(match self {
            RatingScale::OutOfTen => raw * 10.0,
            RatingScale::OutOfHundred => raw,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordRating {
    pub id: String,
    pub user_id: UserId,
    pub domain: String,
    /// Always on the 0-100 scale
    pub rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PasswordRating {
    pub fn new(user_id: &UserId, domain: impl Into<String>, rating: f64) -> Self {
        let now = Utc::now();
        Self {
            id: generate_prefixed_id(RATING_PREFIX),
            user_id: user_id.clone(),
            domain: domain.into(),
            rating,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_reserved(&self) -> bool {
        is_reserved_domain(&self.domain)
    }
}

/// Listing row for the breach-info read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreachInfo {
    pub user_email: String,
    pub breached_site: String,
    pub leaked_data: Vec<String>,
    pub breach_date: Option<String>,
}

impl From<BreachSignal> for BreachInfo {
    fn from(signal: BreachSignal) -> Self {
        Self {
            user_email: signal.email,
            breached_site: signal.breached_site,
            leaked_data: signal.leaked_data,
            breach_date: signal.breach_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(site: &str, leaked: &str, date: &str) -> RawBreachEntry {
        RawBreachEntry {
            site: site.to_string(),
            leaked_data: Some(leaked.to_string()),
            date: Some(date.to_string()),
            verified: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_split_tags() {
        assert_eq!(
            split_tags("Email addresses; Passwords;;email addresses ;Names"),
            vec!["email addresses", "names", "passwords"]
        );
        assert!(split_tags("").is_empty());
    }

    #[test]
    fn test_parse_breach_year() {
        assert_eq!(parse_breach_year("2019"), Some(2019));
        assert_eq!(parse_breach_year("2021-07-14"), Some(2021));
        assert_eq!(parse_breach_year(" 2008-01-01T00:00:00Z"), Some(2008));
        assert_eq!(parse_breach_year("20190"), None);
        assert_eq!(parse_breach_year("July 2019"), None);
        assert_eq!(parse_breach_year("19"), None);
    }

    #[test]
    fn test_breach_from_raw() {
        let owner = UserId::new("usr_owner");
        let signal = BreachSignal::from_raw(
            &owner,
            "target@example.com",
            raw("Adobe", "Passwords;Email addresses", "2013-10-04"),
        )
        .unwrap();

        assert!(signal.id.starts_with("brc_"));
        assert_eq!(signal.user_id, owner);
        assert_eq!(signal.email, "target@example.com");
        assert_eq!(signal.breached_site, "Adobe");
        assert_eq!(signal.leaked_data, vec!["email addresses", "passwords"]);
        assert_eq!(signal.breach_year, Some(2013));
        assert!(signal.verified);
    }

    #[test]
    fn test_breach_from_raw_missing_fields() {
        let owner = UserId::new("usr_owner");
        let err = BreachSignal::from_raw(&owner, "a@example.com", raw("  ", "", "")).unwrap_err();
        assert!(matches!(err, ValidationError::MissingField(_)));

        let entry = RawBreachEntry {
            site: "Quiet".to_string(),
            ..Default::default()
        };
        let signal = BreachSignal::from_raw(&owner, "a@example.com", entry).unwrap();
        assert!(signal.leaked_data.is_empty());
        assert_eq!(signal.breach_year, None);
        assert_eq!(signal.breach_date, None);
    }

    #[test]
    fn test_site_check_report_validation() {
        let report = SiteCheckReport {
            domain: Some("https://www.Evil.example/login".to_string()),
            malicious: Some(true),
            source: Some("VirusTotal (7 detections)".to_string()),
            total_sources: Some(90),
        };
        let (domain, verdict) = report.validate().unwrap();
        assert_eq!(domain, "evil.example");
        assert!(verdict.malicious);
        assert_eq!(verdict.total_sources, 90);

        let missing_flag = SiteCheckReport {
            domain: Some("example.com".to_string()),
            total_sources: Some(3),
            ..Default::default()
        };
        assert!(matches!(
            missing_flag.validate(),
            Err(ValidationError::MissingField(f)) if f == "malicious"
        ));

        let missing_count = SiteCheckReport {
            domain: Some("example.com".to_string()),
            malicious: Some(false),
            ..Default::default()
        };
        assert!(matches!(
            missing_count.validate(),
            Err(ValidationError::MissingField(f)) if f == "total_sources"
        ));

        let negative = SiteCheckReport {
            domain: Some("example.com".to_string()),
            malicious: Some(false),
            total_sources: Some(-1),
            ..Default::default()
        };
        assert!(matches!(
            negative.validate(),
            Err(ValidationError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_rating_scale() {
        assert_eq!(RatingScale::OutOfTen.to_percent(8.0).unwrap(), 80.0);
        assert_eq!(RatingScale::OutOfHundred.to_percent(8.0).unwrap(), 8.0);
        assert!(RatingScale::OutOfTen.to_percent(11.0).is_err());
        assert!(RatingScale::OutOfHundred.to_percent(-1.0).is_err());
        assert!(RatingScale::OutOfTen.to_percent(f64::NAN).is_err());
    }

    #[test]
    fn test_rating_scale_serde() {
        let scale: RatingScale = serde_json::from_str("\"out_of_hundred\"").unwrap();
        assert_eq!(scale, RatingScale::OutOfHundred);
        assert_eq!(RatingScale::default(), RatingScale::OutOfTen);
    }

    #[test]
    fn test_reserved_domains() {
        assert!(is_reserved_domain("overall"));
        assert!(is_reserved_domain("breach"));
        assert!(!is_reserved_domain("example.com"));
    }
}
