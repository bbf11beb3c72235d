//! Device sessions
//!
//! Each authenticated device holds one [`DeviceSession`], keyed by the pair
//! `(user_id, fingerprint)`. Adding a session for a fingerprint the user already has replaces
//! the stored credential.
//!
//! | Field         | Type          | Description                                          |
//! | ------------- | ------------- | ---------------------------------------------------- |
//! | `user_id`     | `UserId`      | The owning user.                                     |
//! | `fingerprint` | `Fingerprint` | Stable client-derived identifier for the device.    |
//! | `credential`  | `Credential`  | The most recently issued credential for the device. |
//! | `created_at`  | `DateTime`    | When the device first signed in.                     |
//! | `updated_at`  | `DateTime`    | When the credential was last replaced.               |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    credential::Credential,
    error::ValidationError,
    user::UserId,
    validation::validate_fingerprint,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap a fingerprint after checking it is usable as a partition key.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        validate_fingerprint(value)?;
        Ok(Self(value.to_string()))
    }

    pub fn new(value: &str) -> Self {
        Self(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for Fingerprint {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSession {
    pub user_id: UserId,
    pub fingerprint: Fingerprint,
    pub credential: Credential,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DeviceSession {
    pub fn builder() -> DeviceSessionBuilder {
        DeviceSessionBuilder::default()
    }
}

#[derive(Default)]
pub struct DeviceSessionBuilder {
    user_id: Option<UserId>,
    fingerprint: Option<Fingerprint>,
    credential: Option<Credential>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl DeviceSessionBuilder {
    pub fn user_id(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn fingerprint(mut self, fingerprint: Fingerprint) -> Self {
        self.fingerprint = Some(fingerprint);
        self
    }

    pub fn credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    pub fn build(self) -> Result<DeviceSession, Error> {
        let now = Utc::now();
        Ok(DeviceSession {
            user_id: self
                .user_id
                .ok_or(ValidationError::MissingField("user_id".to_string()))?,
            fingerprint: self
                .fingerprint
                .ok_or(ValidationError::MissingField("fingerprint".to_string()))?,
            credential: self
                .credential
                .ok_or(ValidationError::MissingField("credential".to_string()))?,
            created_at: self.created_at.unwrap_or(now),
            updated_at: self.updated_at.unwrap_or(now),
        })
    }
}

/// Result of a fingerprint lookup across all users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMatch {
    pub email: String,
    pub credential: Credential,
}
