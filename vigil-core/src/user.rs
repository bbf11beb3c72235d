//! Users
//!
//! The user is the identity anchor every other record hangs off. It is created the first
//! time an email asks for a one-time code or shows up as the owner of a signal, and it is
//! never deleted.
//!
//! | Field        | Type             | Description                                      |
//! | ------------ | ---------------- | ------------------------------------------------ |
//! | `id`         | `UserId`         | Opaque, stable identifier used as the owner key. |
//! | `email`      | `String`         | Unique, stored exactly as given.                 |
//! | `name`       | `Option<String>` | Display name.                                    |
//! | `created_at` | `DateTime`       | When the user was first seen.                    |
//! | `updated_at` | `DateTime`       | When the profile last changed.                   |
use crate::{
    Error,
    error::ValidationError,
    id::{USER_PREFIX, generate_prefixed_id},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A unique, stable identifier for a specific user
///
/// Treat it as opaque. Storage keys every signal by this value, never by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: &str) -> Self {
        UserId(id.to_string())
    }

    pub fn new_random() -> Self {
        UserId(generate_prefixed_id(USER_PREFIX))
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new_random()
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn builder() -> UserBuilder {
        UserBuilder::default()
    }
}

#[derive(Default)]
pub struct UserBuilder {
    id: Option<UserId>,
    email: Option<String>,
    name: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl UserBuilder {
    pub fn id(mut self, id: UserId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn name(mut self, name: Option<String>) -> Self {
        self.name = name;
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

    pub fn build(self) -> Result<User, Error> {
        let now = Utc::now();
        Ok(User {
            id: self.id.unwrap_or_default(),
            email: self
                .email
                .ok_or(ValidationError::MissingField("email".to_string()))?,
            name: self.name,
            created_at: self.created_at.unwrap_or(now),
            updated_at: self.updated_at.unwrap_or(now),
        })
    }
}

/// The public view of a user: what the profile read returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: Option<String>,
    pub email: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            name: user.name,
            email: user.email,
        }
    }
}

/// A user that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: UserId,
    pub email: String,
    pub name: Option<String>,
}

impl NewUser {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: UserId::new_random(),
            email: email.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_format() {
        let id = UserId::new_random();
        assert!(id.as_str().starts_with("usr_"));
        assert_ne!(id, UserId::new_random());
    }

    #[test]
    fn test_builder_requires_email() {
        assert!(User::builder().build().is_err());

        let user = User::builder()
            .email("ada@example.com")
            .name(Some("Ada".to_string()))
            .build()
            .unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.name.as_deref(), Some("Ada"));
        assert!(user.id.as_str().starts_with("usr_"));
    }

    #[test]
    fn test_user_id_serializes_as_string() {
        let id = UserId::new("usr_abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"usr_abc\"");
    }
}
