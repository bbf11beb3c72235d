//! Adapters that expose one repository of a shared [`RepositoryProvider`] as its own type,
//! so each service can be generic over a single repository trait.

use crate::{
    Error, User, UserId,
    otp::OtpChallenge,
    repositories::{
        BreachRepository, ChallengeRepository, PasswordRatingRepository, RepositoryProvider,
        SessionRepository, SiteCheckRepository, UserRepository,
    },
    session::{DeviceSession, Fingerprint},
    signal::{BreachSignal, PasswordRating, SiteCheck},
    user::NewUser,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Adapter that wraps a RepositoryProvider and implements individual repository traits
pub struct UserRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> UserRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> UserRepository for UserRepositoryAdapter<R> {
    async fn create(&self, user: NewUser) -> Result<User, Error> {
        self.provider.user().create(user).await
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        self.provider.user().find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        self.provider.user().find_by_email(email).await
    }

    async fn find_or_create_by_email(&self, email: &str) -> Result<User, Error> {
        self.provider.user().find_or_create_by_email(email).await
    }

    async fn update_name(&self, id: &UserId, name: &str) -> Result<User, Error> {
        self.provider.user().update_name(id, name).await
    }
}

pub struct ChallengeRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> ChallengeRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> ChallengeRepository for ChallengeRepositoryAdapter<R> {
    async fn set_challenge(
        &self,
        user_id: &UserId,
        challenge: &OtpChallenge,
    ) -> Result<(), Error> {
        self.provider
            .challenge()
            .set_challenge(user_id, challenge)
            .await
    }

    async fn find_challenge(&self, user_id: &UserId) -> Result<Option<OtpChallenge>, Error> {
        self.provider.challenge().find_challenge(user_id).await
    }

    async fn consume_challenge(
        &self,
        user_id: &UserId,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, Error> {
        self.provider
            .challenge()
            .consume_challenge(user_id, code, now)
            .await
    }
}

pub struct SessionRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> SessionRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> SessionRepository for SessionRepositoryAdapter<R> {
    async fn upsert(&self, session: DeviceSession) -> Result<DeviceSession, Error> {
        self.provider.session().upsert(session).await
    }

    async fn find_by_fingerprint(
        &self,
        fingerprint: &Fingerprint,
    ) -> Result<Option<DeviceSession>, Error> {
        self.provider
            .session()
            .find_by_fingerprint(fingerprint)
            .await
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<DeviceSession>, Error> {
        self.provider.session().list_for_user(user_id).await
    }

    async fn list_all(&self) -> Result<Vec<DeviceSession>, Error> {
        self.provider.session().list_all().await
    }

    async fn delete(&self, user_id: &UserId, fingerprint: &Fingerprint) -> Result<bool, Error> {
        self.provider.session().delete(user_id, fingerprint).await
    }
}

pub struct BreachRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> BreachRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> BreachRepository for BreachRepositoryAdapter<R> {
    async fn insert_many(&self, signals: &[BreachSignal]) -> Result<u64, Error> {
        self.provider.breach().insert_many(signals).await
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<BreachSignal>, Error> {
        self.provider.breach().list_for_user(user_id).await
    }
}

pub struct SiteCheckRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> SiteCheckRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> SiteCheckRepository for SiteCheckRepositoryAdapter<R> {
    async fn append(&self, check: SiteCheck) -> Result<SiteCheck, Error> {
        self.provider.site_check().append(check).await
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<SiteCheck>, Error> {
        self.provider.site_check().list_for_user(user_id).await
    }

    async fn list_malicious(&self, user_id: &UserId) -> Result<Vec<SiteCheck>, Error> {
        self.provider.site_check().list_malicious(user_id).await
    }
}

pub struct PasswordRatingRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> PasswordRatingRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> PasswordRatingRepository for PasswordRatingRepositoryAdapter<R> {
    async fn upsert(&self, rating: PasswordRating) -> Result<PasswordRating, Error> {
        self.provider.password_rating().upsert(rating).await
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<PasswordRating>, Error> {
        self.provider.password_rating().list_for_user(user_id).await
    }
}
