//! In-memory repositories for service tests

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::{
    Error, User, UserId,
    error::{AuthError, StorageError},
    otp::OtpChallenge,
    repositories::{
        BreachRepository, ChallengeRepository, PasswordRatingRepository, SessionRepository,
        SiteCheckRepository, UserRepository,
    },
    session::{DeviceSession, Fingerprint},
    signal::{BreachSignal, PasswordRating, SiteCheck},
    user::NewUser,
};

#[derive(Default)]
pub(crate) struct MemoryStore {
    users: Mutex<Vec<User>>,
    challenges: Mutex<HashMap<UserId, OtpChallenge>>,
    sessions: Mutex<Vec<DeviceSession>>,
    breaches: Mutex<Vec<BreachSignal>>,
    checks: Mutex<Vec<SiteCheck>>,
    ratings: Mutex<Vec<PasswordRating>>,
    pub(crate) fail_reads: std::sync::atomic::AtomicBool,
}

impl MemoryStore {
    pub(crate) fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) async fn expire_challenge(&self, user_id: &UserId) {
        if let Some(challenge) = self.challenges.lock().await.get_mut(user_id) {
            challenge.expires_at = Utc::now() - chrono::Duration::seconds(1);
        }
    }

    pub(crate) async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    fn check_reads(&self) -> Result<(), Error> {
        if self.fail_reads.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(StorageError::Database("store offline".to_string()).into());
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, new_user: NewUser) -> Result<User, Error> {
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(StorageError::Constraint("users.email".to_string()).into());
        }
        let user = User::builder()
            .id(new_user.id)
            .email(new_user.email)
            .name(new_user.name)
            .build()?;
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|u| &u.id == id)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_or_create_by_email(&self, email: &str) -> Result<User, Error> {
        if let Some(user) = self.find_by_email(email).await? {
            return Ok(user);
        }
        self.create(NewUser::new(email)).await
    }

    async fn update_name(&self, id: &UserId, name: &str) -> Result<User, Error> {
        let mut users = self.users.lock().await;
        let user = users
            .iter_mut()
            .find(|u| &u.id == id)
            .ok_or(AuthError::UserNotFound)?;
        user.name = Some(name.to_string());
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

#[async_trait]
impl ChallengeRepository for MemoryStore {
    async fn set_challenge(
        &self,
        user_id: &UserId,
        challenge: &OtpChallenge,
    ) -> Result<(), Error> {
        self.challenges
            .lock()
            .await
            .insert(user_id.clone(), challenge.clone());
        Ok(())
    }

    async fn find_challenge(&self, user_id: &UserId) -> Result<Option<OtpChallenge>, Error> {
        Ok(self.challenges.lock().await.get(user_id).cloned())
    }

    async fn consume_challenge(
        &self,
        user_id: &UserId,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, Error> {
        let mut challenges = self.challenges.lock().await;
        match challenges.get(user_id) {
            Some(challenge) if challenge.accepts(code, now) => {
                challenges.remove(user_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn upsert(&self, session: DeviceSession) -> Result<DeviceSession, Error> {
        let mut sessions = self.sessions.lock().await;
        if let Some(existing) = sessions
            .iter_mut()
            .find(|s| s.user_id == session.user_id && s.fingerprint == session.fingerprint)
        {
            existing.credential = session.credential;
            existing.updated_at = session.updated_at;
            return Ok(existing.clone());
        }
        sessions.push(session.clone());
        Ok(session)
    }

    async fn find_by_fingerprint(
        &self,
        fingerprint: &Fingerprint,
    ) -> Result<Option<DeviceSession>, Error> {
        Ok(self
            .sessions
            .lock()
            .await
            .iter()
            .filter(|s| &s.fingerprint == fingerprint)
            .max_by_key(|s| s.updated_at)
            .cloned())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<DeviceSession>, Error> {
        let mut sessions: Vec<_> = self
            .sessions
            .lock()
            .await
            .iter()
            .filter(|s| &s.user_id == user_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(sessions)
    }

    async fn list_all(&self) -> Result<Vec<DeviceSession>, Error> {
        Ok(self.sessions.lock().await.clone())
    }

    async fn delete(&self, user_id: &UserId, fingerprint: &Fingerprint) -> Result<bool, Error> {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|s| !(&s.user_id == user_id && &s.fingerprint == fingerprint));
        Ok(sessions.len() < before)
    }
}

#[async_trait]
impl BreachRepository for MemoryStore {
    async fn insert_many(&self, signals: &[BreachSignal]) -> Result<u64, Error> {
        let mut breaches = self.breaches.lock().await;
        let mut inserted = 0;
        for signal in signals {
            let exists = breaches
                .iter()
                .any(|b| b.user_id == signal.user_id && b.breached_site == signal.breached_site);
            if !exists {
                breaches.push(signal.clone());
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<BreachSignal>, Error> {
        self.check_reads()?;
        Ok(self
            .breaches
            .lock()
            .await
            .iter()
            .filter(|b| &b.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SiteCheckRepository for MemoryStore {
    async fn append(&self, check: SiteCheck) -> Result<SiteCheck, Error> {
        self.checks.lock().await.push(check.clone());
        Ok(check)
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<SiteCheck>, Error> {
        self.check_reads()?;
        Ok(self
            .checks
            .lock()
            .await
            .iter()
            .filter(|c| &c.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_malicious(&self, user_id: &UserId) -> Result<Vec<SiteCheck>, Error> {
        let mut checks: Vec<_> = SiteCheckRepository::list_for_user(self, user_id)
            .await?
            .into_iter()
            .filter(|c| c.malicious)
            .collect();
        checks.sort_by(|a, b| b.checked_at.cmp(&a.checked_at));
        Ok(checks)
    }
}

#[async_trait]
impl PasswordRatingRepository for MemoryStore {
    async fn upsert(&self, rating: PasswordRating) -> Result<PasswordRating, Error> {
        let mut ratings = self.ratings.lock().await;
        if let Some(existing) = ratings
            .iter_mut()
            .find(|r| r.user_id == rating.user_id && r.domain == rating.domain)
        {
            existing.rating = rating.rating;
            existing.updated_at = rating.updated_at;
            return Ok(existing.clone());
        }
        ratings.push(rating.clone());
        Ok(rating)
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<PasswordRating>, Error> {
        self.check_reads()?;
        Ok(self
            .ratings
            .lock()
            .await
            .iter()
            .filter(|r| &r.user_id == user_id)
            .cloned()
            .collect())
    }
}
