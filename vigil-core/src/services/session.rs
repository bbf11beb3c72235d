use crate::{
    Error,
    cache::SessionCache,
    credential::{Credential, CredentialClaims, JwtConfig},
    error::{AuthError, SessionError},
    repositories::{SessionRepository, UserRepository},
    session::{DeviceSession, Fingerprint, SessionMatch},
    validation::validate_email,
};
use chrono::Utc;
use std::sync::Arc;

/// Service for the per-user registry of device sessions
///
/// Storage is authoritative. The [`SessionCache`] only speeds up [`latest_session`] and
/// can be dropped or rebuilt at any time.
///
/// [`latest_session`]: SessionService::latest_session
pub struct SessionService<U: UserRepository, S: SessionRepository> {
    user_repository: Arc<U>,
    session_repository: Arc<S>,
    cache: Arc<SessionCache>,
    jwt_config: JwtConfig,
}

impl<U: UserRepository, S: SessionRepository> SessionService<U, S> {
    pub fn new(user_repository: Arc<U>, session_repository: Arc<S>, jwt_config: JwtConfig) -> Self {
        Self {
            user_repository,
            session_repository,
            cache: Arc::new(SessionCache::new()),
            jwt_config,
        }
    }

    pub fn with_cache(mut self, cache: Arc<SessionCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Check a credential's signature and expiry.
    pub fn verify_credential(&self, credential: &Credential) -> Result<CredentialClaims, Error> {
        credential.verify(&self.jwt_config)
    }

    /// Record `credential` as the session for `fingerprint`, replacing an older one.
    pub async fn add_session(
        &self,
        email: &str,
        credential: Credential,
        fingerprint: &str,
    ) -> Result<DeviceSession, Error> {
        validate_email(email)?;
        let fingerprint = Fingerprint::parse(fingerprint)?;

        let claims = self.verify_credential(&credential)?;
        if claims.sub != email {
            return Err(SessionError::InvalidToken(
                "Credential was not issued for this email".to_string(),
            )
            .into());
        }

        let user = self.user_repository.find_or_create_by_email(email).await?;
        let now = Utc::now();
        let session = DeviceSession::builder()
            .user_id(user.id.clone())
            .fingerprint(fingerprint)
            .credential(credential)
            .created_at(now)
            .updated_at(now)
            .build()?;

        let stored = self.session_repository.upsert(session).await?;
        self.cache.put(stored.clone());

        tracing::info!(
            user_id = %user.id,
            fingerprint = %stored.fingerprint,
            "Stored device session"
        );
        Ok(stored)
    }

    /// Revoke the session for `fingerprint`.
    pub async fn remove_session(&self, email: &str, fingerprint: &str) -> Result<(), Error> {
        validate_email(email)?;
        let fingerprint = Fingerprint::parse(fingerprint)?;

        let user = self
            .user_repository
            .find_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let sessions = self.session_repository.list_for_user(&user.id).await?;
        if sessions.is_empty() {
            return Err(SessionError::NoSessions.into());
        }

        if !self
            .session_repository
            .delete(&user.id, &fingerprint)
            .await?
        {
            return Err(SessionError::NotFound.into());
        }

        self.cache.evict(&user.id, fingerprint.as_str());
        tracing::info!(user_id = %user.id, fingerprint = %fingerprint, "Removed device session");
        Ok(())
    }

    /// Find whoever most recently signed in on `fingerprint`.
    pub async fn find_by_fingerprint(
        &self,
        fingerprint: &str,
    ) -> Result<Option<SessionMatch>, Error> {
        let fingerprint = Fingerprint::parse(fingerprint)?;

        let Some(session) = self
            .session_repository
            .find_by_fingerprint(&fingerprint)
            .await?
        else {
            return Ok(None);
        };

        let Some(user) = self.user_repository.find_by_id(&session.user_id).await? else {
            tracing::warn!(user_id = %session.user_id, "Session owner is missing");
            return Ok(None);
        };

        Ok(Some(SessionMatch {
            email: user.email,
            credential: session.credential,
        }))
    }

    /// The most recently updated session for `email`, served from the cache when possible.
    pub async fn latest_session(&self, email: &str) -> Result<Option<DeviceSession>, Error> {
        validate_email(email)?;
        let user = self
            .user_repository
            .find_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if let Some(session) = self.cache.get(&user.id) {
            return Ok(Some(session));
        }

        let latest = self
            .session_repository
            .list_for_user(&user.id)
            .await?
            .into_iter()
            .next();
        if let Some(session) = &latest {
            self.cache.put(session.clone());
        }
        Ok(latest)
    }

    pub async fn list_sessions(&self, email: &str) -> Result<Vec<DeviceSession>, Error> {
        validate_email(email)?;
        let user = self
            .user_repository
            .find_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        self.session_repository.list_for_user(&user.id).await
    }

    /// Rebuild the cache from storage. Returns the number of users cached.
    pub async fn warm_cache(&self) -> Result<usize, Error> {
        let sessions = self.session_repository.list_all().await?;
        let cached = self.cache.rebuild(sessions);
        tracing::debug!(cached, "Warmed session cache");
        Ok(cached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;
    use chrono::Duration;

    const TEST_SECRET: &[u8] = b"test_secret_key_for_hs256_jwt_tokens_not_for_production_use";

    fn config() -> JwtConfig {
        JwtConfig::new_hs256(TEST_SECRET.to_vec())
    }

    fn credential(email: &str) -> Credential {
        Credential::issue(email, Duration::days(7), &config()).unwrap()
    }

    fn service(store: &Arc<MemoryStore>) -> SessionService<MemoryStore, MemoryStore> {
        SessionService::new(store.clone(), store.clone(), config())
    }

    #[tokio::test]
    async fn test_add_session_replaces_same_fingerprint() {
        let store = MemoryStore::shared();
        let service = service(&store);

        let first = credential("ada@example.com");
        // distinct iat is not guaranteed within one second, so vary the ttl
        let second = Credential::issue("ada@example.com", Duration::days(6), &config()).unwrap();

        service
            .add_session("ada@example.com", first, "laptop")
            .await
            .unwrap();
        service
            .add_session("ada@example.com", second.clone(), "laptop")
            .await
            .unwrap();

        assert_eq!(store.session_count().await, 1);
        let found = service
            .find_by_fingerprint("laptop")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.credential, second);
        assert_eq!(found.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_add_session_rejects_foreign_credential() {
        let store = MemoryStore::shared();
        let service = service(&store);

        let err = service
            .add_session("ada@example.com", credential("eve@example.com"), "laptop")
            .await
            .unwrap_err();
        assert!(err.is_invalid_or_expired());

        let err = service
            .add_session("ada@example.com", Credential::new("garbage"), "laptop")
            .await
            .unwrap_err();
        assert!(err.is_invalid_or_expired());
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_remove_session_outcomes() {
        let store = MemoryStore::shared();
        let service = service(&store);

        let err = service
            .remove_session("ghost@example.com", "laptop")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::UserNotFound)));

        store
            .find_or_create_by_email("ada@example.com")
            .await
            .unwrap();
        let err = service
            .remove_session("ada@example.com", "laptop")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Session(SessionError::NoSessions)));

        service
            .add_session("ada@example.com", credential("ada@example.com"), "laptop")
            .await
            .unwrap();
        let err = service
            .remove_session("ada@example.com", "phone")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Session(SessionError::NotFound)));

        service
            .remove_session("ada@example.com", "laptop")
            .await
            .unwrap();
        assert!(
            service
                .find_by_fingerprint("laptop")
                .await
                .unwrap()
                .is_none()
        );

        // removing again reports nothing left to remove
        assert!(
            service
                .remove_session("ada@example.com", "laptop")
                .await
                .unwrap_err()
                .is_not_found()
        );
    }

    #[tokio::test]
    async fn test_latest_session_uses_cache_and_storage() {
        let store = MemoryStore::shared();
        let service = service(&store);

        service
            .add_session("ada@example.com", credential("ada@example.com"), "laptop")
            .await
            .unwrap();

        let latest = service.latest_session("ada@example.com").await.unwrap();
        assert_eq!(latest.unwrap().fingerprint.as_str(), "laptop");

        // a fresh service has an empty cache and falls back to storage
        let cold = SessionService::new(store.clone(), store.clone(), config());
        let latest = cold.latest_session("ada@example.com").await.unwrap();
        assert_eq!(latest.unwrap().fingerprint.as_str(), "laptop");
        assert_eq!(cold.warm_cache().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_find_by_fingerprint_unknown() {
        let store = MemoryStore::shared();
        let service = service(&store);

        assert!(
            service
                .find_by_fingerprint("nowhere")
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            service
                .find_by_fingerprint("")
                .await
                .unwrap_err()
                .is_validation_error()
        );
    }
}
