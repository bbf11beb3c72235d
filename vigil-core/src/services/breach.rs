use crate::{
    Error, User,
    error::{AuthError, CollaboratorError},
    lookup::BreachLookup,
    repositories::{BreachRepository, UserRepository},
    signal::{BreachInfo, BreachSignal, RawBreachEntry},
    validation::validate_email,
};
use std::sync::Arc;

/// Service for breach signal ingestion and listing
pub struct BreachService<U: UserRepository, B: BreachRepository> {
    user_repository: Arc<U>,
    breach_repository: Arc<B>,
    lookup: Option<Arc<dyn BreachLookup>>,
}

impl<U: UserRepository, B: BreachRepository> BreachService<U, B> {
    pub fn new(user_repository: Arc<U>, breach_repository: Arc<B>) -> Self {
        Self {
            user_repository,
            breach_repository,
            lookup: None,
        }
    }

    pub fn with_lookup(mut self, lookup: Arc<dyn BreachLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Store breach entries for `target_email` under `owner_email`.
    ///
    /// Sites the owner already has a breach for are skipped. Returns how many were new.
    pub async fn ingest(
        &self,
        owner_email: &str,
        target_email: &str,
        entries: Vec<RawBreachEntry>,
    ) -> Result<u64, Error> {
        validate_email(target_email)?;
        let owner = self.owner(owner_email).await?;

        let signals = entries
            .into_iter()
            .map(|entry| BreachSignal::from_raw(&owner.id, target_email, entry))
            .collect::<Result<Vec<_>, _>>()?;

        let inserted = if signals.is_empty() {
            0
        } else {
            self.breach_repository.insert_many(&signals).await?
        };

        tracing::info!(
            user_id = %owner.id,
            received = signals.len(),
            inserted,
            "Ingested breach signals"
        );
        Ok(inserted)
    }

    /// Ask the breach lookup about `target_email` and ingest whatever it reports.
    pub async fn fetch_and_ingest(
        &self,
        owner_email: &str,
        target_email: &str,
    ) -> Result<u64, Error> {
        validate_email(target_email)?;
        // fail on a missing owner before spending a lookup
        self.owner(owner_email).await?;

        let lookup = self.lookup.as_ref().ok_or_else(|| {
            CollaboratorError::unavailable("breach lookup", "no breach lookup configured")
        })?;

        let entries = lookup.lookup(target_email).await.map_err(|e| {
            tracing::error!(service = lookup.name(), error = %e, "Breach lookup failed");
            e
        })?;

        self.ingest(owner_email, target_email, entries).await
    }

    pub async fn list(&self, owner_email: &str) -> Result<Vec<BreachSignal>, Error> {
        let owner = self.owner(owner_email).await?;
        self.breach_repository.list_for_user(&owner.id).await
    }

    pub async fn breach_info(&self, owner_email: &str) -> Result<Vec<BreachInfo>, Error> {
        Ok(self
            .list(owner_email)
            .await?
            .into_iter()
            .map(BreachInfo::from)
            .collect())
    }

    async fn owner(&self, email: &str) -> Result<User, Error> {
        validate_email(email)?;
        self.user_repository
            .find_by_email(email)
            .await?
            .ok_or_else(|| AuthError::UserNotFound.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;
    use async_trait::async_trait;

    fn entry(site: &str, leaked: &str) -> RawBreachEntry {
        RawBreachEntry {
            site: site.to_string(),
            leaked_data: Some(leaked.to_string()),
            date: Some("2019-01-01".to_string()),
            verified: true,
            ..Default::default()
        }
    }

    struct FixedLookup(Vec<RawBreachEntry>);

    #[async_trait]
    impl BreachLookup for FixedLookup {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn lookup(&self, _email: &str) -> Result<Vec<RawBreachEntry>, Error> {
            Ok(self.0.clone())
        }
    }

    struct DownLookup;

    #[async_trait]
    impl BreachLookup for DownLookup {
        fn name(&self) -> &'static str {
            "down"
        }

        async fn lookup(&self, _email: &str) -> Result<Vec<RawBreachEntry>, Error> {
            Err(CollaboratorError::unavailable("down", "connection refused").into())
        }
    }

    async fn setup() -> (Arc<MemoryStore>, BreachService<MemoryStore, MemoryStore>) {
        let store = MemoryStore::shared();
        store
            .find_or_create_by_email("ada@example.com")
            .await
            .unwrap();
        let service = BreachService::new(store.clone(), store.clone());
        (store, service)
    }

    #[tokio::test]
    async fn test_ingest_is_idempotent() {
        let (_store, service) = setup().await;
        let entries = vec![entry("Adobe", "Passwords"), entry("LinkedIn", "Email addresses")];

        let first = service
            .ingest("ada@example.com", "ada@example.com", entries.clone())
            .await
            .unwrap();
        let second = service
            .ingest("ada@example.com", "ada@example.com", entries)
            .await
            .unwrap();

        assert_eq!(first, 2);
        assert_eq!(second, 0);
        assert_eq!(service.list("ada@example.com").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_ingest_dedupes_within_batch() {
        let (_store, service) = setup().await;
        let inserted = service
            .ingest(
                "ada@example.com",
                "alt@example.com",
                vec![entry("Adobe", "Passwords"), entry("Adobe", "Names")],
            )
            .await
            .unwrap();
        assert_eq!(inserted, 1);

        let info = service.breach_info("ada@example.com").await.unwrap();
        assert_eq!(info[0].user_email, "alt@example.com");
        assert_eq!(info[0].leaked_data, vec!["passwords"]);
    }

    #[tokio::test]
    async fn test_ingest_requires_owner() {
        let (_store, service) = setup().await;
        let err = service
            .ingest(
                "ghost@example.com",
                "ghost@example.com",
                vec![entry("A", "")],
            )
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_ingest_rejects_nameless_entry() {
        let (_store, service) = setup().await;
        let err = service
            .ingest(
                "ada@example.com",
                "ada@example.com",
                vec![entry("", "Passwords")],
            )
            .await
            .unwrap_err();
        assert!(err.is_validation_error());
    }

    #[tokio::test]
    async fn test_fetch_and_ingest() {
        let (store, _) = setup().await;
        let service = BreachService::new(store.clone(), store.clone())
            .with_lookup(Arc::new(FixedLookup(vec![entry("Canva", "Names;Passwords")])));

        let inserted = service
            .fetch_and_ingest("ada@example.com", "ada@example.com")
            .await
            .unwrap();
        assert_eq!(inserted, 1);
    }

    #[tokio::test]
    async fn test_fetch_and_ingest_collaborator_failure() {
        let (store, service) = setup().await;

        let err = service
            .fetch_and_ingest("ada@example.com", "ada@example.com")
            .await
            .unwrap_err();
        assert!(err.is_collaborator_error());

        let service = BreachService::new(store.clone(), store).with_lookup(Arc::new(DownLookup));
        let err = service
            .fetch_and_ingest("ada@example.com", "ada@example.com")
            .await
            .unwrap_err();
        assert!(err.is_collaborator_error());
    }
}
