use crate::{
    Error, User,
    error::{AuthError, CollaboratorError},
    lookup::ReputationLookup,
    repositories::{SiteCheckRepository, UserRepository},
    signal::{SiteCheck, SiteCheckReport},
    validation::{normalize_domain, validate_email},
};
use std::sync::Arc;

/// Service for site reputation checks
///
/// Every check is kept as history. Unlike the other signals, the owner is created on first
/// contact, since the browser extension reports visits before the user ever signs in.
pub struct SiteCheckService<U: UserRepository, S: SiteCheckRepository> {
    user_repository: Arc<U>,
    site_check_repository: Arc<S>,
    lookup: Option<Arc<dyn ReputationLookup>>,
}

impl<U: UserRepository, S: SiteCheckRepository> SiteCheckService<U, S> {
    pub fn new(user_repository: Arc<U>, site_check_repository: Arc<S>) -> Self {
        Self {
            user_repository,
            site_check_repository,
            lookup: None,
        }
    }

    pub fn with_lookup(mut self, lookup: Arc<dyn ReputationLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Append a check reported by a client.
    pub async fn ingest(
        &self,
        owner_email: &str,
        report: SiteCheckReport,
    ) -> Result<SiteCheck, Error> {
        validate_email(owner_email)?;
        let (domain, verdict) = report.validate()?;

        let owner = self
            .user_repository
            .find_or_create_by_email(owner_email)
            .await?;
        let check = self
            .site_check_repository
            .append(SiteCheck::new(&owner.id, domain, verdict))
            .await?;

        tracing::info!(
            user_id = %owner.id,
            domain = %check.domain,
            malicious = check.malicious,
            "Recorded site check"
        );
        Ok(check)
    }

    /// Look `domain` up with the reputation collaborator and record the verdict.
    pub async fn check_site(&self, owner_email: &str, domain: &str) -> Result<SiteCheck, Error> {
        validate_email(owner_email)?;
        let domain = normalize_domain(domain)?;

        let lookup = self.lookup.as_ref().ok_or_else(|| {
            CollaboratorError::unavailable("reputation lookup", "no reputation lookup configured")
        })?;

        let verdict = lookup.check_domain(&domain).await.map_err(|e| {
            tracing::error!(
                service = lookup.name(),
                domain = %domain,
                error = %e,
                "Reputation lookup failed"
            );
            e
        })?;

        self.ingest(owner_email, SiteCheckReport::new(domain, verdict))
            .await
    }

    pub async fn list(&self, owner_email: &str) -> Result<Vec<SiteCheck>, Error> {
        let owner = self.owner(owner_email).await?;
        self.site_check_repository.list_for_user(&owner.id).await
    }

    /// Malicious checks, newest first
    pub async fn malicious_sites(&self, owner_email: &str) -> Result<Vec<SiteCheck>, Error> {
        let owner = self.owner(owner_email).await?;
        self.site_check_repository.list_malicious(&owner.id).await
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
    use crate::{signal::SiteVerdict, testing::MemoryStore};
    use async_trait::async_trait;

    fn report(domain: &str, malicious: bool, total_sources: i64) -> SiteCheckReport {
        SiteCheckReport {
            domain: Some(domain.to_string()),
            malicious: Some(malicious),
            source: malicious.then(|| "VirusTotal (5 detections)".to_string()),
            total_sources: Some(total_sources),
        }
    }

    struct AlwaysMalicious;

    #[async_trait]
    impl ReputationLookup for AlwaysMalicious {
        fn name(&self) -> &'static str {
            "always-malicious"
        }

        async fn check_domain(&self, _domain: &str) -> Result<SiteVerdict, Error> {
            Ok(SiteVerdict {
                malicious: true,
                source: Some("test".to_string()),
                total_sources: 70,
            })
        }
    }

    #[tokio::test]
    async fn test_ingest_creates_owner_and_appends() {
        let store = MemoryStore::shared();
        let service = SiteCheckService::new(store.clone(), store.clone());

        service
            .ingest("ada@example.com", report("evil.example", true, 90))
            .await
            .unwrap();
        service
            .ingest(
                "ada@example.com",
                report("https://www.evil.example/", true, 90),
            )
            .await
            .unwrap();

        let checks = service.list("ada@example.com").await.unwrap();
        assert_eq!(checks.len(), 2);
        assert!(checks.iter().all(|c| c.domain == "evil.example"));
    }

    #[tokio::test]
    async fn test_ingest_requires_fields() {
        let store = MemoryStore::shared();
        let service = SiteCheckService::new(store.clone(), store.clone());

        let err = service
            .ingest(
                "ada@example.com",
                SiteCheckReport {
                    domain: Some("example.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_validation_error());
        assert!(
            store
                .find_by_email("ada@example.com")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_malicious_sites() {
        let store = MemoryStore::shared();
        let service = SiteCheckService::new(store.clone(), store.clone());

        service
            .ingest("ada@example.com", report("good.example", false, 90))
            .await
            .unwrap();
        service
            .ingest("ada@example.com", report("bad.example", true, 90))
            .await
            .unwrap();

        let malicious = service.malicious_sites("ada@example.com").await.unwrap();
        assert_eq!(malicious.len(), 1);
        assert_eq!(malicious[0].domain, "bad.example");

        assert!(
            service
                .malicious_sites("ghost@example.com")
                .await
                .unwrap_err()
                .is_not_found()
        );
    }

    #[tokio::test]
    async fn test_check_site() {
        let store = MemoryStore::shared();
        let service = SiteCheckService::new(store.clone(), store.clone());
        assert!(
            service
                .check_site("ada@example.com", "bad.example")
                .await
                .unwrap_err()
                .is_collaborator_error()
        );

        let service = service.with_lookup(Arc::new(AlwaysMalicious));
        let check = service
            .check_site("ada@example.com", "http://Bad.Example/path")
            .await
            .unwrap();
        assert_eq!(check.domain, "bad.example");
        assert!(check.malicious);
        assert_eq!(check.total_sources, 70);
    }
}
