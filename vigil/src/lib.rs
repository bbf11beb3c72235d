//! # Vigil
//!
//! Vigil turns external security verdicts into a per-user security score. It owns three
//! things:
//!
//! - passwordless sign-in: a one-time code is mailed to an address and exchanged for a
//!   signed, time-boxed credential;
//! - a registry of device sessions, one per `(user, fingerprint)`;
//! - ingestion of breach exposures, site reputation checks and password ratings, and the
//!   breach, website, password and overall scores computed from them.
//!
//! ## Storage Support
//!
//! SQLite, through the `vigil-storage-sqlite` crate (feature `sqlite`, on by default). Any
//! type implementing [`RepositoryProvider`] can be used instead.
//!
//! ## Example
//!
//! ```rust,no_run
//! use vigil::{JwtConfig, VigilBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let vigil = VigilBuilder::new()
//!         .with_sqlite("sqlite::memory:")
//!         .await?
//!         .with_jwt(JwtConfig::from_secret("a secret that is at least 32 bytes long")?)
//!         .apply_migrations(true)
//!         .build()
//!         .await?;
//!
//!     vigil.request_challenge("alice@example.com").await?;
//!     let score = vigil.overall_score("alice@example.com").await?;
//!     println!("overall score: {score}");
//!     Ok(())
//! }
//! ```
use std::sync::Arc;

use vigil_core::{
    SessionCache,
    repositories::{
        BreachRepositoryAdapter, ChallengeRepositoryAdapter, PasswordRatingRepositoryAdapter,
        SessionRepositoryAdapter, SiteCheckRepositoryAdapter, UserRepositoryAdapter,
    },
    services::{
        BreachService, OtpService, PasswordRatingService, ScoreService, SessionService,
        SiteCheckService, UserService,
    },
};

pub mod builder;
pub mod config;
mod error;

pub use builder::{NoStorage, VigilBuilder, WithStorage};
pub use config::VigilConfig;
pub use error::VigilError;

/// Re-export core types from vigil_core
///
/// These types are commonly used when working with the Vigil API.
pub use vigil_core::{
    BreachInfo, BreachLookup, BreachSignal, ChallengeReceipt, CodeDelivery, Credential,
    CredentialClaims, DeviceSession, JwtAlgorithm, JwtConfig, PasswordRating, RatingScale,
    RawBreachEntry, ReputationLookup, Score, SessionMatch, SiteCheck, SiteCheckReport,
    SiteVerdict, User, UserId, UserProfile, repositories::RepositoryProvider,
    services::ScoreCard,
};

/// Re-export storage backends
#[cfg(feature = "sqlite")]
pub use vigil_storage_sqlite::SqliteRepositoryProvider;

#[cfg(feature = "mailer")]
pub use vigil_core::services::MailerCodeDelivery;
#[cfg(feature = "mailer")]
pub use vigil_mailer::MailerConfig;

#[cfg(feature = "lookup")]
pub use vigil_lookup::{LookupConfig, VirusTotalClient, XposedOrNotClient};

type Users<R> = UserRepositoryAdapter<R>;

/// The facade over every vigil service, sharing one repository provider.
///
/// Build it with [`VigilBuilder`]. All methods take `&self`, so wrap it in an `Arc` to share
/// it between tasks.
pub struct Vigil<R: RepositoryProvider> {
    repositories: Arc<R>,
    user_service: Arc<UserService<Users<R>>>,
    otp_service: Arc<OtpService<Users<R>, ChallengeRepositoryAdapter<R>>>,
    session_service: Arc<SessionService<Users<R>, SessionRepositoryAdapter<R>>>,
    breach_service: Arc<BreachService<Users<R>, BreachRepositoryAdapter<R>>>,
    site_check_service: Arc<SiteCheckService<Users<R>, SiteCheckRepositoryAdapter<R>>>,
    password_rating_service:
        Arc<PasswordRatingService<Users<R>, PasswordRatingRepositoryAdapter<R>>>,
    score_service: Arc<
        ScoreService<
            Users<R>,
            BreachRepositoryAdapter<R>,
            SiteCheckRepositoryAdapter<R>,
            PasswordRatingRepositoryAdapter<R>,
        >,
    >,
}

impl<R: RepositoryProvider> Vigil<R> {
    pub(crate) fn from_builder(repositories: Arc<R>, options: builder::Options) -> Self {
        let user_repo = Arc::new(UserRepositoryAdapter::new(repositories.clone()));
        let breach_repo = Arc::new(BreachRepositoryAdapter::new(repositories.clone()));
        let site_check_repo = Arc::new(SiteCheckRepositoryAdapter::new(repositories.clone()));
        let rating_repo = Arc::new(PasswordRatingRepositoryAdapter::new(repositories.clone()));

        let mut otp_service = OtpService::new(
            user_repo.clone(),
            Arc::new(ChallengeRepositoryAdapter::new(repositories.clone())),
            options.jwt_config.clone(),
        )
        .with_otp_ttl(options.otp_ttl)
        .with_credential_ttl(options.credential_ttl);
        if let Some(delivery) = options.delivery {
            otp_service = otp_service.with_delivery(delivery);
        }

        let session_service = SessionService::new(
            user_repo.clone(),
            Arc::new(SessionRepositoryAdapter::new(repositories.clone())),
            options.jwt_config,
        )
        .with_cache(Arc::new(SessionCache::new()));

        let mut breach_service = BreachService::new(user_repo.clone(), breach_repo.clone());
        if let Some(lookup) = options.breach_lookup {
            breach_service = breach_service.with_lookup(lookup);
        }

        let mut site_check_service =
            SiteCheckService::new(user_repo.clone(), site_check_repo.clone());
        if let Some(lookup) = options.reputation_lookup {
            site_check_service = site_check_service.with_lookup(lookup);
        }

        let score_service = ScoreService::new(
            user_repo.clone(),
            breach_repo,
            site_check_repo,
            rating_repo.clone(),
        )
        .with_timeout(options.score_timeout);

        Self {
            repositories,
            user_service: Arc::new(UserService::new(user_repo.clone())),
            otp_service: Arc::new(otp_service),
            session_service: Arc::new(session_service),
            breach_service: Arc::new(breach_service),
            site_check_service: Arc::new(site_check_service),
            password_rating_service: Arc::new(PasswordRatingService::new(user_repo, rating_repo)),
            score_service: Arc::new(score_service),
        }
    }

    /// Run migrations for all repositories
    pub async fn migrate(&self) -> Result<(), VigilError> {
        Ok(self.repositories.migrate().await?)
    }

    /// Health check for all repositories
    pub async fn health_check(&self) -> Result<(), VigilError> {
        Ok(self.repositories.health_check().await?)
    }

    /// Rebuild the in-process session cache from storage. Returns how many users are cached.
    pub async fn warm_cache(&self) -> Result<usize, VigilError> {
        Ok(self.session_service.warm_cache().await?)
    }

    // ------------------------------------------------------------------
    // Identity
    // ------------------------------------------------------------------

    pub async fn find_or_create_user(&self, email: &str) -> Result<User, VigilError> {
        Ok(self.user_service.find_or_create(email).await?)
    }

    pub async fn get_user(&self, email: &str) -> Result<User, VigilError> {
        Ok(self.user_service.get(email).await?)
    }

    pub async fn update_name(&self, email: &str, name: &str) -> Result<User, VigilError> {
        Ok(self.user_service.update_name(email, name).await?)
    }

    /// The `{name, email}` view of a user
    pub async fn get_profile(&self, email: &str) -> Result<UserProfile, VigilError> {
        Ok(self.user_service.profile(email).await?)
    }

    // ------------------------------------------------------------------
    // One-time codes
    // ------------------------------------------------------------------

    /// Issue a fresh one-time code for `email` and hand it to the delivery channel.
    ///
    /// The user is created on first contact. A delivery failure does not undo the challenge;
    /// check [`ChallengeReceipt::delivered`].
    pub async fn request_challenge(&self, email: &str) -> Result<ChallengeReceipt, VigilError> {
        Ok(self.otp_service.request_challenge(email).await?)
    }

    /// Exchange a one-time code for a credential. Each code works once.
    pub async fn verify_challenge(
        &self,
        email: &str,
        code: &str,
    ) -> Result<Credential, VigilError> {
        Ok(self.otp_service.verify_challenge(email, code).await?)
    }

    /// Check a credential's signature and expiry and return its claims.
    pub fn verify_credential(&self, credential: &str) -> Result<CredentialClaims, VigilError> {
        Ok(self
            .session_service
            .verify_credential(&Credential::new(credential))?)
    }

    // ------------------------------------------------------------------
    // Sessions
    // ------------------------------------------------------------------

    /// Record `credential` as the session for `fingerprint`, replacing any older one.
    pub async fn add_session(
        &self,
        email: &str,
        credential: &str,
        fingerprint: &str,
    ) -> Result<DeviceSession, VigilError> {
        Ok(self
            .session_service
            .add_session(email, Credential::new(credential), fingerprint)
            .await?)
    }

    pub async fn remove_session(&self, email: &str, fingerprint: &str) -> Result<(), VigilError> {
        Ok(self
            .session_service
            .remove_session(email, fingerprint)
            .await?)
    }

    pub async fn find_session_by_fingerprint(
        &self,
        fingerprint: &str,
    ) -> Result<Option<SessionMatch>, VigilError> {
        Ok(self.session_service.find_by_fingerprint(fingerprint).await?)
    }

    pub async fn latest_session(&self, email: &str) -> Result<Option<DeviceSession>, VigilError> {
        Ok(self.session_service.latest_session(email).await?)
    }

    pub async fn list_sessions(&self, email: &str) -> Result<Vec<DeviceSession>, VigilError> {
        Ok(self.session_service.list_sessions(email).await?)
    }

    // ------------------------------------------------------------------
    // Signal ingest
    // ------------------------------------------------------------------

    /// Store breach entries for `target_email` under `owner_email`. Returns how many were new.
    pub async fn ingest_breaches(
        &self,
        owner_email: &str,
        target_email: &str,
        entries: Vec<RawBreachEntry>,
    ) -> Result<u64, VigilError> {
        Ok(self
            .breach_service
            .ingest(owner_email, target_email, entries)
            .await?)
    }

    /// Ask the breach lookup about `target_email`, then ingest what it reports.
    pub async fn fetch_and_ingest_breaches(
        &self,
        owner_email: &str,
        target_email: &str,
    ) -> Result<u64, VigilError> {
        Ok(self
            .breach_service
            .fetch_and_ingest(owner_email, target_email)
            .await?)
    }

    pub async fn breach_info(&self, owner_email: &str) -> Result<Vec<BreachInfo>, VigilError> {
        Ok(self.breach_service.breach_info(owner_email).await?)
    }

    pub async fn ingest_site_check(
        &self,
        owner_email: &str,
        report: SiteCheckReport,
    ) -> Result<SiteCheck, VigilError> {
        Ok(self.site_check_service.ingest(owner_email, report).await?)
    }

    /// Ask the reputation lookup about `domain`, then ingest the verdict.
    pub async fn check_site(
        &self,
        owner_email: &str,
        domain: &str,
    ) -> Result<SiteCheck, VigilError> {
        Ok(self
            .site_check_service
            .check_site(owner_email, domain)
            .await?)
    }

    pub async fn malicious_sites(&self, owner_email: &str) -> Result<Vec<SiteCheck>, VigilError> {
        Ok(self.site_check_service.malicious_sites(owner_email).await?)
    }

    pub async fn ingest_password_rating(
        &self,
        owner_email: &str,
        domain: &str,
        raw_rating: f64,
        scale: RatingScale,
    ) -> Result<PasswordRating, VigilError> {
        Ok(self
            .password_rating_service
            .ingest(owner_email, domain, raw_rating, scale)
            .await?)
    }

    pub async fn password_ratings(
        &self,
        owner_email: &str,
    ) -> Result<Vec<PasswordRating>, VigilError> {
        Ok(self.password_rating_service.list(owner_email).await?)
    }

    // ------------------------------------------------------------------
    // Scores
    // ------------------------------------------------------------------

    pub async fn breach_score(&self, email: &str) -> Result<Score, VigilError> {
        Ok(self.score_service.breach_score(email).await?)
    }

    pub async fn website_score(&self, email: &str) -> Result<Score, VigilError> {
        Ok(self.score_service.website_score(email).await?)
    }

    pub async fn password_score(&self, email: &str) -> Result<Score, VigilError> {
        Ok(self.score_service.password_score(email).await?)
    }

    /// Weighted 40/30/30 combination of the three sub-scores.
    ///
    /// A sub-score that fails or times out counts as 100, so only an unknown user is an error.
    pub async fn overall_score(&self, email: &str) -> Result<Score, VigilError> {
        Ok(self.score_service.overall_score(email).await?)
    }

    pub async fn score_card(&self, email: &str) -> Result<ScoreCard, VigilError> {
        Ok(self.score_service.score_card(email).await?)
    }
}
