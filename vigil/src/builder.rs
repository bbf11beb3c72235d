//! Builder pattern for constructing Vigil instances
//!
//! The builder is type-state: storage has to be configured before [`VigilBuilder::build`]
//! becomes available.
//!
//! # Example
//!
//! ```rust,no_run
//! use vigil::{JwtConfig, VigilBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let vigil = VigilBuilder::new()
//!         .with_sqlite("sqlite://vigil.db?mode=rwc")
//!         .await?
//!         .with_jwt(JwtConfig::from_secret("a secret that is at least 32 bytes long")?)
//!         .apply_migrations(true)
//!         .warm_cache(true)
//!         .build()
//!         .await?;
//!
//!     vigil.health_check().await?;
//!     Ok(())
//! }
//! ```

use std::{sync::Arc, time::Duration};

use vigil_core::{
    BreachLookup, CodeDelivery, JwtConfig, ReputationLookup,
    credential::DEFAULT_CREDENTIAL_TTL_DAYS, otp::DEFAULT_OTP_TTL_MINUTES,
    repositories::RepositoryProvider, services::DEFAULT_SUBSCORE_TIMEOUT,
};

use crate::{Vigil, VigilConfig, VigilError};

#[cfg(feature = "mailer")]
use crate::MailerConfig;

#[cfg(feature = "lookup")]
use crate::LookupConfig;

// ============================================================================
// Type-State Markers
// ============================================================================

/// Marker type indicating no storage has been configured yet.
pub struct NoStorage;

/// Marker type indicating storage has been configured.
pub struct WithStorage<R: RepositoryProvider> {
    repositories: Arc<R>,
}

/// Everything besides storage that goes into a [`Vigil`].
pub(crate) struct Options {
    pub(crate) jwt_config: JwtConfig,
    pub(crate) otp_ttl: chrono::Duration,
    pub(crate) credential_ttl: chrono::Duration,
    pub(crate) score_timeout: Duration,
    pub(crate) delivery: Option<Arc<dyn CodeDelivery>>,
    pub(crate) breach_lookup: Option<Arc<dyn BreachLookup>>,
    pub(crate) reputation_lookup: Option<Arc<dyn ReputationLookup>>,
}

struct Settings {
    jwt_config: Option<JwtConfig>,
    otp_ttl: chrono::Duration,
    credential_ttl: chrono::Duration,
    score_timeout: Duration,
    delivery: Option<Arc<dyn CodeDelivery>>,
    breach_lookup: Option<Arc<dyn BreachLookup>>,
    reputation_lookup: Option<Arc<dyn ReputationLookup>>,
    apply_migrations: bool,
    warm_cache: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            jwt_config: None,
            otp_ttl: chrono::Duration::minutes(DEFAULT_OTP_TTL_MINUTES),
            credential_ttl: chrono::Duration::days(DEFAULT_CREDENTIAL_TTL_DAYS),
            score_timeout: DEFAULT_SUBSCORE_TIMEOUT,
            delivery: None,
            breach_lookup: None,
            reputation_lookup: None,
            apply_migrations: false,
            warm_cache: false,
        }
    }
}

// ============================================================================
// Builder Implementation
// ============================================================================

/// A type-safe builder for constructing [`Vigil`] instances.
///
/// # Defaults
///
/// - One-time codes live 15 minutes, credentials 7 days
/// - Each sub-score read is bounded by 5 seconds
/// - No code delivery and no lookups: codes are only logged as undelivered, and the
///   fetch/check operations fail as unavailable
/// - Migrations and cache warming are off
pub struct VigilBuilder<Storage> {
    storage: Storage,
    settings: Settings,
}

impl Default for VigilBuilder<NoStorage> {
    fn default() -> Self {
        Self::new()
    }
}

impl VigilBuilder<NoStorage> {
    pub fn new() -> Self {
        Self {
            storage: NoStorage,
            settings: Settings::default(),
        }
    }

    /// Use an existing repository provider.
    pub fn with_repositories<R: RepositoryProvider>(
        self,
        repositories: Arc<R>,
    ) -> VigilBuilder<WithStorage<R>> {
        VigilBuilder {
            storage: WithStorage { repositories },
            settings: self.settings,
        }
    }
}

#[cfg(feature = "sqlite")]
impl VigilBuilder<NoStorage> {
    /// Configure SQLite storage by connecting to the given URL.
    ///
    /// The database file is created when it does not exist.
    pub async fn with_sqlite(
        self,
        url: &str,
    ) -> Result<VigilBuilder<WithStorage<crate::SqliteRepositoryProvider>>, VigilError> {
        let repositories = crate::SqliteRepositoryProvider::connect(url).await?;
        Ok(self.with_repositories(Arc::new(repositories)))
    }

    /// Configure SQLite storage with an existing connection pool.
    pub fn with_sqlite_pool(
        self,
        pool: sqlx::SqlitePool,
    ) -> VigilBuilder<WithStorage<crate::SqliteRepositoryProvider>> {
        self.with_repositories(Arc::new(crate::SqliteRepositoryProvider::new(pool)))
    }
}

impl<Storage> VigilBuilder<Storage> {
    /// Signing configuration for issued credentials. Required.
    pub fn with_jwt(mut self, config: JwtConfig) -> Self {
        self.settings.jwt_config = Some(config);
        self
    }

    /// Apply signing settings and lifetimes from a [`VigilConfig`].
    ///
    /// The database URL is not used here; pass it to the storage method.
    pub fn with_config(mut self, config: &VigilConfig) -> Result<Self, VigilError> {
        self.settings.jwt_config = Some(config.jwt_config()?);
        self.settings.otp_ttl = config.otp_ttl;
        self.settings.credential_ttl = config.credential_ttl;
        self.settings.score_timeout = config.collaborator_timeout;
        Ok(self)
    }

    pub fn with_otp_ttl(mut self, ttl: chrono::Duration) -> Self {
        self.settings.otp_ttl = ttl;
        self
    }

    pub fn with_credential_ttl(mut self, ttl: chrono::Duration) -> Self {
        self.settings.credential_ttl = ttl;
        self
    }

    /// Bound on each sub-score read when computing the overall score.
    pub fn with_score_timeout(mut self, timeout: Duration) -> Self {
        self.settings.score_timeout = timeout;
        self
    }

    pub fn with_delivery(mut self, delivery: Arc<dyn CodeDelivery>) -> Self {
        self.settings.delivery = Some(delivery);
        self
    }

    pub fn with_breach_lookup(mut self, lookup: Arc<dyn BreachLookup>) -> Self {
        self.settings.breach_lookup = Some(lookup);
        self
    }

    pub fn with_reputation_lookup(mut self, lookup: Arc<dyn ReputationLookup>) -> Self {
        self.settings.reputation_lookup = Some(lookup);
        self
    }

    /// Configure whether to run migrations during [`VigilBuilder::build`].
    pub fn apply_migrations(mut self, apply: bool) -> Self {
        self.settings.apply_migrations = apply;
        self
    }

    /// Configure whether to rebuild the session cache from storage during build.
    pub fn warm_cache(mut self, warm: bool) -> Self {
        self.settings.warm_cache = warm;
        self
    }

    /// Deliver one-time codes by email.
    #[cfg(feature = "mailer")]
    pub fn with_mailer(mut self, config: MailerConfig) -> Result<Self, VigilError> {
        let delivery = crate::MailerCodeDelivery::new(config)
            .map_err(|e| VigilError::Config(e.to_string()))?;
        self.settings.delivery = Some(Arc::new(delivery));
        Ok(self)
    }

    /// Configure the mailer from environment variables.
    ///
    /// See [`MailerConfig::from_env`] for the variables read.
    #[cfg(feature = "mailer")]
    pub fn with_mailer_from_env(self) -> Result<Self, VigilError> {
        let config = MailerConfig::from_env().map_err(|e| VigilError::Config(e.to_string()))?;
        self.with_mailer(config)
    }

    /// Use the HTTP breach lookup, and the reputation lookup when an API key is configured.
    #[cfg(feature = "lookup")]
    pub fn with_lookups(mut self, config: &LookupConfig) -> Result<Self, VigilError> {
        let breaches = config
            .breach_lookup()
            .map_err(|e| VigilError::Config(e.to_string()))?;
        self.settings.breach_lookup = Some(Arc::new(breaches));

        match config.reputation_lookup() {
            Some(Ok(client)) => self.settings.reputation_lookup = Some(Arc::new(client)),
            Some(Err(e)) => return Err(VigilError::Config(e.to_string())),
            None => tracing::info!("No reputation API key configured; site checks need a verdict"),
        }
        Ok(self)
    }
}

impl<R: RepositoryProvider> VigilBuilder<WithStorage<R>> {
    /// Build the Vigil instance.
    ///
    /// Fails when no JWT configuration was given, or when requested migrations or cache
    /// warming fail.
    pub async fn build(self) -> Result<Vigil<R>, VigilError> {
        let settings = self.settings;
        let jwt_config = settings.jwt_config.ok_or_else(|| {
            VigilError::Config("A JWT configuration is required".to_string())
        })?;

        if settings.apply_migrations {
            self.storage.repositories.migrate().await?;
        }

        if settings.delivery.is_none() {
            tracing::warn!("No code delivery configured; one-time codes will not be sent");
        }

        let vigil = Vigil::from_builder(
            self.storage.repositories,
            Options {
                jwt_config,
                otp_ttl: settings.otp_ttl,
                credential_ttl: settings.credential_ttl,
                score_timeout: settings.score_timeout,
                delivery: settings.delivery,
                breach_lookup: settings.breach_lookup,
                reputation_lookup: settings.reputation_lookup,
            },
        );

        if settings.warm_cache {
            let cached = vigil.warm_cache().await?;
            tracing::info!(cached, "Warmed session cache");
        }

        Ok(vigil)
    }
}
