//! Environment configuration
//!
//! | Variable                          | Default                      |
//! | --------------------------------- | ---------------------------- |
//! | `VIGIL_JWT_SECRET`                | required, at least 32 bytes  |
//! | `VIGIL_JWT_PRIVATE_KEY_PATH`      | none                         |
//! | `VIGIL_JWT_PUBLIC_KEY_PATH`       | none                         |
//! | `VIGIL_JWT_ISSUER`                | none                         |
//! | `VIGIL_OTP_TTL_MINUTES`           | 15                           |
//! | `VIGIL_CREDENTIAL_TTL_DAYS`       | 7                            |
//! | `VIGIL_COLLABORATOR_TIMEOUT_SECS` | 5                            |
//! | `DATABASE_URL`                    | `sqlite://vigil.db?mode=rwc` |
//!
//! Setting both key paths switches credentials to RS256 with PEM keys read from disk, and
//! `VIGIL_JWT_SECRET` is then not needed.

use std::{path::PathBuf, str::FromStr, time::Duration};

use vigil_core::{
    JwtConfig,
    credential::DEFAULT_CREDENTIAL_TTL_DAYS,
    otp::DEFAULT_OTP_TTL_MINUTES,
    services::DEFAULT_SUBSCORE_TIMEOUT,
};

use crate::VigilError;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://vigil.db?mode=rwc";

/// Where credential signing keys come from
#[derive(Debug, Clone)]
pub enum JwtKeySource {
    /// HS256 shared secret
    Secret(String),
    /// RS256 key pair in PEM files
    RsaPemFiles {
        private_key: PathBuf,
        public_key: PathBuf,
    },
}

#[derive(Debug, Clone)]
pub struct VigilConfig {
    pub jwt_key: JwtKeySource,
    pub jwt_issuer: Option<String>,
    pub otp_ttl: chrono::Duration,
    pub credential_ttl: chrono::Duration,
    pub collaborator_timeout: Duration,
    pub database_url: String,
}

impl VigilConfig {
    /// Configuration with defaults for everything but the signing secret.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self::with_jwt_key(JwtKeySource::Secret(jwt_secret.into()))
    }

    /// Configuration that signs credentials with an RS256 key pair.
    pub fn with_rsa_key_files(
        private_key: impl Into<PathBuf>,
        public_key: impl Into<PathBuf>,
    ) -> Self {
        Self::with_jwt_key(JwtKeySource::RsaPemFiles {
            private_key: private_key.into(),
            public_key: public_key.into(),
        })
    }

    fn with_jwt_key(jwt_key: JwtKeySource) -> Self {
        Self {
            jwt_key,
            jwt_issuer: None,
            otp_ttl: chrono::Duration::minutes(DEFAULT_OTP_TTL_MINUTES),
            credential_ttl: chrono::Duration::days(DEFAULT_CREDENTIAL_TTL_DAYS),
            collaborator_timeout: DEFAULT_SUBSCORE_TIMEOUT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
        }
    }

    pub fn from_env() -> Result<Self, VigilError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, VigilError> {
        let mut config = match (
            lookup("VIGIL_JWT_PRIVATE_KEY_PATH"),
            lookup("VIGIL_JWT_PUBLIC_KEY_PATH"),
        ) {
            (Some(private_key), Some(public_key)) => {
                Self::with_rsa_key_files(private_key, public_key)
            }
            (None, None) => {
                let secret = lookup("VIGIL_JWT_SECRET").ok_or_else(|| {
                    VigilError::Config("VIGIL_JWT_SECRET is not set".to_string())
                })?;
                Self::new(secret)
            }
            _ => {
                return Err(VigilError::Config(
                    "VIGIL_JWT_PRIVATE_KEY_PATH and VIGIL_JWT_PUBLIC_KEY_PATH must be set together"
                        .to_string(),
                ));
            }
        };

        config.jwt_issuer = lookup("VIGIL_JWT_ISSUER").filter(|issuer| !issuer.is_empty());
        if let Some(minutes) = parse_var::<i64>(&lookup, "VIGIL_OTP_TTL_MINUTES")? {
            config.otp_ttl = chrono::Duration::minutes(positive("VIGIL_OTP_TTL_MINUTES", minutes)?);
        }
        if let Some(days) = parse_var::<i64>(&lookup, "VIGIL_CREDENTIAL_TTL_DAYS")? {
            config.credential_ttl =
                chrono::Duration::days(positive("VIGIL_CREDENTIAL_TTL_DAYS", days)?);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "VIGIL_COLLABORATOR_TIMEOUT_SECS")? {
            config.collaborator_timeout = Duration::from_secs(secs);
        }
        if let Some(url) = lookup("DATABASE_URL") {
            config.database_url = url;
        }

        Ok(config)
    }

    /// Load the signing keys. RSA keys are parsed here so a bad PEM fails at startup.
    pub fn jwt_config(&self) -> Result<JwtConfig, VigilError> {
        let config = match &self.jwt_key {
            JwtKeySource::Secret(secret) => JwtConfig::from_secret(secret),
            JwtKeySource::RsaPemFiles {
                private_key,
                public_key,
            } => JwtConfig::from_rs256_pem_files(private_key, public_key).and_then(|config| {
                config.get_encoding_key()?;
                config.get_decoding_key()?;
                Ok(config)
            }),
        }
        .map_err(|e| VigilError::Config(e.to_string()))?;

        Ok(match &self.jwt_issuer {
            Some(issuer) => config.with_issuer(issuer),
            None => config,
        })
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, VigilError> {
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|_| VigilError::Config(format!("{key} is not a number: {raw}")))
        })
        .transpose()
}

fn positive(key: &str, value: i64) -> Result<i64, VigilError> {
    if value > 0 {
        Ok(value)
    } else {
        Err(VigilError::Config(format!("{key} must be positive")))
    }
}
