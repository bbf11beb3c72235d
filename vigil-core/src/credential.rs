//! Signed bearer credentials
//!
//! A [`Credential`] is a JWT whose subject is the user's email. It is issued once per successful
//! code verification and has an absolute expiry; there is no refresh.

use std::path::Path;

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    error::{SessionError, ValidationError},
};

/// Days a credential stays valid after issuance.
pub const DEFAULT_CREDENTIAL_TTL_DAYS: i64 = 7;

/// Shortest HS256 secret we accept.
pub const MIN_SECRET_LENGTH: usize = 32;

/// JWT algorithm type
#[derive(Debug, Clone)]
pub enum JwtAlgorithm {
    /// RS256 - RSA with SHA-256
    RS256 {
        /// Private key for signing JWTs (PEM format)
        private_key: Vec<u8>,
        /// Public key for verifying JWTs (PEM format)
        public_key: Vec<u8>,
    },
    /// HS256 - HMAC with SHA-256
    HS256 {
        /// Secret key for both signing and verifying
        secret_key: Vec<u8>,
    },
}

/// Signing configuration for credentials
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub algorithm: JwtAlgorithm,
    /// Issuer claim, written on issue and required on verify when set
    pub issuer: Option<String>,
}

impl JwtConfig {
    pub fn new_rs256(private_key: Vec<u8>, public_key: Vec<u8>) -> Self {
        Self {
            algorithm: JwtAlgorithm::RS256 {
                private_key,
                public_key,
            },
            issuer: None,
        }
    }

    pub fn new_hs256(secret_key: Vec<u8>) -> Self {
        Self {
            algorithm: JwtAlgorithm::HS256 { secret_key },
            issuer: None,
        }
    }

    /// HS256 configuration from a shared secret, rejecting secrets that are too short.
    pub fn from_secret(secret: &str) -> Result<Self, Error> {
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(ValidationError::InvalidField(format!(
                "JWT secret must be at least {MIN_SECRET_LENGTH} bytes"
            ))
            .into());
        }
        Ok(Self::new_hs256(secret.as_bytes().to_vec()))
    }

    /// Create a new JWT configuration from RSA key files (PEM format)
    pub fn from_rs256_pem_files(
        private_key_path: impl AsRef<Path>,
        public_key_path: impl AsRef<Path>,
    ) -> Result<Self, Error> {
        use std::fs::read;

        let private_key = read(private_key_path).map_err(|e| {
            ValidationError::InvalidField(format!("Failed to read private key file: {e}"))
        })?;

        let public_key = read(public_key_path).map_err(|e| {
            ValidationError::InvalidField(format!("Failed to read public key file: {e}"))
        })?;

        Ok(Self::new_rs256(private_key, public_key))
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn jwt_algorithm(&self) -> Algorithm {
        match &self.algorithm {
            JwtAlgorithm::RS256 { .. } => Algorithm::RS256,
            JwtAlgorithm::HS256 { .. } => Algorithm::HS256,
        }
    }

    pub fn get_encoding_key(&self) -> Result<EncodingKey, Error> {
        match &self.algorithm {
            JwtAlgorithm::RS256 { private_key, .. } => EncodingKey::from_rsa_pem(private_key)
                .map_err(|e| {
                    ValidationError::InvalidField(format!("Invalid RSA private key: {e}")).into()
                }),
            JwtAlgorithm::HS256 { secret_key } => Ok(EncodingKey::from_secret(secret_key)),
        }
    }

    pub fn get_decoding_key(&self) -> Result<DecodingKey, Error> {
        match &self.algorithm {
            JwtAlgorithm::RS256 { public_key, .. } => DecodingKey::from_rsa_pem(public_key)
                .map_err(|e| {
                    ValidationError::InvalidField(format!("Invalid RSA public key: {e}")).into()
                }),
            JwtAlgorithm::HS256 { secret_key } => Ok(DecodingKey::from_secret(secret_key)),
        }
    }

    /// Expiry is checked with zero leeway so the window is exactly what was issued.
    pub fn get_validation(&self) -> Validation {
        let mut validation = Validation::new(self.jwt_algorithm());
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }
        validation
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialClaims {
    /// Subject - the user's email
    pub sub: String,
    /// Issued at in seconds (as UTC timestamp)
    pub iat: i64,
    /// Expiration time in seconds (as UTC timestamp)
    pub exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Opaque bearer credential as handed to clients
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Sign a credential for `email` that expires `ttl` from now.
    pub fn issue(email: &str, ttl: Duration, config: &JwtConfig) -> Result<Self, Error> {
        let now = Utc::now();
        let claims = CredentialClaims {
            sub: email.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            iss: config.issuer.clone(),
        };

        let header = Header::new(config.jwt_algorithm());
        let encoding_key = config.get_encoding_key()?;
        let token = encode(&header, &claims, &encoding_key)
            .map_err(|e| SessionError::InvalidToken(format!("Failed to encode JWT: {e}")))?;

        Ok(Self(token))
    }

    /// Check signature and expiry and return the claims.
    pub fn verify(&self, config: &JwtConfig) -> Result<CredentialClaims, Error> {
        let decoding_key = config.get_decoding_key()?;
        let validation = config.get_validation();

        let data = decode::<CredentialClaims>(&self.0, &decoding_key, &validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => SessionError::Expired,
                _ => SessionError::InvalidToken(format!("JWT validation failed: {e}")),
            },
        )?;

        Ok(data.claims)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for Credential {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Credential {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
