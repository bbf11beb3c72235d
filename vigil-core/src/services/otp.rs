use crate::{
    Error,
    credential::{Credential, DEFAULT_CREDENTIAL_TTL_DAYS, JwtConfig},
    error::AuthError,
    lookup::CodeDelivery,
    otp::{ChallengeReceipt, DEFAULT_OTP_TTL_MINUTES, OtpChallenge},
    repositories::{ChallengeRepository, UserRepository},
    validation::{validate_code_format, validate_email},
};
use chrono::{Duration, Utc};
use std::sync::Arc;

/// Service for passwordless sign-in with one-time codes
///
/// Each user moves through `no challenge -> pending -> consumed | expired`. Requesting a code
/// always replaces the pending one; verifying consumes it, so a code works at most once.
pub struct OtpService<U: UserRepository, C: ChallengeRepository> {
    user_repository: Arc<U>,
    challenge_repository: Arc<C>,
    delivery: Option<Arc<dyn CodeDelivery>>,
    jwt_config: JwtConfig,
    otp_ttl: Duration,
    credential_ttl: Duration,
}

impl<U: UserRepository, C: ChallengeRepository> OtpService<U, C> {
    pub fn new(
        user_repository: Arc<U>,
        challenge_repository: Arc<C>,
        jwt_config: JwtConfig,
    ) -> Self {
        Self {
            user_repository,
            challenge_repository,
            delivery: None,
            jwt_config,
            otp_ttl: Duration::minutes(DEFAULT_OTP_TTL_MINUTES),
            credential_ttl: Duration::days(DEFAULT_CREDENTIAL_TTL_DAYS),
        }
    }

    pub fn with_delivery(mut self, delivery: Arc<dyn CodeDelivery>) -> Self {
        self.delivery = Some(delivery);
        self
    }

    pub fn with_otp_ttl(mut self, ttl: Duration) -> Self {
        self.otp_ttl = ttl;
        self
    }

    pub fn with_credential_ttl(mut self, ttl: Duration) -> Self {
        self.credential_ttl = ttl;
        self
    }

    /// Issue a fresh code for `email`, creating the user on first contact.
    ///
    /// The challenge is stored before delivery is attempted and is kept when delivery fails;
    /// the receipt's `delivered` flag reports the outcome.
    pub async fn request_challenge(&self, email: &str) -> Result<ChallengeReceipt, Error> {
        validate_email(email)?;

        let user = self.user_repository.find_or_create_by_email(email).await?;
        let challenge = OtpChallenge::generate(self.otp_ttl);
        self.challenge_repository
            .set_challenge(&user.id, &challenge)
            .await?;

        let delivered = match &self.delivery {
            Some(delivery) => match delivery
                .deliver_code(email, &challenge.code, self.otp_ttl.num_minutes())
                .await
            {
                Ok(()) => true,
                Err(e) => {
                    tracing::error!(
                        user_id = %user.id,
                        error = %e,
                        "Failed to deliver one-time code"
                    );
                    false
                }
            },
            None => {
                tracing::warn!(
                    user_id = %user.id,
                    "No code delivery configured; one-time code was not sent"
                );
                false
            }
        };

        tracing::info!(user_id = %user.id, delivered, "Issued one-time code challenge");

        Ok(ChallengeReceipt {
            user_id: user.id,
            email: email.to_string(),
            expires_at: challenge.expires_at,
            delivered,
        })
    }

    /// Consume the pending challenge and mint a credential bound to `email`.
    pub async fn verify_challenge(&self, email: &str, code: &str) -> Result<Credential, Error> {
        validate_email(email)?;
        validate_code_format(code)?;

        let user = self
            .user_repository
            .find_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let now = Utc::now();
        let challenge = self
            .challenge_repository
            .find_challenge(&user.id)
            .await?
            .ok_or(AuthError::InvalidOrExpiredCode)?;

        if !challenge.accepts(code, now) {
            tracing::debug!(
                user_id = %user.id,
                expired = challenge.is_expired(now),
                "Rejected one-time code"
            );
            return Err(AuthError::InvalidOrExpiredCode.into());
        }

        // A concurrent verifier may have consumed it between the read and here.
        if !self
            .challenge_repository
            .consume_challenge(&user.id, code, now)
            .await?
        {
            return Err(AuthError::InvalidOrExpiredCode.into());
        }

        let credential = Credential::issue(email, self.credential_ttl, &self.jwt_config)?;
        tracing::info!(user_id = %user.id, "Verified one-time code");

        Ok(credential)
    }
}
