use crate::{
    Error, User,
    error::AuthError,
    repositories::{
        BreachRepository, PasswordRatingRepository, SiteCheckRepository, UserRepository,
    },
    score::{self, Score},
    validation::validate_email,
};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::{future::Future, sync::Arc, time::Duration};

/// Default bound on each sub-score read during overall aggregation.
pub const DEFAULT_SUBSCORE_TIMEOUT: Duration = Duration::from_secs(5);

/// All four scores for one user
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub breach: Score,
    pub website: Score,
    pub password: Score,
    pub overall: Score,
}

/// Service for score aggregation
///
/// The individual scores propagate storage errors. The overall score never does: each
/// sub-score that fails or times out counts as a perfect 100.
pub struct ScoreService<U, B, S, P>
where
    U: UserRepository,
    B: BreachRepository,
    S: SiteCheckRepository,
    P: PasswordRatingRepository,
{
    user_repository: Arc<U>,
    breach_repository: Arc<B>,
    site_check_repository: Arc<S>,
    rating_repository: Arc<P>,
    timeout: Duration,
}

impl<U, B, S, P> ScoreService<U, B, S, P>
where
    U: UserRepository,
    B: BreachRepository,
    S: SiteCheckRepository,
    P: PasswordRatingRepository,
{
    pub fn new(
        user_repository: Arc<U>,
        breach_repository: Arc<B>,
        site_check_repository: Arc<S>,
        rating_repository: Arc<P>,
    ) -> Self {
        Self {
            user_repository,
            breach_repository,
            site_check_repository,
            rating_repository,
            timeout: DEFAULT_SUBSCORE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn breach_score(&self, email: &str) -> Result<Score, Error> {
        let user = self.user(email).await?;
        self.breach_for(&user).await
    }

    pub async fn website_score(&self, email: &str) -> Result<Score, Error> {
        let user = self.user(email).await?;
        self.website_for(&user).await
    }

    pub async fn password_score(&self, email: &str) -> Result<Score, Error> {
        let user = self.user(email).await?;
        self.password_for(&user).await
    }

    /// Weighted overall score. Only an unknown user is an error.
    pub async fn overall_score(&self, email: &str) -> Result<Score, Error> {
        Ok(self.score_card(email).await?.overall)
    }

    pub async fn score_card(&self, email: &str) -> Result<ScoreCard, Error> {
        let user = self.user(email).await?;

        let (breach, website, password) = tokio::join!(
            self.bounded("breach", self.breach_for(&user)),
            self.bounded("website", self.website_for(&user)),
            self.bounded("password", self.password_for(&user)),
        );

        let overall = score::overall_score(breach, website, password);
        tracing::debug!(
            user_id = %user.id,
            breach = %breach,
            website = %website,
            password = %password,
            overall = %overall,
            "Computed scores"
        );

        Ok(ScoreCard {
            breach,
            website,
            password,
            overall,
        })
    }

    async fn bounded(
        &self,
        component: &'static str,
        fut: impl Future<Output = Result<Score, Error>>,
    ) -> Score {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(score)) => score,
            Ok(Err(e)) => {
                tracing::warn!(component, error = %e, "Sub-score failed; using default");
                Score::PERFECT
            }
            Err(_) => {
                tracing::warn!(
                    component,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Sub-score timed out; using default"
                );
                Score::PERFECT
            }
        }
    }

    async fn breach_for(&self, user: &User) -> Result<Score, Error> {
        let breaches = self.breach_repository.list_for_user(&user.id).await?;
        Ok(score::breach_score(&breaches, Utc::now().year()))
    }

    async fn website_for(&self, user: &User) -> Result<Score, Error> {
        let checks = self.site_check_repository.list_for_user(&user.id).await?;
        Ok(score::website_score(&checks))
    }

    async fn password_for(&self, user: &User) -> Result<Score, Error> {
        let ratings = self.rating_repository.list_for_user(&user.id).await?;
        Ok(score::password_score(&ratings))
    }

    async fn user(&self, email: &str) -> Result<User, Error> {
        validate_email(email)?;
        self.user_repository
            .find_by_email(email)
            .await?
            .ok_or_else(|| AuthError::UserNotFound.into())
    }
}
