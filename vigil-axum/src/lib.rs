//! # Vigil Axum Integration
//!
//! Axum routes for the [`Vigil`] facade: one-time code sign-in, the device session
//! registry, signal ingestion and the four scores, all as JSON over HTTP.
//!
//! Routes acting on a user's data require `Authorization: Bearer <credential>`, where the
//! credential is the one returned by `POST /otp/verify`. A credential only grants access to
//! its own subject's data; anything else is answered with `403`.
//!
//! Errors are rendered as `{"error": <message>, "code": <status>}`.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vigil::{JwtConfig, VigilBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let vigil = VigilBuilder::new()
//!         .with_sqlite("sqlite://vigil.db?mode=rwc")
//!         .await?
//!         .with_jwt(JwtConfig::from_secret("a secret that is at least 32 bytes long")?)
//!         .apply_migrations(true)
//!         .build()
//!         .await?;
//!
//!     let app = axum::Router::new().nest("/api", vigil_axum::routes(Arc::new(vigil)));
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

mod error;
mod extractors;
mod middleware;
mod routes;
mod types;

pub use error::{ApiError, Result};
pub use extractors::{ApiJson, AuthClaims};
pub use middleware::{ApiState, require_credential};
pub use routes::create_router;
pub use types::{
    AcceptedResponse, AddSessionRequest, ChallengeRequest, ChallengeResponse, CheckSiteRequest,
    CredentialResponse, HealthResponse, IngestBreachesRequest, IngestBreachesResponse,
    IngestPasswordRatingRequest, IngestSiteCheckRequest, PasswordRatingResponse,
    RemoveSessionRequest, RemovedResponse, ScoreResponse, SessionLookupRequest,
    SessionLookupResponse, UpdateNameRequest, VerifyChallengeRequest,
};

use axum::Router;
use std::sync::Arc;
use vigil::{RepositoryProvider, Vigil};

/// Create the Vigil API router.
///
/// The router can be nested into an application at any path.
pub fn routes<R>(vigil: Arc<Vigil<R>>) -> Router
where
    R: RepositoryProvider + 'static,
{
    create_router(vigil)
}
