use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post, put},
};
use vigil::{RepositoryProvider, Score, Vigil};

use crate::{
    error::{ApiError, Result},
    extractors::{ApiJson, AuthClaims},
    middleware::{ApiState, require_credential},
    types::*,
};

pub fn create_router<R>(vigil: Arc<Vigil<R>>) -> Router
where
    R: RepositoryProvider + 'static,
{
    let state = ApiState { vigil };

    let public_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/otp/request", post(request_challenge_handler))
        .route("/otp/verify", post(verify_challenge_handler))
        .route("/sessions", post(add_session_handler))
        .route("/sessions/remove", post(remove_session_handler))
        .route("/sessions/lookup", post(lookup_session_handler));

    let protected_routes = Router::new()
        .route("/users/{email}", get(profile_handler))
        .route("/users/{email}/name", put(update_name_handler))
        .route("/breaches", post(ingest_breaches_handler))
        .route("/breaches/{email}", get(breach_info_handler))
        .route("/site-checks", post(ingest_site_check_handler))
        .route("/site-checks/lookup", post(check_site_handler))
        .route(
            "/site-checks/{email}/malicious",
            get(malicious_sites_handler),
        )
        .route("/password-ratings", post(ingest_password_rating_handler))
        .route("/password-ratings/{email}", get(password_ratings_handler))
        .route("/scores/{email}", get(score_card_handler))
        .route("/scores/{email}/{kind}", get(score_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_credential::<R>,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

async fn health_handler<R>(State(state): State<ApiState<R>>) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    state.vigil.health_check().await?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

// ----------------------------------------------------------------------
// One-time codes and sessions
// ----------------------------------------------------------------------

async fn request_challenge_handler<R>(
    State(state): State<ApiState<R>>,
    ApiJson(payload): ApiJson<ChallengeRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let receipt = state.vigil.request_challenge(&payload.email).await?;

    // the challenge is kept when delivery fails
    if !receipt.delivered {
        return Err(ApiError::BadGateway(format!(
            "One-time code for {} was stored but could not be delivered",
            receipt.email
        )));
    }

    Ok(Json(ChallengeResponse {
        accepted: true,
        delivered: receipt.delivered,
        expires_at: receipt.expires_at,
    }))
}

async fn verify_challenge_handler<R>(
    State(state): State<ApiState<R>>,
    ApiJson(payload): ApiJson<VerifyChallengeRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let credential = state
        .vigil
        .verify_challenge(&payload.email, &payload.code)
        .await?;

    Ok(Json(CredentialResponse {
        credential: credential.into_inner(),
    }))
}

async fn add_session_handler<R>(
    State(state): State<ApiState<R>>,
    ApiJson(payload): ApiJson<AddSessionRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    state
        .vigil
        .add_session(&payload.email, &payload.credential, &payload.fingerprint)
        .await?;

    Ok(Json(AcceptedResponse { accepted: true }))
}

async fn remove_session_handler<R>(
    State(state): State<ApiState<R>>,
    ApiJson(payload): ApiJson<RemoveSessionRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    state
        .vigil
        .remove_session(&payload.email, &payload.fingerprint)
        .await?;

    Ok(Json(RemovedResponse { removed: true }))
}

async fn lookup_session_handler<R>(
    State(state): State<ApiState<R>>,
    ApiJson(payload): ApiJson<SessionLookupRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let found = state
        .vigil
        .find_session_by_fingerprint(&payload.fingerprint)
        .await?;

    Ok(Json(match found {
        Some(session) => SessionLookupResponse {
            session_found: true,
            email: Some(session.email),
            credential: Some(session.credential.into_inner()),
        },
        None => SessionLookupResponse {
            session_found: false,
            email: None,
            credential: None,
        },
    }))
}

// ----------------------------------------------------------------------
// Users
// ----------------------------------------------------------------------

async fn profile_handler<R>(
    State(state): State<ApiState<R>>,
    claims: AuthClaims,
    Path(email): Path<String>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    claims.ensure_subject(&email)?;
    Ok(Json(state.vigil.get_profile(&email).await?))
}

async fn update_name_handler<R>(
    State(state): State<ApiState<R>>,
    claims: AuthClaims,
    Path(email): Path<String>,
    ApiJson(payload): ApiJson<UpdateNameRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    claims.ensure_subject(&email)?;
    let user = state.vigil.update_name(&email, &payload.name).await?;
    Ok(Json(vigil::UserProfile::from(user)))
}

// ----------------------------------------------------------------------
// Signal ingest
// ----------------------------------------------------------------------

async fn ingest_breaches_handler<R>(
    State(state): State<ApiState<R>>,
    claims: AuthClaims,
    ApiJson(payload): ApiJson<IngestBreachesRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    claims.ensure_subject(&payload.owner_email)?;

    let inserted_count = match payload.entries {
        Some(entries) => {
            state
                .vigil
                .ingest_breaches(&payload.owner_email, &payload.target_email, entries)
                .await?
        }
        None => {
            state
                .vigil
                .fetch_and_ingest_breaches(&payload.owner_email, &payload.target_email)
                .await?
        }
    };

    Ok(Json(IngestBreachesResponse { inserted_count }))
}

async fn breach_info_handler<R>(
    State(state): State<ApiState<R>>,
    claims: AuthClaims,
    Path(email): Path<String>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    claims.ensure_subject(&email)?;
    Ok(Json(state.vigil.breach_info(&email).await?))
}

async fn ingest_site_check_handler<R>(
    State(state): State<ApiState<R>>,
    claims: AuthClaims,
    ApiJson(payload): ApiJson<IngestSiteCheckRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    claims.ensure_subject(&payload.owner_email)?;
    let check = state
        .vigil
        .ingest_site_check(&payload.owner_email, payload.report)
        .await?;
    Ok(Json(check))
}

async fn check_site_handler<R>(
    State(state): State<ApiState<R>>,
    claims: AuthClaims,
    ApiJson(payload): ApiJson<CheckSiteRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    claims.ensure_subject(&payload.owner_email)?;
    let check = state
        .vigil
        .check_site(&payload.owner_email, &payload.domain)
        .await?;
    Ok(Json(check))
}

async fn malicious_sites_handler<R>(
    State(state): State<ApiState<R>>,
    claims: AuthClaims,
    Path(email): Path<String>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    claims.ensure_subject(&email)?;
    Ok(Json(state.vigil.malicious_sites(&email).await?))
}

async fn ingest_password_rating_handler<R>(
    State(state): State<ApiState<R>>,
    claims: AuthClaims,
    ApiJson(payload): ApiJson<IngestPasswordRatingRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    claims.ensure_subject(&payload.owner_email)?;
    let rating = state
        .vigil
        .ingest_password_rating(
            &payload.owner_email,
            &payload.domain,
            payload.rating,
            payload.scale,
        )
        .await?;

    Ok(Json(PasswordRatingResponse {
        rating: rating.rating,
    }))
}

async fn password_ratings_handler<R>(
    State(state): State<ApiState<R>>,
    claims: AuthClaims,
    Path(email): Path<String>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    claims.ensure_subject(&email)?;
    Ok(Json(state.vigil.password_ratings(&email).await?))
}

// ----------------------------------------------------------------------
// Scores
// ----------------------------------------------------------------------

async fn score_card_handler<R>(
    State(state): State<ApiState<R>>,
    claims: AuthClaims,
    Path(email): Path<String>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    claims.ensure_subject(&email)?;
    Ok(Json(state.vigil.score_card(&email).await?))
}

async fn score_handler<R>(
    State(state): State<ApiState<R>>,
    claims: AuthClaims,
    Path((email, kind)): Path<(String, String)>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    claims.ensure_subject(&email)?;

    let score: Score = match kind.as_str() {
        "breach" => state.vigil.breach_score(&email).await?,
        "website" => state.vigil.website_score(&email).await?,
        "password" => state.vigil.password_score(&email).await?,
        "overall" => state.vigil.overall_score(&email).await?,
        other => return Err(ApiError::NotFound(format!("Unknown score: {other}"))),
    };

    Ok(Json(ScoreResponse { score }))
}
