use std::sync::Arc;

use axum::{
    RequestPartsExt,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use vigil::{RepositoryProvider, Vigil};

use crate::error::ApiError;

pub struct ApiState<R: RepositoryProvider> {
    pub vigil: Arc<Vigil<R>>,
}

impl<R: RepositoryProvider> Clone for ApiState<R> {
    fn clone(&self) -> Self {
        Self {
            vigil: self.vigil.clone(),
        }
    }
}

/// Reject requests without a valid bearer credential.
///
/// On success the verified [`CredentialClaims`](vigil::CredentialClaims) are stored in the
/// request extensions for [`AuthClaims`](crate::AuthClaims) to pick up.
pub async fn require_credential<R>(
    State(state): State<ApiState<R>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError>
where
    R: RepositoryProvider,
{
    let (mut parts, body) = request.into_parts();
    let bearer = parts
        .extract::<Option<TypedHeader<Authorization<Bearer>>>>()
        .await
        .map_err(|_| ApiError::Unauthorized)?
        .ok_or(ApiError::Unauthorized)?;

    let claims = state.vigil.verify_credential(bearer.token()).map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer credential");
        ApiError::from(e)
    })?;

    parts.extensions.insert(claims);
    Ok(next.run(Request::from_parts(parts, body)).await)
}
