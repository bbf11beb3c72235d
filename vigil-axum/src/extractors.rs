use axum::{
    Extension, Json, RequestPartsExt,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use vigil::CredentialClaims;

use crate::error::ApiError;

/// Claims of the bearer credential, as verified by
/// [`require_credential`](crate::require_credential).
pub struct AuthClaims(pub CredentialClaims);

impl AuthClaims {
    /// Only the credential's own subject may act on `email`.
    pub fn ensure_subject(&self, email: &str) -> Result<(), ApiError> {
        if self.0.sub == email {
            Ok(())
        } else {
            Err(ApiError::Forbidden(email.to_string()))
        }
    }
}

impl<S> FromRequestParts<S> for AuthClaims
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Extension(claims): Extension<CredentialClaims> =
            parts.extract().await.map_err(|_| ApiError::Unauthorized)?;

        Ok(AuthClaims(claims))
    }
}

/// `Json` whose rejections render as [`ApiError`] bodies.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}
