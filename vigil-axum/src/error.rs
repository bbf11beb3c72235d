use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use vigil::VigilError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidCredential(String),

    #[error("Missing bearer credential")]
    Unauthorized,

    #[error("Credential does not belong to {0}")]
    Forbidden(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("{0}")]
    BadGateway(String),
}

impl From<VigilError> for ApiError {
    fn from(err: VigilError) -> Self {
        match err {
            VigilError::Validation(msg) => ApiError::BadRequest(msg),
            VigilError::NotFound(msg) => ApiError::NotFound(msg),
            VigilError::InvalidOrExpired(msg) => ApiError::InvalidCredential(msg),
            VigilError::CollaboratorUnavailable(msg) => ApiError::BadGateway(msg),
            VigilError::Storage(msg) | VigilError::Config(msg) => {
                tracing::error!(error = %msg, "Request failed");
                ApiError::InternalError(msg)
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidCredential(_) | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // storage details stay in the logs
        let message = match self {
            ApiError::InternalError(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (VigilError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (VigilError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (VigilError::InvalidOrExpired("old".into()), StatusCode::UNAUTHORIZED),
            (VigilError::Storage("db".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (VigilError::Config("cfg".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                VigilError::CollaboratorUnavailable("down".into()),
                StatusCode::BAD_GATEWAY,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(ApiError::from(error).status(), expected);
        }
        assert_eq!(
            ApiError::Forbidden("x".into()).status(),
            StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn test_error_body() {
        let response = ApiError::NotFound("User not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "User not found");
        assert_eq!(body["code"], 404);
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let response = ApiError::InternalError("disk I/O error".into()).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Internal server error");
        assert_eq!(body["code"], 500);
    }
}
