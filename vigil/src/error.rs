use vigil_core::Error;

/// Errors returned by the [`Vigil`](crate::Vigil) facade.
///
/// Each variant is one failure category a caller can render: a bad input, a missing entity,
/// a rejected code or credential, a storage failure, or an unreachable collaborator.
#[derive(Debug, thiserror::Error)]
pub enum VigilError {
    /// A required input is missing or malformed
    #[error("Validation error: {0}")]
    Validation(String),

    /// The referenced user or session does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A one-time code or credential was rejected
    #[error("Invalid or expired: {0}")]
    InvalidOrExpired(String),

    /// The durable store failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// A breach, reputation or delivery service could not be reached
    #[error("Collaborator unavailable: {0}")]
    CollaboratorUnavailable(String),

    /// The instance could not be configured
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<Error> for VigilError {
    fn from(error: Error) -> Self {
        let message = error.to_string();
        if error.is_validation_error() {
            VigilError::Validation(message)
        } else if error.is_not_found() {
            VigilError::NotFound(message)
        } else if error.is_invalid_or_expired() {
            VigilError::InvalidOrExpired(message)
        } else if error.is_collaborator_error() {
            VigilError::CollaboratorUnavailable(message)
        } else {
            VigilError::Storage(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::error::{
        AuthError, CollaboratorError, SessionError, StorageError, ValidationError,
    };

    #[test]
    fn test_error_categories() {
        let cases: Vec<(Error, fn(&VigilError) -> bool)> = vec![
            (
                ValidationError::InvalidEmail("nope".to_string()).into(),
                |e| matches!(e, VigilError::Validation(_)),
            ),
            (AuthError::UserNotFound.into(), |e| {
                matches!(e, VigilError::NotFound(_))
            }),
            (SessionError::NoSessions.into(), |e| {
                matches!(e, VigilError::NotFound(_))
            }),
            (AuthError::InvalidOrExpiredCode.into(), |e| {
                matches!(e, VigilError::InvalidOrExpired(_))
            }),
            (SessionError::Expired.into(), |e| {
                matches!(e, VigilError::InvalidOrExpired(_))
            }),
            (StorageError::Database("boom".to_string()).into(), |e| {
                matches!(e, VigilError::Storage(_))
            }),
            (
                CollaboratorError::unavailable("virustotal", "down").into(),
                |e| matches!(e, VigilError::CollaboratorUnavailable(_)),
            ),
        ];

        for (error, check) in cases {
            let mapped = VigilError::from(error);
            assert!(check(&mapped), "unexpected mapping: {mapped:?}");
        }
    }
}
