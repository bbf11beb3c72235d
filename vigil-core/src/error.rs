use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User not found")]
    UserNotFound,

    #[error("Invalid or expired code")]
    InvalidOrExpiredCode,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found")]
    NotFound,

    #[error("No sessions found for this user")]
    NoSessions,

    #[error("Credential expired")]
    Expired,

    #[error("Invalid credential: {0}")]
    InvalidToken(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Record not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Value out of range: {0}")]
    OutOfRange(String),
}

#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("{service} unavailable: {message}")]
    Unavailable { service: String, message: String },

    #[error("{service} timed out")]
    Timeout { service: String },

    #[error("Invalid response from {service}: {message}")]
    InvalidResponse { service: String, message: String },
}

impl CollaboratorError {
    pub fn unavailable(service: impl Into<String>, message: impl ToString) -> Self {
        CollaboratorError::Unavailable {
            service: service.into(),
            message: message.to_string(),
        }
    }

    pub fn invalid_response(service: impl Into<String>, message: impl ToString) -> Self {
        CollaboratorError::InvalidResponse {
            service: service.into(),
            message: message.to_string(),
        }
    }
}

impl Error {
    /// The referenced user, session or record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::Auth(AuthError::UserNotFound)
                | Error::Session(SessionError::NotFound)
                | Error::Session(SessionError::NoSessions)
                | Error::Storage(StorageError::NotFound)
        )
    }

    /// A one-time code or credential was rejected.
    pub fn is_invalid_or_expired(&self) -> bool {
        matches!(
            self,
            Error::Auth(AuthError::InvalidOrExpiredCode)
                | Error::Session(SessionError::Expired)
                | Error::Session(SessionError::InvalidToken(_))
        )
    }

    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    pub fn is_storage_error(&self) -> bool {
        matches!(self, Error::Storage(_)) && !self.is_not_found()
    }

    pub fn is_collaborator_error(&self) -> bool {
        matches!(self, Error::Collaborator(_))
    }
}
