use thiserror::Error;

#[derive(Error, Debug)]
pub enum MailerError {
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Failed to assemble message: {0}")]
    Assemble(#[from] lettre::error::Error),

    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Failed to write message file: {0}")]
    File(#[from] lettre::transport::file::Error),

    #[error("Delivery rejected: {0}")]
    Rejected(String),

    #[error("Failed to render template: {0}")]
    Template(#[from] askama::Error),

    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Failed to encode template value: {0}")]
    TemplateValue(#[from] serde_json::Error),

    #[error("Mailer configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MailerError>;
