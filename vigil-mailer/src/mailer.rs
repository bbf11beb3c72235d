use crate::{Email, MailerError};
use async_trait::async_trait;

/// A channel that can deliver a fully built [`Email`].
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_email(&self, email: Email) -> Result<(), MailerError>;
}

#[async_trait]
impl<T: Mailer + ?Sized> Mailer for Box<T> {
    async fn send_email(&self, email: Email) -> Result<(), MailerError> {
        (**self).send_email(email).await
    }
}

#[async_trait]
impl<T: Mailer + ?Sized> Mailer for std::sync::Arc<T> {
    async fn send_email(&self, email: Email) -> Result<(), MailerError> {
        (**self).send_email(email).await
    }
}
