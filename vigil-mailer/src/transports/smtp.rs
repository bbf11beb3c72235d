use super::to_message;
use crate::{Email, Mailer, MailerError};
use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use serde::{Deserialize, Serialize};

type Relay = AsyncSmtpTransport<Tokio1Executor>;

/// How the connection to the relay is secured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TlsMode {
    /// Plain text, for local catchers such as MailHog
    None,
    #[default]
    StartTls,
    /// Implicit TLS, usually port 465
    Tls,
}

impl TlsMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Some(TlsMode::None),
            "starttls" => Some(TlsMode::StartTls),
            "tls" => Some(TlsMode::Tls),
            _ => None,
        }
    }
}

/// Sends through an SMTP relay.
#[derive(Debug, Clone)]
pub struct SmtpTransport {
    relay: Relay,
}

impl SmtpTransport {
    pub fn new(
        host: &str,
        port: Option<u16>,
        credentials: Option<(String, String)>,
        tls: TlsMode,
    ) -> Result<Self, MailerError> {
        let mut builder = match tls {
            TlsMode::None => Relay::builder_dangerous(host),
            TlsMode::StartTls => Relay::starttls_relay(host)?,
            TlsMode::Tls => Relay::relay(host)?,
        };
        if let Some(port) = port {
            builder = builder.port(port);
        }
        if let Some((username, password)) = credentials {
            builder = builder.credentials(Credentials::new(username, password));
        }

        Ok(Self {
            relay: builder.build(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpTransport {
    async fn send_email(&self, email: Email) -> Result<(), MailerError> {
        let response = self.relay.send(to_message(email)?).await?;
        tracing::debug!(code = %response.code(), "SMTP relay accepted message");
        Ok(())
    }
}
