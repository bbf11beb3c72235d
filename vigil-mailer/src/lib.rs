//! Mail delivery for the vigil workspace.
//!
//! The crate is deliberately small: a [`Mailer`] trait implemented by a handful of
//! transports, an [`Email`] value with a builder, and askama templates for the one
//! message the system sends, the one-time sign-in code.
//!
//! ```rust,no_run
//! use vigil_mailer::prelude::*;
//!
//! # async fn run() -> Result<(), MailerError> {
//! let config = MailerConfig::from_env()?;
//! let transport = config.build_transport()?;
//! let engine = AskamaTemplateEngine::new();
//!
//! let email = OtpCodeEmail::build(
//!     &engine,
//!     &config.get_from_address(),
//!     "someone@example.com",
//!     "482913",
//!     15,
//!     config.template_context(),
//! )
//! .await?;
//! transport.send_email(email).await?;
//! # Ok(())
//! # }
//! ```
pub mod config;
pub mod email;
pub mod email_types;
pub mod error;
pub mod mailer;
pub mod templates;
pub mod transports;

pub use config::{MailerConfig, TransportConfig};
pub use email::{Email, EmailBuilder};
pub use email_types::OtpCodeEmail;
pub use error::MailerError;
pub use mailer::Mailer;
pub use templates::{AskamaTemplateEngine, TemplateContext, TemplateEngine};
pub use transports::{FileTransport, MemoryTransport, SmtpTransport, TlsMode};

pub mod prelude {
    pub use crate::{
        AskamaTemplateEngine, Email, EmailBuilder, FileTransport, Mailer, MailerConfig,
        MailerError, MemoryTransport, OtpCodeEmail, SmtpTransport, TemplateContext,
        TemplateEngine,
    };
}
