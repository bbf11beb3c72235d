#[cfg(feature = "mailer")]
pub use self::mailer_impl::*;

#[cfg(feature = "mailer")]
mod mailer_impl {
    use crate::{Error, error::CollaboratorError, lookup::CodeDelivery};
    use async_trait::async_trait;
    use vigil_mailer::prelude::*;

    const SERVICE: &str = "mailer";

    /// Delivers one-time codes by email
    pub struct MailerCodeDelivery {
        transport: Box<dyn Mailer>,
        engine: AskamaTemplateEngine,
        config: MailerConfig,
    }

    impl MailerCodeDelivery {
        pub fn new(config: MailerConfig) -> Result<Self, Error> {
            let transport = config
                .build_transport()
                .map_err(|e| CollaboratorError::unavailable(SERVICE, e))?;
            Ok(Self::with_transport(transport, config))
        }

        pub fn from_env() -> Result<Self, Error> {
            let config =
                MailerConfig::from_env().map_err(|e| CollaboratorError::unavailable(SERVICE, e))?;
            Self::new(config)
        }

        /// Use an already built transport, e.g. a `MemoryTransport` in tests.
        pub fn with_transport(transport: Box<dyn Mailer>, config: MailerConfig) -> Self {
            Self {
                transport,
                engine: AskamaTemplateEngine::new(),
                config,
            }
        }
    }

    #[async_trait]
    impl CodeDelivery for MailerCodeDelivery {
        async fn deliver_code(
            &self,
            email: &str,
            code: &str,
            valid_minutes: i64,
        ) -> Result<(), Error> {
            let mut context = self.config.template_context();
            context.user_email = Some(email.to_string());

            let message = OtpCodeEmail::build(
                &self.engine,
                &self.config.get_from_address(),
                email,
                code,
                valid_minutes,
                context,
            )
            .await
            .map_err(|e| CollaboratorError::unavailable(SERVICE, e))?;

            self.transport
                .send_email(message)
                .await
                .map_err(|e| CollaboratorError::unavailable(SERVICE, e))?;

            tracing::debug!("Sent one-time code email");
            Ok(())
        }
    }

}
