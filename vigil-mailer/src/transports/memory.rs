use crate::{Email, Mailer, MailerError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Keeps delivered messages in memory. Clones share the same outbox.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    outbox: Arc<Mutex<Vec<Email>>>,
    fail: bool,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport that rejects every message, for exercising delivery failures.
    pub fn failing() -> Self {
        Self {
            outbox: Arc::default(),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<Email> {
        self.outbox
            .lock()
            .map(|outbox| outbox.clone())
            .unwrap_or_default()
    }

    pub fn last_sent_to(&self, recipient: &str) -> Option<Email> {
        self.sent()
            .into_iter()
            .rev()
            .find(|email| email.to.iter().any(|to| to == recipient))
    }
}

#[async_trait]
impl Mailer for MemoryTransport {
    async fn send_email(&self, email: Email) -> Result<(), MailerError> {
        if self.fail {
            return Err(MailerError::Rejected("memory transport set to fail".to_string()));
        }
        email.validate()?;

        self.outbox
            .lock()
            .map_err(|_| MailerError::Rejected("outbox lock poisoned".to_string()))?
            .push(email);
        Ok(())
    }
}
