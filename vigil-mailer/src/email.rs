use crate::MailerError;
use serde::{Deserialize, Serialize};

/// A rendered message, independent of the transport that sends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Email {
    pub to: Vec<String>,
    pub from: String,
    pub subject: String,
    pub html_body: Option<String>,
    pub text_body: Option<String>,
}

impl Email {
    pub fn builder() -> EmailBuilder {
        EmailBuilder::default()
    }

    /// Every transport checks this before sending.
    pub fn validate(&self) -> Result<(), MailerError> {
        let missing = if self.to.is_empty() {
            Some("recipient")
        } else if self.from.trim().is_empty() {
            Some("sender")
        } else if self.subject.trim().is_empty() {
            Some("subject")
        } else if self.html_body.is_none() && self.text_body.is_none() {
            Some("body")
        } else {
            None
        };

        match missing {
            Some(part) => Err(MailerError::InvalidMessage(format!("message has no {part}"))),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
pub struct EmailBuilder {
    to: Vec<String>,
    from: String,
    subject: String,
    html_body: Option<String>,
    text_body: Option<String>,
}

impl EmailBuilder {
    pub fn to(mut self, recipient: impl Into<String>) -> Self {
        self.to.push(recipient.into());
        self
    }

    pub fn from(mut self, sender: impl Into<String>) -> Self {
        self.from = sender.into();
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn html_body(mut self, html: impl Into<String>) -> Self {
        self.html_body = Some(html.into());
        self
    }

    pub fn text_body(mut self, text: impl Into<String>) -> Self {
        self.text_body = Some(text.into());
        self
    }

    pub fn build(self) -> Result<Email, MailerError> {
        let email = Email {
            to: self.to,
            from: self.from,
            subject: self.subject,
            html_body: self.html_body,
            text_body: self.text_body,
        };
        email.validate()?;
        Ok(email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn otp_email() -> EmailBuilder {
        Email::builder()
            .from("noreply@vigil.test")
            .to("ada@example.com")
            .subject("Your OTP Code")
    }

    #[test]
    fn test_build() {
        let email = otp_email()
            .text_body("Your OTP is 123456.")
            .build()
            .unwrap();

        assert_eq!(email.from, "noreply@vigil.test");
        assert_eq!(email.to, vec!["ada@example.com"]);
        assert_eq!(email.text_body.as_deref(), Some("Your OTP is 123456."));
        assert!(email.html_body.is_none());
    }

    #[test]
    fn test_missing_parts() {
        let err = otp_email().build().unwrap_err();
        assert_eq!(err.to_string(), "Invalid message: message has no body");

        let err = Email::builder()
            .from("noreply@vigil.test")
            .subject("Your OTP Code")
            .text_body("123456")
            .build()
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid message: message has no recipient");

        let err = Email::builder()
            .to("ada@example.com")
            .subject("Your OTP Code")
            .text_body("123456")
            .build()
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid message: message has no sender");
    }
}
