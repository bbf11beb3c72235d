mod file;
mod memory;
pub mod smtp;

pub use file::FileTransport;
pub use memory::MemoryTransport;
pub use smtp::{SmtpTransport, TlsMode};

use crate::{Email, MailerError};
use lettre::Message;
use lettre::message::{MultiPart, SinglePart};

/// Turn an [`Email`] into a lettre [`Message`]. With both renderings present the body is
/// `multipart/alternative`, text first.
pub(crate) fn to_message(email: Email) -> Result<Message, MailerError> {
    email.validate()?;

    let mut builder = Message::builder()
        .from(email.from.parse()?)
        .subject(email.subject);
    for recipient in &email.to {
        builder = builder.to(recipient.parse()?);
    }

    let message = match (email.text_body, email.html_body) {
        (Some(text), Some(html)) => {
            builder.multipart(MultiPart::alternative_plain_html(text, html))?
        }
        (Some(text), None) => builder.singlepart(SinglePart::plain(text))?,
        (None, Some(html)) => builder.singlepart(SinglePart::html(html))?,
        (None, None) => return Err(MailerError::InvalidMessage("message has no body".to_string())),
    };
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_message_multipart() {
        let email = Email::builder()
            .from("Vigil <noreply@vigil.test>")
            .to("ada@example.com")
            .subject("Your OTP Code")
            .html_body("<p>123456</p>")
            .text_body("123456")
            .build()
            .unwrap();

        let formatted = String::from_utf8(to_message(email).unwrap().formatted()).unwrap();
        assert!(formatted.contains("multipart/alternative"));
        assert!(formatted.contains("To: ada@example.com"));
    }

    #[test]
    fn test_to_message_rejects_bad_address() {
        let email = Email {
            to: vec!["not an address".to_string()],
            from: "noreply@vigil.test".to_string(),
            subject: "Your OTP Code".to_string(),
            html_body: None,
            text_body: Some("123456".to_string()),
        };

        assert!(matches!(to_message(email), Err(MailerError::Address(_))));
    }
}
