use crate::{
    Email, MailerError,
    templates::{OTP_CODE_TEMPLATE, TemplateContext, TemplateData, TemplateEngine},
};

pub const OTP_SUBJECT: &str = "Your OTP Code";

/// The one-time sign-in code message.
pub struct OtpCodeEmail;

impl OtpCodeEmail {
    pub async fn build<T: TemplateEngine>(
        engine: &T,
        from: &str,
        to: &str,
        code: &str,
        valid_minutes: i64,
        context: TemplateContext,
    ) -> Result<Email, MailerError> {
        let template_data = TemplateData::new()
            .insert("context", &context)?
            .insert("code", code)?
            .insert("valid_minutes", valid_minutes)?;

        let html_body = engine
            .render_html(OTP_CODE_TEMPLATE, template_data.clone())
            .await?;
        let text_body = engine.render_text(OTP_CODE_TEMPLATE, template_data).await?;

        Email::builder()
            .from(from)
            .to(to)
            .subject(OTP_SUBJECT)
            .html_body(html_body)
            .text_body(text_body)
            .build()
    }
}
