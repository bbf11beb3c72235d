use crate::{
    MailerError,
    templates::{OtpCodeHtmlTemplate, OtpCodeTextTemplate, TemplateData},
};
use askama::Template;
use async_trait::async_trait;

pub const OTP_CODE_TEMPLATE: &str = "otp_code";

#[async_trait]
pub trait TemplateEngine: Send + Sync {
    async fn render_html(
        &self,
        template_name: &str,
        data: TemplateData,
    ) -> Result<String, MailerError>;

    async fn render_text(
        &self,
        template_name: &str,
        data: TemplateData,
    ) -> Result<String, MailerError>;
}

/// Renders the compiled-in askama templates.
#[derive(Debug, Clone, Default)]
pub struct AskamaTemplateEngine;

impl AskamaTemplateEngine {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TemplateEngine for AskamaTemplateEngine {
    async fn render_html(
        &self,
        template_name: &str,
        data: TemplateData,
    ) -> Result<String, MailerError> {
        match template_name {
            OTP_CODE_TEMPLATE => Ok(OtpCodeHtmlTemplate::from_data(&data)?.render()?),
            other => Err(MailerError::UnknownTemplate(other.to_string())),
        }
    }

    async fn render_text(
        &self,
        template_name: &str,
        data: TemplateData,
    ) -> Result<String, MailerError> {
        match template_name {
            OTP_CODE_TEMPLATE => Ok(OtpCodeTextTemplate::from_data(&data)?.render()?),
            other => Err(MailerError::UnknownTemplate(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_template() {
        let engine = AskamaTemplateEngine::new();
        let result = engine.render_html("welcome", TemplateData::new()).await;
        assert!(matches!(result, Err(MailerError::UnknownTemplate(name)) if name == "welcome"));
    }

    #[tokio::test]
    async fn test_render_otp_code() {
        let engine = AskamaTemplateEngine::new();
        let data = TemplateData::new()
            .insert("code", "000123")
            .unwrap()
            .insert("valid_minutes", 15)
            .unwrap();

        let text = engine
            .render_text(OTP_CODE_TEMPLATE, data.clone())
            .await
            .unwrap();
        assert_eq!(text, "Your OTP is 000123. It is valid for 15 minutes.");

        let html = engine.render_html(OTP_CODE_TEMPLATE, data).await.unwrap();
        assert!(html.contains("000123"));
        assert!(html.contains("Vigil"));
    }
}
