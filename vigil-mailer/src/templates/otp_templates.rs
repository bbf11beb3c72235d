use crate::{MailerError, templates::TemplateData};
use askama::Template;

#[derive(Template)]
#[template(
    source = r#"
<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Your sign-in code - {{ app_name }}</title>
    <style>
        body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; margin: 0; padding: 20px; background-color: #f4f4f4; }
        .container { max-width: 600px; margin: 0 auto; background: white; padding: 30px; border-radius: 8px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
        .header { text-align: center; margin-bottom: 30px; }
        .code { font-family: monospace; font-size: 32px; letter-spacing: 8px; text-align: center; background: #f8f9fa; padding: 16px; border-radius: 4px; }
        .footer { margin-top: 30px; padding-top: 20px; border-top: 1px solid #eee; font-size: 12px; color: #666; }
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>{{ app_name }}</h1>
        </div>

        <p>{% if let Some(name) = user_name %}Hello {{ name }},{% else %}Hello,{% endif %}</p>

        <p>Use the code below to finish signing in. It is valid for {{ valid_minutes }} minutes and can only be used once.</p>

        <p class="code">{{ code }}</p>

        <p>If you didn't request this code, you can safely ignore this email.</p>

        <div class="footer">
            <p>This email was sent by {{ app_name }}.</p>
        </div>
    </div>
</body>
</html>
"#,
    ext = "html"
)]
pub struct OtpCodeHtmlTemplate {
    pub app_name: String,
    pub user_name: Option<String>,
    pub code: String,
    pub valid_minutes: i64,
}

impl OtpCodeHtmlTemplate {
    pub fn from_data(data: &TemplateData) -> Result<Self, MailerError> {
        let context = data.context();
        Ok(Self {
            app_name: context.app_name,
            user_name: context.user_name,
            code: data.require_str("code")?,
            valid_minutes: valid_minutes(data)?,
        })
    }
}

#[derive(Template)]
#[template(
    source = "Your OTP is {{ code }}. It is valid for {{ valid_minutes }} minutes.",
    ext = "txt"
)]
pub struct OtpCodeTextTemplate {
    pub code: String,
    pub valid_minutes: i64,
}

impl OtpCodeTextTemplate {
    pub fn from_data(data: &TemplateData) -> Result<Self, MailerError> {
        Ok(Self {
            code: data.require_str("code")?,
            valid_minutes: valid_minutes(data)?,
        })
    }
}

fn valid_minutes(data: &TemplateData) -> Result<i64, MailerError> {
    data.get("valid_minutes")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| MailerError::InvalidMessage("valid_minutes is required".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::TemplateContext;

    #[test]
    fn test_text_template_matches_plain_wording() {
        let template = OtpCodeTextTemplate {
            code: "123456".to_string(),
            valid_minutes: 15,
        };
        assert_eq!(
            template.render().unwrap(),
            "Your OTP is 123456. It is valid for 15 minutes."
        );
    }

    #[test]
    fn test_html_template_from_data() {
        let data = TemplateData::new()
            .insert(
                "context",
                TemplateContext {
                    app_name: "Vigil".to_string(),
                    user_email: None,
                    user_name: Some("Ada".to_string()),
                },
            )
            .unwrap()
            .insert("code", "654321")
            .unwrap()
            .insert("valid_minutes", 15)
            .unwrap();

        let html = OtpCodeHtmlTemplate::from_data(&data)
            .unwrap()
            .render()
            .unwrap();
        assert!(html.contains("654321"));
        assert!(html.contains("Hello Ada,"));
    }

    #[test]
    fn test_missing_code_is_rejected() {
        let data = TemplateData::new().insert("valid_minutes", 15).unwrap();
        assert!(OtpCodeTextTemplate::from_data(&data).is_err());
    }
}
