mod engine;
mod otp_templates;

pub use engine::{AskamaTemplateEngine, OTP_CODE_TEMPLATE, TemplateEngine};
pub use otp_templates::{OtpCodeHtmlTemplate, OtpCodeTextTemplate};

use crate::MailerError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Branding shared by every rendered message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateContext {
    pub app_name: String,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
}

impl Default for TemplateContext {
    fn default() -> Self {
        Self {
            app_name: "Vigil".to_string(),
            user_email: None,
            user_name: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateData {
    pub data: HashMap<String, serde_json::Value>,
}

impl TemplateData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<T: Serialize>(mut self, key: &str, value: T) -> Result<Self, MailerError> {
        self.data
            .insert(key.to_string(), serde_json::to_value(value)?);
        Ok(self)
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    pub(crate) fn context(&self) -> TemplateContext {
        self.get("context")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }

    pub(crate) fn require_str(&self, key: &str) -> Result<String, MailerError> {
        self.get(key)
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| MailerError::InvalidMessage(format!("{key} is required")))
    }
}
