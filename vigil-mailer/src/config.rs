use crate::transports::TlsMode;
use crate::{FileTransport, Mailer, MailerError, SmtpTransport, TemplateContext};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_OUTPUT_DIR: &str = "./emails";
const DEFAULT_FROM_ADDRESS: &str = "noreply@example.com";
const DEFAULT_APP_NAME: &str = "Vigil";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerConfig {
    pub transport: TransportConfig,
    pub from_address: String,
    pub from_name: Option<String>,
    pub app_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransportConfig {
    Smtp {
        host: String,
        port: Option<u16>,
        username: Option<String>,
        password: Option<String>,
        #[serde(default)]
        tls: TlsMode,
    },
    File {
        output_dir: PathBuf,
    },
}

impl MailerConfig {
    /// Build the configuration from `MAILER_*` environment variables.
    ///
    /// SMTP is selected when `MAILER_SMTP_HOST` is set, otherwise messages are written
    /// to `MAILER_FILE_OUTPUT_DIR` (default `./emails`).
    pub fn from_env() -> Result<Self, MailerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`MailerConfig::from_env`], reading from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, MailerError> {
        let transport = match lookup("MAILER_SMTP_HOST") {
            Some(host) => {
                let port = lookup("MAILER_SMTP_PORT")
                    .map(|raw| {
                        raw.trim().parse::<u16>().map_err(|_| {
                            MailerError::Config(format!("MAILER_SMTP_PORT is not a port: {raw}"))
                        })
                    })
                    .transpose()?;
                let tls = match lookup("MAILER_SMTP_TLS") {
                    Some(raw) => TlsMode::parse(&raw).ok_or_else(|| {
                        MailerError::Config(format!(
                            "MAILER_SMTP_TLS must be none, starttls or tls, got {raw}"
                        ))
                    })?,
                    None => TlsMode::default(),
                };

                TransportConfig::Smtp {
                    host,
                    port,
                    username: lookup("MAILER_SMTP_USERNAME"),
                    password: lookup("MAILER_SMTP_PASSWORD"),
                    tls,
                }
            }
            None => TransportConfig::File {
                output_dir: lookup("MAILER_FILE_OUTPUT_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            },
        };

        Ok(Self {
            transport,
            from_address: lookup("MAILER_FROM_ADDRESS")
                .unwrap_or_else(|| DEFAULT_FROM_ADDRESS.to_string()),
            from_name: lookup("MAILER_FROM_NAME"),
            app_name: lookup("MAILER_APP_NAME").unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
        })
    }

    pub fn build_transport(&self) -> Result<Box<dyn Mailer>, MailerError> {
        match &self.transport {
            TransportConfig::Smtp {
                host,
                port,
                username,
                password,
                tls,
            } => {
                let credentials = username.clone().zip(password.clone());
                Ok(Box::new(SmtpTransport::new(host, *port, credentials, *tls)?))
            }
            TransportConfig::File { output_dir } => Ok(Box::new(FileTransport::new(output_dir)?)),
        }
    }

    /// `Name <address>` when a display name is configured.
    pub fn get_from_address(&self) -> String {
        match &self.from_name {
            Some(name) => format!("{name} <{}>", self.from_address),
            None => self.from_address.clone(),
        }
    }

    pub fn template_context(&self) -> TemplateContext {
        TemplateContext {
            app_name: self.app_name.clone(),
            ..TemplateContext::default()
        }
    }
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::File {
                output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            },
            from_address: DEFAULT_FROM_ADDRESS.to_string(),
            from_name: None,
            app_name: DEFAULT_APP_NAME.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = MailerConfig::default();
        assert_eq!(config.from_address, "noreply@example.com");
        assert_eq!(config.app_name, "Vigil");
        assert!(matches!(
            config.transport,
            TransportConfig::File { ref output_dir } if output_dir == &PathBuf::from("./emails")
        ));
    }

    #[test]
    fn test_from_lookup_smtp() {
        let config = MailerConfig::from_lookup(lookup(&[
            ("MAILER_SMTP_HOST", "smtp.example.com"),
            ("MAILER_SMTP_PORT", "465"),
            ("MAILER_SMTP_TLS", "tls"),
            ("MAILER_SMTP_USERNAME", "vigil"),
            ("MAILER_SMTP_PASSWORD", "secret"),
            ("MAILER_FROM_NAME", "Vigil"),
        ]))
        .unwrap();

        match config.transport {
            TransportConfig::Smtp {
                ref host, port, tls, ..
            } => {
                assert_eq!(host, "smtp.example.com");
                assert_eq!(port, Some(465));
                assert_eq!(tls, TlsMode::Tls);
            }
            other => panic!("expected SMTP, got {other:?}"),
        }
        assert_eq!(config.get_from_address(), "Vigil <noreply@example.com>");
    }

    #[test]
    fn test_from_lookup_rejects_bad_values() {
        let bad_port = MailerConfig::from_lookup(lookup(&[
            ("MAILER_SMTP_HOST", "smtp.example.com"),
            ("MAILER_SMTP_PORT", "seventy"),
        ]));
        assert!(matches!(bad_port, Err(MailerError::Config(_))));

        let bad_tls = MailerConfig::from_lookup(lookup(&[
            ("MAILER_SMTP_HOST", "smtp.example.com"),
            ("MAILER_SMTP_TLS", "ssl"),
        ]));
        assert!(matches!(bad_tls, Err(MailerError::Config(_))));
    }

    #[test]
    fn test_from_lookup_defaults_to_file() {
        let env = lookup(&[("MAILER_FILE_OUTPUT_DIR", "/tmp/outbox")]);
        let config = MailerConfig::from_lookup(env).unwrap();
        assert!(matches!(
            config.transport,
            TransportConfig::File { ref output_dir } if output_dir == &PathBuf::from("/tmp/outbox")
        ));
        assert_eq!(config.get_from_address(), "noreply@example.com");
    }

    #[test]
    fn test_build_file_transport() {
        let dir = tempfile::tempdir().unwrap();
        let config = MailerConfig {
            transport: TransportConfig::File {
                output_dir: dir.path().to_path_buf(),
            },
            ..MailerConfig::default()
        };
        assert!(config.build_transport().is_ok());
    }
}
