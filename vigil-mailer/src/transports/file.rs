use super::to_message;
use crate::{Email, Mailer, MailerError};
use async_trait::async_trait;
use lettre::Transport;
use std::path::{Path, PathBuf};

/// Writes each message to `<output_dir>/<id>.eml` instead of sending it.
#[derive(Debug, Clone)]
pub struct FileTransport {
    inner: lettre::FileTransport,
    output_dir: PathBuf,
}

impl FileTransport {
    /// The directory is created when missing.
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self, MailerError> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir)?;

        Ok(Self {
            inner: lettre::FileTransport::new(&output_dir),
            output_dir,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[async_trait]
impl Mailer for FileTransport {
    async fn send_email(&self, email: Email) -> Result<(), MailerError> {
        let message = to_message(email)?;
        let inner = self.inner.clone();

        // blocking file I/O
        let id = tokio::task::spawn_blocking(move || inner.send(&message))
            .await
            .map_err(|e| MailerError::Rejected(format!("file writer task failed: {e}")))??;

        tracing::debug!(id = %id, dir = %self.output_dir.display(), "Wrote message file");
        Ok(())
    }
}
