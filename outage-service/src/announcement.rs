use std::{io::Write, path::PathBuf};

use tokio::fs;

#[derive(thiserror::Error, Debug)]
pub enum AnnouncementError {
    #[error("failed to read announcement: {0}")]
    Read(std::io::Error),
    #[error("failed to write announcement: {0}")]
    Write(std::io::Error),
}

/// Single-value, file-backed store for the free-text announcement appended to
/// status messages.
///
/// Every write goes to its own uniquely named temp file in the target directory,
/// which is then renamed over the target. Readers see either the old or the new
/// text, and concurrent writers never share a temp file.
#[derive(Debug, Clone)]
pub struct FileAnnouncementStore {
    path: PathBuf,
}

impl FileAnnouncementStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Current announcement; empty when none was ever set.
    pub async fn get_current_announcement(&self) -> Result<String, AnnouncementError> {
        match fs::read_to_string(&self.path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(AnnouncementError::Read(e)),
        }
    }

    pub async fn set_current_announcement(&self, text: &str) -> Result<(), AnnouncementError> {
        self.replace(text).await?;
        tracing::info!(path = %self.path.display(), bytes = text.len(), "announcement updated");
        Ok(())
    }

    pub async fn reset(&self) -> Result<(), AnnouncementError> {
        self.replace("").await?;
        tracing::info!(path = %self.path.display(), "announcement reset");
        Ok(())
    }

    async fn replace(&self, text: &str) -> Result<(), AnnouncementError> {
        let dir = match self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            Some(dir) => dir.to_path_buf(),
            None => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).await.map_err(AnnouncementError::Write)?;

        let target = self.path.clone();
        let text = text.to_owned();
        let written = tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
            tmp.write_all(text.as_bytes())?;
            tmp.as_file().sync_all()?;
            tmp.persist(&target).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| AnnouncementError::Write(std::io::Error::other(e)))?;

        written.map_err(|e| {
            tracing::error!(error = %e, path = %self.path.display(), "announcement write failed");
            AnnouncementError::Write(e)
        })
    }
}
