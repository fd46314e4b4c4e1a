use std::{
    io::Write,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use shared::error::ClientError;
use tempfile::NamedTempFile;
use tracing::info;

/// Hands a finished payload to the user as a named file.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Returns where the file ended up.
    async fn present(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, ClientError>;
}

/// Saves payloads into a fixed directory, replacing any previous file of the
/// same name. The payload is staged in a temporary file next to the target
/// and renamed into place, so a failed save never leaves a partial file.
#[derive(Debug, Clone)]
pub struct DirectoryDownloadSink {
    dir: PathBuf,
}

impl DirectoryDownloadSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

/// The user's downloads folder, or the working directory when there is none.
pub(crate) fn default_download_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}

#[async_trait]
impl DownloadSink for DirectoryDownloadSink {
    async fn present(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, ClientError> {
        let dir = self.dir.clone();
        let target = dir.join(filename);
        let bytes = bytes.to_vec();
        let saved = tokio::task::spawn_blocking(move || save_atomically(&dir, &target, &bytes))
            .await
            .map_err(|e| ClientError::Download(format!("save task failed: {e}")))??;
        info!(path = %saved.display(), "download: file saved");
        Ok(saved)
    }
}

fn save_atomically(dir: &Path, target: &Path, bytes: &[u8]) -> Result<PathBuf, ClientError> {
    std::fs::create_dir_all(dir).map_err(|e| {
        ClientError::Download(format!("could not prepare '{}': {e}", dir.display()))
    })?;
    // Dropping the temp file on any early return removes it.
    let mut staged = NamedTempFile::new_in(dir).map_err(|e| {
        ClientError::Download(format!("could not stage file in '{}': {e}", dir.display()))
    })?;
    staged
        .write_all(bytes)
        .and_then(|()| staged.as_file().sync_all())
        .map_err(|e| ClientError::Download(format!("could not write payload: {e}")))?;
    staged.persist(target).map_err(|e| {
        ClientError::Download(format!("could not move into '{}': {}", target.display(), e.error))
    })?;
    Ok(target.to_path_buf())
}

#[cfg(test)]
#[path = "tests/download_tests.rs"]
mod tests;
