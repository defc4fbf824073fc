use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clipgrab_core::MediaPayload;
use session_logging::{session_debug, session_info};
use tempfile::NamedTempFile;

use crate::WorkflowError;

/// Local save action for a fetched payload. No network involved.
#[async_trait::async_trait]
pub trait Saver: Send + Sync {
    /// Saves `payload` as `file_name`; returns where it ended up.
    async fn save(&self, payload: MediaPayload, file_name: &str) -> Result<String, WorkflowError>;
}

/// Saves payloads into a download directory.
///
/// The bytes are staged in a temporary file inside the directory, which is then
/// persisted under the final name. The staged file is released exactly once:
/// it either becomes the saved file or is deleted when the save fails.
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

#[async_trait::async_trait]
impl Saver for DirectorySaver {
    async fn save(&self, payload: MediaPayload, file_name: &str) -> Result<String, WorkflowError> {
        let dir = self.dir.clone();
        let file_name = file_name.to_string();
        let saved = tokio::task::spawn_blocking(move || save_into(&dir, &payload, &file_name))
            .await
            .map_err(|err| WorkflowError::Save(err.to_string()))??;
        session_info!("Saved payload to {:?}", saved);
        Ok(saved.display().to_string())
    }
}

/// Ensure the download directory exists; create if missing.
fn ensure_download_dir(dir: &Path) -> Result<(), WorkflowError> {
    if dir.exists() {
        if !fs::metadata(dir)?.is_dir() {
            return Err(WorkflowError::Save(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
    } else {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn save_into(dir: &Path, payload: &MediaPayload, file_name: &str) -> Result<PathBuf, WorkflowError> {
    ensure_download_dir(dir)?;

    let target = dir.join(file_name);
    let mut staged = NamedTempFile::new_in(dir)?;
    session_debug!(
        "Staged {} bytes ({}) at {:?}",
        payload.len(),
        payload.mime_type(),
        staged.path()
    );
    staged.write_all(payload.bytes())?;
    staged.flush()?;
    staged.as_file_mut().sync_all()?;

    // Replace existing file if present so repeated saves overwrite.
    if target.exists() {
        fs::remove_file(&target)?;
    }
    staged
        .persist(&target)
        .map_err(|err| WorkflowError::from(err.error))?;
    Ok(target)
}
