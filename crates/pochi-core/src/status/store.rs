//! File-backed status store.
//!
//! The recorder is the only writer; any process may read. Writes go through a
//! temp file that is renamed over the document, so readers see either the old
//! or the new document and never a torn one.

use crate::{CoreResult, PochiError, paths, status::RecordingStatus};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use tracing::{debug, instrument, warn};

/// Reads and writes the status document at a fixed path.
#[derive(Debug, Clone)]
pub struct StatusStore {
    path: PathBuf,
}

impl StatusStore {
    /// Store for the document at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store for the standard document inside a Pochi Directory.
    pub fn in_dir(recordings_dir: &Path) -> Self {
        Self::new(paths::status_path(recordings_dir))
    }

    /// Location of the status document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the document. Failures are logged and otherwise ignored:
    /// status is advisory and must never block the recording itself.
    pub fn write(&self, status: &RecordingStatus) {
        if let Err(e) = self.try_write(status) {
            warn!(path = ?self.path, error = %e, "Failed to write status document");
        }
    }

    /// Overwrite the document atomically, reporting failures.
    #[track_caller]
    #[instrument(skip(self), fields(path = ?self.path))]
    pub fn try_write(&self, status: &RecordingStatus) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            paths::ensure_dir(parent)?;
        }

        let contents =
            serde_json::to_vec_pretty(status).map_err(|e| PochiError::Serialization {
                reason: format!("Failed to encode status: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let temp_path = self.temp_path();

        let mut temp_file =
            fs::File::create(&temp_path).map_err(|e| PochiError::io_at(&temp_path, e))?;
        temp_file
            .write_all(&contents)
            .map_err(|e| PochiError::io_at(&temp_path, e))?;
        temp_file
            .sync_all()
            .map_err(|e| PochiError::io_at(&temp_path, e))?;

        fs::rename(&temp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            PochiError::io_at(&self.path, e)
        })?;

        debug!(is_recording = status.is_recording, "Status document written");

        Ok(())
    }

    /// Current status, or `None` when the document is missing or unreadable.
    pub fn read(&self) -> Option<RecordingStatus> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(path = ?self.path, error = %e, "Status document unavailable");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(status) => Some(status),
            Err(e) => {
                debug!(path = ?self.path, error = %e, "Status document malformed");
                None
            }
        }
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| paths::STATUS_FILE_NAME.to_string());
        self.path
            .with_file_name(format!("{}.{}.tmp", name, std::process::id()))
    }
}
