use crate::{CoreResult, PochiError, paths};

use std::{
    cmp::Ordering,
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use tracing::debug;

/// One audio file found in the Pochi Directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingFile {
    /// Full path of the file.
    pub path: PathBuf,
    /// File name including extension.
    pub name: String,
    /// Creation time; modification time when the filesystem does not record
    /// creation; [`RecordingFile::UNKNOWN_TIME`] when neither is available.
    pub created_at: DateTime<Utc>,
    /// Size in bytes.
    pub size: u64,
}

impl RecordingFile {
    /// Sentinel for an unavailable timestamp. Sorts after every real file.
    pub const UNKNOWN_TIME: DateTime<Utc> = DateTime::<Utc>::MIN_UTC;

    /// Build from already-fetched metadata.
    pub fn from_metadata(path: PathBuf, metadata: &fs::Metadata) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let created_at = metadata
            .created()
            .or_else(|_| metadata.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or(Self::UNKNOWN_TIME);

        Self {
            path,
            name,
            created_at,
            size: metadata.len(),
        }
    }

    /// Whether `created_at` holds a real timestamp.
    pub fn has_known_time(&self) -> bool {
        self.created_at != Self::UNKNOWN_TIME
    }

    /// Newest first; equal timestamps fall back to name, descending.
    pub fn newest_first(a: &Self, b: &Self) -> Ordering {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.name.cmp(&a.name))
    }
}

/// All visible recognized audio files in `dir`, newest first.
///
/// Entries that vanish while the directory is being read are skipped.
#[track_caller]
pub fn scan_recordings(dir: &Path) -> CoreResult<Vec<RecordingFile>> {
    paths::ensure_dir(dir)?;

    let entries = fs::read_dir(dir).map_err(|e| PochiError::io_at(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!(error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };

        let path = entry.path();
        if !paths::is_listed_recording(&path) {
            continue;
        }

        let metadata = match fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => continue,
            Err(e) => {
                debug!(path = ?path, error = %e, "Recording disappeared during scan");
                continue;
            }
        };

        files.push(RecordingFile::from_metadata(path, &metadata));
    }

    files.sort_by(RecordingFile::newest_first);

    Ok(files)
}
