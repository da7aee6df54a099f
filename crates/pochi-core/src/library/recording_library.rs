use crate::{
    CoreResult, PochiError,
    library::{
        RecordingFile, SystemTrash, Trash, read_duration, sanitize_name, scan_recordings,
        validate_file_name,
    },
    paths,
};

use std::{
    fs, io,
    panic::Location,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use error_location::ErrorLocation;
use tracing::{info, instrument};

/// Default number of entries returned by a listing.
pub const DEFAULT_LIST_LIMIT: usize = 20;

/// Options for [`RecordingLibrary::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFilter {
    /// Maximum number of files returned.
    pub limit: usize,
    /// Only include files whose name starts with this (e.g. `20260205`).
    pub date_prefix: Option<String>,
}

impl Default for ListFilter {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIST_LIMIT,
            date_prefix: None,
        }
    }
}

/// Result of a listing: the first `limit` files plus the total matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    /// Number of files that matched before truncation.
    pub total: usize,
    /// Returned files, newest first.
    pub files: Vec<RecordingFile>,
}

impl Listing {
    /// Matches left out because of the limit.
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.files.len())
    }
}

/// Details for a single recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingInfo {
    /// File metadata.
    pub file: RecordingFile,
    /// Media duration, if it could be read.
    pub duration: Option<Duration>,
}

/// File-management operations on the Pochi Directory.
///
/// Every operation works from a fresh directory read. File name arguments must
/// be bare names of recognized audio files; nothing outside the directory can
/// be addressed.
#[derive(Clone)]
pub struct RecordingLibrary {
    dir: PathBuf,
    trash: Arc<dyn Trash>,
}

impl RecordingLibrary {
    /// Library over `dir`, deleting into the user's trash.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_trash(dir, Arc::new(SystemTrash))
    }

    /// Library over `dir` with an explicit trash.
    pub fn with_trash(dir: impl Into<PathBuf>, trash: Arc<dyn Trash>) -> Self {
        Self {
            dir: dir.into(),
            trash,
        }
    }

    /// The Pochi Directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Recordings newest first, optionally filtered by date prefix and capped.
    #[instrument(skip(self))]
    pub fn list(&self, filter: &ListFilter) -> CoreResult<Listing> {
        let matching: Vec<RecordingFile> = scan_recordings(&self.dir)?
            .into_iter()
            .filter(|file| match &filter.date_prefix {
                Some(prefix) => file.name.starts_with(prefix.as_str()),
                None => true,
            })
            .collect();

        let total = matching.len();
        let files = matching.into_iter().take(filter.limit).collect();

        Ok(Listing { total, files })
    }

    /// Recordings whose name contains `query`, ignoring case, newest first.
    #[instrument(skip(self))]
    pub fn search(&self, query: &str) -> CoreResult<Vec<RecordingFile>> {
        let needle = query.to_lowercase();
        Ok(scan_recordings(&self.dir)?
            .into_iter()
            .filter(|file| file.name.to_lowercase().contains(&needle))
            .collect())
    }

    /// Size, timestamp and (best-effort) duration of one recording.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn info(&self, name: &str) -> CoreResult<RecordingInfo> {
        let path = self.existing(name)?;

        let metadata = fs::metadata(&path).map_err(|e| self.map_race(name, &path, e))?;
        let file = RecordingFile::from_metadata(path, &metadata);
        let duration = read_duration(&file.path);

        Ok(RecordingInfo { file, duration })
    }

    /// Rename a recording, keeping its extension. Returns the new file name.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn rename(&self, name: &str, new_name: &str) -> CoreResult<String> {
        let old_path = self.existing(name)?;

        let sanitized = sanitize_name(new_name).ok_or_else(|| PochiError::InvalidInput {
            reason: "Invalid new name.".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let new_file_name = match old_path.extension() {
            Some(ext) => format!("{}.{}", sanitized, ext.to_string_lossy()),
            None => sanitized,
        };
        let new_path = self.dir.join(&new_file_name);

        if new_path.exists() {
            return Err(PochiError::Conflict {
                name: new_file_name,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        fs::rename(&old_path, &new_path).map_err(|e| self.map_race(name, &old_path, e))?;

        info!(from = %name, to = %new_file_name, "Recording renamed");

        Ok(new_file_name)
    }

    /// Move a recording to the trash.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn delete(&self, name: &str) -> CoreResult<()> {
        let path = self.existing(name)?;

        self.trash
            .trash(&path)
            .map_err(|e| self.map_race(name, &path, e))?;

        info!(file = %name, "Recording moved to trash");

        Ok(())
    }

    #[track_caller]
    fn existing(&self, name: &str) -> CoreResult<PathBuf> {
        validate_file_name(name)?;
        paths::ensure_dir(&self.dir)?;

        let path = self.dir.join(name);
        if !paths::is_listed_recording(&path) || !path.is_file() {
            return Err(PochiError::not_found(name));
        }
        Ok(path)
    }

    /// A file that vanished between the existence check and the operation is
    /// reported as not found.
    #[track_caller]
    fn map_race(&self, name: &str, path: &Path, e: io::Error) -> PochiError {
        if e.kind() == io::ErrorKind::NotFound {
            PochiError::not_found(name)
        } else {
            PochiError::io_at(path, e)
        }
    }
}
