//! The recorder's view of the recordings on disk.

use crate::{CoreResult, library::scan_recordings};

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, instrument};
use uuid::Uuid;

/// A recording as shown by the recorder UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recording {
    /// Process-local identity; regenerated on every refresh, never persisted.
    pub id: Uuid,
    /// Location on disk. This, not `id`, is the recording's real identity.
    pub path: PathBuf,
    /// File name including extension.
    pub name: String,
    /// Creation time, or the "unknown" sentinel.
    pub created_at: DateTime<Utc>,
}

/// Ordered, derived listing of the Pochi Directory.
///
/// The filesystem is authoritative. [`RecordingRegistry::refresh`] throws away
/// the previous entries and rebuilds them from a fresh scan, so the registry
/// always equals "directory filtered to audio, newest first" as of the last
/// refresh, whatever other processes did in between.
#[derive(Debug)]
pub struct RecordingRegistry {
    dir: PathBuf,
    recordings: Vec<Recording>,
}

impl RecordingRegistry {
    /// Empty registry for `dir`. Call [`RecordingRegistry::refresh`] to populate.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            recordings: Vec::new(),
        }
    }

    /// Directory this registry mirrors.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Recompute from the directory. On error the previous entries are kept.
    #[instrument(skip(self), fields(dir = ?self.dir))]
    pub fn refresh(&mut self) -> CoreResult<&[Recording]> {
        let files = scan_recordings(&self.dir)?;

        self.recordings = files
            .into_iter()
            .map(|file| Recording {
                id: Uuid::new_v4(),
                path: file.path,
                name: file.name,
                created_at: file.created_at,
            })
            .collect();

        debug!(count = self.recordings.len(), "Recording registry refreshed");

        Ok(&self.recordings)
    }

    /// Current entries, newest first.
    pub fn recordings(&self) -> &[Recording] {
        &self.recordings
    }

    /// File names in display order.
    pub fn names(&self) -> Vec<String> {
        self.recordings.iter().map(|r| r.name.clone()).collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.recordings.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.recordings.is_empty()
    }
}
