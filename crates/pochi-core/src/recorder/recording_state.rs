use std::{path::PathBuf, time::Instant};

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Recording state owned by the recorder loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingState {
    /// Not currently recording.
    Idle,
    /// Currently recording audio.
    Recording {
        /// File name inside the Pochi Directory.
        file: String,
        /// Full path being written.
        path: PathBuf,
        /// Wall-clock start, as published in the status document.
        started_at: DateTime<Utc>,
        /// Monotonic start, for the elapsed timer.
        started: Instant,
        /// Unique session ID for log correlation.
        session_id: Uuid,
    },
}

impl RecordingState {
    /// Whether this is [`RecordingState::Recording`].
    pub fn is_recording(&self) -> bool {
        matches!(self, RecordingState::Recording { .. })
    }
}
