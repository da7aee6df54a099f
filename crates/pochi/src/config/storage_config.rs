use std::path::PathBuf;

use pochi_core::paths::default_recordings_dir;
use serde::{Deserialize, Serialize};

/// Where recordings live.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Pochi Directory override (None = `<music dir>/Pochi`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recordings_dir: Option<PathBuf>,
}

impl StorageConfig {
    /// The configured directory, or the default one.
    pub fn recordings_dir(&self) -> PathBuf {
        self.recordings_dir
            .clone()
            .unwrap_or_else(default_recordings_dir)
    }
}
