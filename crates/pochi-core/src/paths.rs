//! Well-known locations shared by the recorder and the tool-server.

use crate::{CoreResult, PochiError};

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::UserDirs;
use tracing::debug;

/// Folder name of the Pochi Directory inside the user's music folder.
pub const POCHI_DIR_NAME: &str = "Pochi";

/// Hidden status document kept next to the recordings.
pub const STATUS_FILE_NAME: &str = ".pochi-status.json";

/// Audio extensions recognized by every directory scan (compared case-insensitively).
pub const AUDIO_EXTENSIONS: [&str; 3] = ["m4a", "mp3", "wav"];

/// Default Pochi Directory: `<music dir>/Pochi`, or `<home>/Music/Pochi`.
pub fn default_recordings_dir() -> PathBuf {
    match UserDirs::new() {
        Some(dirs) => match dirs.audio_dir() {
            Some(music) => music.join(POCHI_DIR_NAME),
            None => dirs.home_dir().join("Music").join(POCHI_DIR_NAME),
        },
        None => std::env::temp_dir().join(POCHI_DIR_NAME),
    }
}

/// Path of the status document inside a Pochi Directory.
pub fn status_path(recordings_dir: &Path) -> PathBuf {
    recordings_dir.join(STATUS_FILE_NAME)
}

/// Hidden folder inside the Pochi Directory holding the subscriber sockets.
pub const CHANNEL_DIR_NAME: &str = ".pochi-channel";

/// Directory holding one datagram socket per command-channel subscriber.
///
/// Derived from the Pochi Directory alone, which both processes read from the
/// same config file, so the rendezvous survives a stripped environment.
pub fn channel_dir(recordings_dir: &Path) -> PathBuf {
    recordings_dir.join(CHANNEL_DIR_NAME)
}

/// Create `dir` (and parents) if it does not exist yet.
#[track_caller]
pub fn ensure_dir(dir: &Path) -> CoreResult<()> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| PochiError::io_at(dir, e))?;
        debug!(dir = ?dir, "Created directory");
    }
    Ok(())
}

/// True when `path` has one of [`AUDIO_EXTENSIONS`].
pub fn is_recognized_audio(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            AUDIO_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// True for dot-prefixed names such as `.pochi-status.json` or macOS `._`
/// AppleDouble companions.
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

/// True for files every listing shows: visible and recognized audio.
pub fn is_listed_recording(path: &Path) -> bool {
    !is_hidden(path) && is_recognized_audio(path)
}
