//! Recoverable deletion.
//!
//! Recordings are never unlinked. They are moved into the user's trash so they
//! can be restored from the file manager.

use std::{fs, io, path::Path};

use tracing::info;

/// Destination for deleted recordings.
pub trait Trash: Send + Sync {
    /// Move `path` into the trash.
    ///
    /// A missing `path` must be reported as [`io::ErrorKind::NotFound`].
    fn trash(&self, path: &Path) -> io::Result<()>;
}

/// The platform trash.
///
/// On macOS the move goes through Finder, which records the original
/// location so "Put Back" works. Elsewhere the freedesktop home trash is used,
/// with a `.trashinfo` record for "Restore".
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTrash;

impl Trash for SystemTrash {
    fn trash(&self, path: &Path) -> io::Result<()> {
        // The platform backends report a missing file as an opaque error.
        let metadata = fs::symlink_metadata(path)?;
        if metadata.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "refusing to trash a directory",
            ));
        }

        trash::delete(path).map_err(io::Error::other)?;

        info!(path = ?path, "Moved to trash");

        Ok(())
    }
}
