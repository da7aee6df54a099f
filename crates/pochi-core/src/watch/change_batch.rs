use std::path::PathBuf;

/// Coalesced filesystem changes observed in a watched directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeBatch {
    /// Paths reported by the OS, deduplicated.
    pub paths: Vec<PathBuf>,
    /// Set when the backend reported an error or an event without reliable
    /// paths. Consumers must rescan regardless of `paths`.
    pub rescan: bool,
}

impl ChangeBatch {
    pub(crate) fn add_paths(&mut self, paths: Vec<PathBuf>) {
        for path in paths {
            if !self.paths.contains(&path) {
                self.paths.push(path);
            }
        }
    }

    pub(crate) fn mark_rescan(&mut self) {
        self.rescan = true;
    }

    /// True when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && !self.rescan
    }
}
