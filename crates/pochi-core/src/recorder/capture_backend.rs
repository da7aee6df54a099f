use crate::CoreResult;

use std::path::Path;

/// Source of audio written to a recording file.
///
/// Not required to be `Send`: some audio backends pin their stream to the
/// thread that created it, so the recorder keeps its backend on one thread.
pub trait CaptureBackend {
    /// Extension of the files this backend writes, without the dot.
    fn extension(&self) -> &'static str;

    /// Begin capturing into a new file at `path`.
    fn start(&mut self, path: &Path) -> CoreResult<()>;

    /// Stop capturing and finalize the file. Calling it while stopped is a
    /// no-op.
    fn stop(&mut self) -> CoreResult<()>;

    /// Peak input level in `0.0..=1.0` since the previous call.
    fn take_level(&self) -> f32;

    /// Whether the running capture died on its own.
    fn has_failed(&self) -> bool;
}
