//! Directory-level change observer for the recordings folder.
//!
//! The recorder learns about files the tool-server renamed or deleted only
//! through this watch. Raw OS events are coalesced into [`ChangeBatch`]es and
//! handed to the owner of the recording registry, which rescans.

use crate::{CoreResult, PochiError, paths, watch::ChangeBatch};

use std::{
    panic::Location,
    path::{Path, PathBuf},
    time::Duration,
};

use error_location::ErrorLocation;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::{sync::mpsc, task::JoinHandle, time::Instant};
use tracing::{debug, info, instrument};

/// Window during which raw events are merged into a single batch.
const COALESCE_WINDOW: Duration = Duration::from_millis(150);

/// Batches buffered for a slow consumer before the forwarder waits.
const BATCH_BUFFER: usize = 16;

enum RawChange {
    Paths(Vec<PathBuf>),
    Rescan,
}

/// Active watch on one directory.
///
/// Must be created inside a Tokio runtime. Dropping the watch cancels it.
pub struct DirectoryWatch {
    dir: PathBuf,
    watcher: Option<RecommendedWatcher>,
    forwarder: Option<JoinHandle<()>>,
}

impl DirectoryWatch {
    /// Watch `dir` (created first if missing) and return the batch stream.
    #[track_caller]
    #[instrument]
    pub fn subscribe(dir: &Path) -> CoreResult<(Self, mpsc::Receiver<ChangeBatch>)> {
        paths::ensure_dir(dir)?;

        let (raw_tx, raw_rx) = mpsc::unbounded_channel::<RawChange>();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let change = match res {
                Ok(event) => match event.kind {
                    EventKind::Access(_) => return,
                    // Backends report `Other` when details are unreliable (overflow).
                    EventKind::Other => RawChange::Rescan,
                    _ if event.paths.is_empty() => RawChange::Rescan,
                    _ => RawChange::Paths(event.paths),
                },
                Err(e) => {
                    debug!(error = %e, "Directory watcher error");
                    RawChange::Rescan
                }
            };
            let _ = raw_tx.send(change);
        })
        .map_err(|e| PochiError::Watch {
            reason: format!("Failed to create watcher: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|e| PochiError::Watch {
                reason: format!("Failed to watch {:?}: {}", dir, e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let (batch_tx, batch_rx) = mpsc::channel(BATCH_BUFFER);
        let forwarder = tokio::spawn(coalesce(raw_rx, batch_tx));

        info!(dir = ?dir, "Watching recordings directory");

        Ok((
            Self {
                dir: dir.to_path_buf(),
                watcher: Some(watcher),
                forwarder: Some(forwarder),
            },
            batch_rx,
        ))
    }

    /// Watched directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether the watch is still running.
    pub fn is_active(&self) -> bool {
        self.watcher.is_some()
    }

    /// Stop watching and release the OS watcher. Idempotent.
    pub fn cancel(&mut self) {
        // Dropping the watcher drops the event callback and with it `raw_tx`,
        // which ends the forwarder on its own; abort covers a pending send.
        if self.watcher.take().is_some() {
            debug!(dir = ?self.dir, "Directory watch cancelled");
        }
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.abort();
        }
    }
}

impl Drop for DirectoryWatch {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn coalesce(
    mut raw_rx: mpsc::UnboundedReceiver<RawChange>,
    batch_tx: mpsc::Sender<ChangeBatch>,
) {
    while let Some(first) = raw_rx.recv().await {
        let mut batch = ChangeBatch::default();
        absorb(&mut batch, first);

        let deadline = Instant::now() + COALESCE_WINDOW;
        let mut closed = false;
        loop {
            match tokio::time::timeout_at(deadline, raw_rx.recv()).await {
                Ok(Some(change)) => absorb(&mut batch, change),
                Ok(None) => {
                    closed = true;
                    break;
                }
                Err(_) => break,
            }
        }

        debug!(
            paths = batch.paths.len(),
            rescan = batch.rescan,
            "Directory change batch"
        );

        if batch_tx.send(batch).await.is_err() || closed {
            break;
        }
    }
}

fn absorb(batch: &mut ChangeBatch, change: RawChange) {
    match change {
        RawChange::Paths(paths) => batch.add_paths(paths),
        RawChange::Rescan => batch.mark_rescan(),
    }
}
