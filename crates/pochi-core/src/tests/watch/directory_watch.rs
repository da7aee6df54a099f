use crate::{ChangeBatch, DirectoryWatch, tests::fixtures::touch};

use std::time::Duration;

use tempfile::TempDir;
use tokio::{sync::mpsc, time::timeout};

/// Receive batches until one mentions `name` or asks for a rescan.
async fn wait_for_change(rx: &mut mpsc::Receiver<ChangeBatch>, name: &str) -> bool {
    let wait = async {
        while let Some(batch) = rx.recv().await {
            let mentioned = batch
                .paths
                .iter()
                .any(|p| p.file_name().and_then(|n| n.to_str()) == Some(name));
            if mentioned || batch.rescan {
                return true;
            }
        }
        false
    };
    timeout(Duration::from_secs(5), wait).await.unwrap_or(false)
}

/// WHAT: Creating a file in the watched directory produces a batch
/// WHY: The recorder must notice files created by other processes
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_watch_when_file_created_then_batch_delivered() {
    // Given: A watch on an empty directory
    let dir = TempDir::new().unwrap();
    let (_watch, mut rx) = DirectoryWatch::subscribe(dir.path()).unwrap();

    // When: A recording appears
    touch(dir.path(), "20260205-01.m4a");

    // Then: A batch mentioning it arrives
    assert!(wait_for_change(&mut rx, "20260205-01.m4a").await);
}

/// WHAT: Renames made behind the recorder's back are observed
/// WHY: The tool-server renames files directly on disk
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_watch_when_file_renamed_then_batch_delivered() {
    // Given: A watched directory with one recording
    let dir = TempDir::new().unwrap();
    let original = touch(dir.path(), "20260205-01.m4a");
    let (_watch, mut rx) = DirectoryWatch::subscribe(dir.path()).unwrap();

    // When: The file is renamed
    std::fs::rename(&original, dir.path().join("Meeting.m4a")).unwrap();

    // Then: The change is reported
    assert!(wait_for_change(&mut rx, "Meeting.m4a").await);
}

/// WHAT: Watching a missing directory creates it
/// WHY: The recorder may start before anything was ever recorded
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_missing_directory_when_subscribing_then_directory_created() {
    // Given: A path that does not exist yet
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("Music").join("Pochi");

    // When: Subscribing
    let (watch, _rx) = DirectoryWatch::subscribe(&target).unwrap();

    // Then: The directory exists and the watch is active
    assert!(target.is_dir());
    assert!(watch.is_active());
    assert_eq!(watch.dir(), target.as_path());
}

/// WHAT: Cancel is idempotent and ends the batch stream
/// WHY: Shutdown paths may cancel more than once
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_active_watch_when_cancelled_twice_then_stream_ends() {
    // Given: An active watch
    let dir = TempDir::new().unwrap();
    let (mut watch, mut rx) = DirectoryWatch::subscribe(dir.path()).unwrap();

    // When: Cancelling twice
    watch.cancel();
    watch.cancel();

    // Then: The watch is inactive and the stream closes
    assert!(!watch.is_active());
    let next = timeout(Duration::from_secs(2), rx.recv()).await.unwrap();
    assert!(next.is_none());
}
