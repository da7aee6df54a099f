use crate::{
    ConfirmPolicy, Recorder, RecorderSession, RecordingLibrary, RecordingStatus, SessionUpdate,
    SocketChannel, StatusStore, ToolDispatcher, Transition,
    library::scan_recordings,
    tests::fixtures::{DirTrash, FakeCapture, touch},
};

use std::{
    path::Path,
    sync::{Arc, atomic::Ordering},
    time::Duration,
};

use chrono::Utc;
use serde_json::{Map, Value, json};
use tempfile::TempDir;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
    time::timeout,
};

fn args(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[allow(clippy::unwrap_used)]
fn session(dir: &Path, capture: FakeCapture) -> RecorderSession<FakeCapture> {
    let recorder =
        Recorder::new(dir, capture, StatusStore::in_dir(dir)).without_sleep_prevention();
    RecorderSession::start(recorder, &SocketChannel::for_recordings(dir)).unwrap()
}

/// Drive `session` on its own task, reporting the registry after every
/// command and directory change, until `stop` fires.
fn drive(
    mut session: RecorderSession<FakeCapture>,
) -> (
    JoinHandle<RecorderSession<FakeCapture>>,
    mpsc::UnboundedReceiver<Vec<String>>,
    oneshot::Sender<()>,
) {
    let (names_tx, names_rx) = mpsc::unbounded_channel();
    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                update = session.step() => {
                    if matches!(update, SessionUpdate::Command { .. } | SessionUpdate::RecordingsChanged) {
                        let _ = names_tx.send(session.registry().names());
                    }
                }
                _ = &mut stop_rx => break,
            }
        }
        session
    });

    (handle, names_rx, stop_tx)
}

async fn wait_for_names(
    names_rx: &mut mpsc::UnboundedReceiver<Vec<String>>,
    want: &[&str],
) -> bool {
    let seen = timeout(Duration::from_secs(5), async {
        while let Some(names) = names_rx.recv().await {
            if names == want {
                return true;
            }
        }
        false
    })
    .await;
    seen.unwrap_or(false)
}

/// WHAT: Tool-server commands drive the real recorder through the socket
/// channel, and a rename by the tool-server reaches the registry through the
/// directory watch
/// WHY: This is the whole cross-process protocol: post, transition, status
/// write, confirmation, then an external mutation observed by the recorder
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[allow(clippy::unwrap_used)]
async fn given_running_session_when_tool_server_drives_it_then_registry_matches_directory() {
    // Given: A recorder session and a tool-server dispatcher on the same folder
    let dir = TempDir::new().unwrap();
    let trash = TempDir::new().unwrap();
    let capture = FakeCapture::default();
    let starts = Arc::clone(&capture.starts);
    let stops = Arc::clone(&capture.stops);
    let (driver, mut names_rx, stop_driver) = drive(session(dir.path(), capture));

    let dispatcher = ToolDispatcher::new(
        RecordingLibrary::with_trash(
            dir.path(),
            Arc::new(DirTrash {
                dir: trash.path().to_path_buf(),
            }),
        ),
        StatusStore::in_dir(dir.path()),
        Arc::new(SocketChannel::for_recordings(dir.path())),
    )
    .with_confirm_policy(ConfirmPolicy {
        interval: Duration::from_millis(20),
        attempts: 100,
    });

    // When: Starting and stopping through the tool-server
    let started = dispatcher.call("start_recording", &Map::new()).await;
    let stopped = dispatcher.call("stop_recording", &Map::new()).await;

    // Then: Both confirmed by the recorder's own status writes
    assert!(started.text.starts_with("Recording started: "), "{}", started.text);
    assert!(started.text.ends_with("-01.wav"), "{}", started.text);
    assert_eq!(stopped.text, "Recording stopped.");
    assert_eq!(starts.load(Ordering::SeqCst), 1);
    assert_eq!(stops.load(Ordering::SeqCst), 1);
    let file = started.text.trim_start_matches("Recording started: ").to_string();
    let status = StatusStore::in_dir(dir.path()).read().unwrap();
    assert!(!status.is_recording);
    assert_eq!(status.current_file.as_deref(), Some(file.as_str()));

    // When: The tool-server renames the new recording
    let renamed = dispatcher
        .call(
            "rename_recording",
            &args(json!({ "filename": file, "new_name": "Standup" })),
        )
        .await;

    // Then: The recorder's registry follows the directory
    assert_eq!(renamed.text, format!("Renamed: {} -> Standup.wav", file));
    assert!(wait_for_names(&mut names_rx, &["Standup.wav"]).await);

    stop_driver.send(()).unwrap();
    let mut session = driver.await.unwrap();
    let on_disk: Vec<String> = scan_recordings(dir.path())
        .unwrap()
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert_eq!(session.registry().names(), on_disk);
    assert_eq!(on_disk, vec!["Standup.wav"]);
    assert_eq!(session.shutdown().unwrap(), Transition::Unchanged);
}

/// WHAT: Starting a session clears a stale status and loads the registry
/// WHY: A crashed recorder may have left `isRecording` set
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_stale_status_and_recordings_when_starting_session_then_idle_and_listed() {
    // Given: A leftover "recording" document, one recording and a hidden companion
    let dir = TempDir::new().unwrap();
    StatusStore::in_dir(dir.path())
        .try_write(&RecordingStatus::recording("20260205-01.wav", Utc::now()))
        .unwrap();
    touch(dir.path(), "20260205-01.wav");
    touch(dir.path(), "._20260205-01.wav");

    // When: Starting the session
    let mut session = session(dir.path(), FakeCapture::default());

    // Then: Idle document, only the visible recording listed
    let status = StatusStore::in_dir(dir.path()).read().unwrap();
    assert!(!status.is_recording);
    assert_eq!(status.current_file.as_deref(), Some("20260205-01.wav"));
    assert_eq!(session.registry().names(), vec!["20260205-01.wav"]);
    session.shutdown().unwrap();
}

/// WHAT: A local toggle that stops a recording refreshes the registry
/// WHY: The finished file must appear in the menu without waiting for the watch
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_local_toggle_when_stopping_then_registry_has_new_file() {
    // Given: An empty folder
    let dir = TempDir::new().unwrap();
    let mut session = session(dir.path(), FakeCapture::default());
    assert!(session.registry().is_empty());

    // When: Toggling on and off
    let started = session.toggle().unwrap();
    let stopped = session.toggle().unwrap();

    // Then: The stop refreshed the registry with the new file
    let file = match &started {
        Transition::Started { file } => file.clone(),
        _ => String::new(),
    };
    assert!(matches!(started, Transition::Started { .. }));
    assert!(matches!(stopped, Transition::Stopped { abnormal: false, .. }));
    assert_eq!(session.registry().names(), vec![file]);
    assert!(!session.recorder().is_recording());
    session.shutdown().unwrap();
}

/// WHAT: A capture failure seen by a tick stops the recording through the session
/// WHY: The session must not stay in Recording after the stream died
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_failed_capture_when_stepping_then_capture_lost() {
    // Given: A recording whose capture then fails
    let dir = TempDir::new().unwrap();
    let capture = FakeCapture::default();
    let failed = Arc::clone(&capture.failed);
    let mut session = session(dir.path(), capture);
    session.toggle().unwrap();
    failed.store(true, Ordering::SeqCst);

    // When: Stepping until the failure is observed
    let lost = timeout(Duration::from_secs(5), async {
        loop {
            if let SessionUpdate::CaptureLost(transition) = session.step().await {
                return transition;
            }
        }
    })
    .await
    .unwrap();

    // Then: Abnormal stop, idle document
    assert!(matches!(lost, Transition::Stopped { abnormal: true, .. }));
    assert!(!session.recorder().is_recording());
    assert!(!StatusStore::in_dir(dir.path()).read().unwrap().is_recording);
    session.shutdown().unwrap();
}
