use crate::{
    CommandBus, CommandEvent, ConfirmPolicy, LocalBus, RecordingLibrary, RecordingStatus,
    StatusStore, ToolDispatcher,
    tests::fixtures::{DirTrash, RecordingPoster, touch, touch_in_order},
};

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::Utc;
use serde_json::{Map, Value, json};
use tempfile::TempDir;

const FAST_CONFIRM: ConfirmPolicy = ConfirmPolicy {
    interval: Duration::from_millis(10),
    attempts: 5,
};

struct Harness {
    dir: TempDir,
    _trash: TempDir,
    poster: RecordingPoster,
    dispatcher: ToolDispatcher,
}

#[allow(clippy::unwrap_used)]
fn harness() -> Harness {
    let dir = TempDir::new().unwrap();
    let trash = TempDir::new().unwrap();
    let poster = RecordingPoster::default();
    let trash_can = DirTrash {
        dir: trash.path().to_path_buf(),
    };
    let dispatcher = ToolDispatcher::new(
        RecordingLibrary::with_trash(dir.path(), Arc::new(trash_can)),
        StatusStore::in_dir(dir.path()),
        Arc::new(poster.clone()),
    )
    .with_confirm_policy(FAST_CONFIRM);

    Harness {
        dir,
        _trash: trash,
        poster,
        dispatcher,
    }
}

fn args(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// WHAT: Status before any recording reports that none is available
/// WHY: The tool-server must not guess when the recorder never ran
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_no_status_document_when_getting_status_then_no_status_available() {
    // Given: A fresh directory
    let h = harness();

    // When: Asking for status
    let response = h.dispatcher.call("get_recording_status", &Map::new()).await;

    // Then: Informational, not an error
    assert!(!response.is_error);
    assert!(response.text.starts_with("No status available."));
}

/// WHAT: Status renders recording state and file
/// WHY: Agents report this back to the user
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_recording_status_when_getting_status_then_lines_rendered() {
    // Given: The recorder published an active recording
    let h = harness();
    StatusStore::in_dir(h.dir.path())
        .try_write(&RecordingStatus::recording("20260205-01.wav", Utc::now()))
        .unwrap();

    // When: Asking for status
    let response = h.dispatcher.call("get_recording_status", &Map::new()).await;

    // Then: All three lines present
    let lines: Vec<_> = response.text.lines().collect();
    assert_eq!(lines[0], "Recording: Yes");
    assert_eq!(lines[1], "Current file: 20260205-01.wav");
    assert!(lines[2].starts_with("Started at: "));
}

/// WHAT: With no listener a start command resolves as unconfirmed within the bound
/// WHY: The tool-server must never hang waiting for a recorder
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_no_recorder_when_starting_then_unconfirmed_within_timeout() {
    // Given: No recorder is running
    let h = harness();
    let started = Instant::now();

    // When: Starting a recording
    let response = h.dispatcher.call("start_recording", &Map::new()).await;

    // Then: Soft result, posted once, bounded wait
    assert!(!response.is_error);
    assert_eq!(
        response.text,
        "Recording command sent, but could not confirm. Is the Pochi recorder running?"
    );
    assert_eq!(h.poster.posted(), vec![CommandEvent::StartRecording]);
    assert!(started.elapsed() < Duration::from_secs(2));
}

/// WHAT: A stop against a stale "recording" document resolves as unconfirmed
/// WHY: A crashed recorder leaves `isRecording` set and nobody to answer
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_stale_recording_status_and_no_recorder_when_stopping_then_unconfirmed() {
    // Given: Status says recording, but no recorder is listening
    let h = harness();
    StatusStore::in_dir(h.dir.path())
        .try_write(&RecordingStatus::recording("20260205-04.wav", Utc::now()))
        .unwrap();
    let started = Instant::now();

    // When: Stopping
    let response = h.dispatcher.call("stop_recording", &Map::new()).await;

    // Then: Soft result, posted once, bounded wait
    assert!(!response.is_error);
    assert_eq!(response.text, "Stop command sent, but could not confirm.");
    assert_eq!(h.poster.posted(), vec![CommandEvent::StopRecording]);
    assert!(started.elapsed() < Duration::from_secs(2));
}

/// WHAT: A zero-attempt policy still reads the status once
/// WHY: A recorder that already answered must be reported as confirmed
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_zero_attempt_policy_when_recorder_answered_then_confirmed() {
    // Given: A recorder that answers synchronously on post
    let dir = TempDir::new().unwrap();
    let bus = LocalBus::new();
    let mut subscription = bus.subscribe().unwrap();
    let recorder_store = StatusStore::in_dir(dir.path());
    let recorder = tokio::spawn(async move {
        if subscription.recv().await == Some(CommandEvent::StartRecording) {
            recorder_store.write(&RecordingStatus::recording("20260205-05.wav", Utc::now()));
        }
    });
    let dispatcher = ToolDispatcher::new(
        RecordingLibrary::new(dir.path()),
        StatusStore::in_dir(dir.path()),
        Arc::new(bus),
    )
    .with_confirm_policy(ConfirmPolicy {
        interval: Duration::from_millis(200),
        attempts: 0,
    });

    // When: Starting
    let response = dispatcher.call("start_recording", &Map::new()).await;

    // Then: The single read sees the recorder's answer
    assert_eq!(response.text, "Recording started: 20260205-05.wav");
    recorder.await.unwrap();
}

/// WHAT: Start while already recording succeeds without posting
/// WHY: The precheck makes control tools idempotent
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_active_recording_when_starting_then_already_recording_without_post() {
    // Given: Status says a recording is running
    let h = harness();
    StatusStore::in_dir(h.dir.path())
        .try_write(&RecordingStatus::recording("20260205-02.wav", Utc::now()))
        .unwrap();

    // When: Starting again
    let response = h.dispatcher.call("start_recording", &Map::new()).await;

    // Then: Reported as already recording, nothing posted
    assert_eq!(response.text, "Already recording: 20260205-02.wav");
    assert!(h.poster.posted().is_empty());
}

/// WHAT: Stop while idle succeeds without posting
/// WHY: The precheck makes control tools idempotent
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_idle_status_when_stopping_then_not_recording_without_post() {
    // Given: Status says idle
    let h = harness();
    StatusStore::in_dir(h.dir.path())
        .try_write(&RecordingStatus::idle(None))
        .unwrap();

    // When: Stopping
    let response = h.dispatcher.call("stop_recording", &Map::new()).await;

    // Then: Nothing to do
    assert_eq!(response.text, "Not currently recording.");
    assert!(h.poster.posted().is_empty());
}

/// WHAT: A listening recorder confirms the start through the status document
/// WHY: This is the full cross-process handshake, in one process
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_listening_recorder_when_starting_then_confirmed_with_file_name() {
    // Given: A stand-in recorder subscribed to an in-process bus
    let dir = TempDir::new().unwrap();
    let bus = LocalBus::new();
    let mut subscription = bus.subscribe().unwrap();
    let recorder_store = StatusStore::in_dir(dir.path());
    let recorder = tokio::spawn(async move {
        if subscription.recv().await == Some(CommandEvent::StartRecording) {
            recorder_store.write(&RecordingStatus::recording("20260205-01.wav", Utc::now()));
        }
    });
    let dispatcher = ToolDispatcher::new(
        RecordingLibrary::new(dir.path()),
        StatusStore::in_dir(dir.path()),
        Arc::new(bus),
    )
    .with_confirm_policy(ConfirmPolicy {
        interval: Duration::from_millis(20),
        attempts: 100,
    });

    // When: Starting a recording
    let response = dispatcher.call("start_recording", &Map::new()).await;

    // Then: Confirmed with the recorder's file name
    assert_eq!(response.text, "Recording started: 20260205-01.wav");
    recorder.await.unwrap();
}

/// WHAT: List with limit 1 over three files shows the newest and the remainder
/// WHY: Truncation must be visible to the agent
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_three_recordings_when_listing_with_limit_one_then_and_two_more() {
    // Given: Three recordings
    let h = harness();
    touch_in_order(
        h.dir.path(),
        &["20260205-01.m4a", "20260205-02.m4a", "20260205-03.m4a"],
    );

    // When: Listing with limit 1
    let response = h
        .dispatcher
        .call("list_recordings", &args(json!({ "limit": 1 })))
        .await;

    // Then: Header, newest file, remainder
    let lines: Vec<_> = response.text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "Found 3 recording(s):");
    assert!(lines[1].starts_with("  20260205-03.m4a  (0.0 MB, "));
    assert_eq!(lines[2], "  ... and 2 more");
}

/// WHAT: Limit accepts numeric strings and floats and rejects values below one
/// WHY: Agents send loosely typed arguments
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_loosely_typed_limits_when_listing_then_parsed_or_rejected() {
    // Given: Two recordings
    let h = harness();
    touch_in_order(h.dir.path(), &["a.m4a", "b.m4a"]);

    // When: Listing with various limits
    let as_string = h
        .dispatcher
        .call("list_recordings", &args(json!({ "limit": "1" })))
        .await;
    let as_float = h
        .dispatcher
        .call("list_recordings", &args(json!({ "limit": 1.9 })))
        .await;
    let zero = h
        .dispatcher
        .call("list_recordings", &args(json!({ "limit": 0 })))
        .await;
    let garbage = h
        .dispatcher
        .call("list_recordings", &args(json!({ "limit": "lots" })))
        .await;

    // Then: Strings and floats truncate to 1; zero and garbage are errors
    assert!(as_string.text.ends_with("  ... and 1 more"));
    assert!(as_float.text.ends_with("  ... and 1 more"));
    assert!(zero.is_error);
    assert!(garbage.is_error);
}

/// WHAT: Empty folder lists as "No recordings found."
/// WHY: Distinguishes an empty folder from an error
#[tokio::test]
async fn given_empty_directory_when_listing_then_no_recordings_found() {
    // Given: No recordings
    let h = harness();

    // When: Listing
    let response = h.dispatcher.call("list_recordings", &Map::new()).await;

    // Then
    assert!(!response.is_error);
    assert_eq!(response.text, "No recordings found.");
}

/// WHAT: Deleting a missing file is a not-found error
/// WHY: Agents must learn the name was wrong
#[tokio::test]
async fn given_missing_file_when_deleting_then_not_found_error() {
    // Given: An empty directory
    let h = harness();

    // When: Deleting a missing file
    let response = h
        .dispatcher
        .call("delete_recording", &args(json!({ "filename": "missing.m4a" })))
        .await;

    // Then
    assert!(response.is_error);
    assert_eq!(response.text, "File not found: missing.m4a");
}

/// WHAT: Delete reports the trashed file
/// WHY: The agent confirms the action to the user
#[tokio::test]
async fn given_recording_when_deleting_then_moved_to_trash() {
    // Given: One recording
    let h = harness();
    touch(h.dir.path(), "20260205-01.m4a");

    // When: Deleting it
    let response = h
        .dispatcher
        .call("delete_recording", &args(json!({ "filename": "20260205-01.m4a" })))
        .await;

    // Then
    assert!(!response.is_error);
    assert_eq!(response.text, "Moved to Trash: 20260205-01.m4a");
    assert!(!h.dir.path().join("20260205-01.m4a").exists());
}

/// WHAT: Rename reports old and new names; traversal is an invalid filename
/// WHY: File arguments must stay inside the Pochi Directory
#[tokio::test]
async fn given_rename_requests_when_calling_then_renamed_or_rejected() {
    // Given: One recording
    let h = harness();
    touch(h.dir.path(), "20260205-01.m4a");

    // When: Renaming it, then addressing a file outside the directory
    let renamed = h
        .dispatcher
        .call(
            "rename_recording",
            &args(json!({ "filename": "20260205-01.m4a", "new_name": "Standup" })),
        )
        .await;
    let escaped = h
        .dispatcher
        .call(
            "rename_recording",
            &args(json!({ "filename": "../outside.m4a", "new_name": "x" })),
        )
        .await;

    // Then
    assert_eq!(renamed.text, "Renamed: 20260205-01.m4a -> Standup.m4a");
    assert!(escaped.is_error);
    assert_eq!(escaped.text, "Invalid filename: '../outside.m4a'");
}

/// WHAT: Missing and mistyped arguments are reported by name
/// WHY: Agents correct their call from the message
#[tokio::test]
async fn given_missing_argument_when_calling_then_missing_parameter_error() {
    // Given: A dispatcher
    let h = harness();

    // When: Calling without required arguments
    let info = h.dispatcher.call("get_recording_info", &Map::new()).await;
    let rename = h
        .dispatcher
        .call("rename_recording", &args(json!({ "filename": "a.m4a" })))
        .await;
    let search = h
        .dispatcher
        .call("search_recordings", &args(json!({ "query": 42 })))
        .await;

    // Then
    assert!(info.is_error);
    assert_eq!(info.text, "Missing required parameter: filename");
    assert_eq!(rename.text, "Missing required parameter: new_name");
    assert!(search.is_error);
}

/// WHAT: Search reports matches or a friendly miss
/// WHY: Both outcomes are normal
#[tokio::test]
async fn given_recordings_when_searching_then_matches_or_none() {
    // Given: Two recordings
    let h = harness();
    touch_in_order(h.dir.path(), &["Standup.m4a", "Retro.m4a"]);

    // When: Searching for a hit and a miss
    let hit = h
        .dispatcher
        .call("search_recordings", &args(json!({ "query": "stand" })))
        .await;
    let miss = h
        .dispatcher
        .call("search_recordings", &args(json!({ "query": "demo" })))
        .await;

    // Then
    assert!(hit.text.starts_with("Found 1 matching recording(s):\n  Standup.m4a  ("));
    assert_eq!(miss.text, "No recordings matching 'demo'.");
}

/// WHAT: Info lists file, size and an unknown duration for unparseable media
/// WHY: Duration failure degrades instead of failing
#[tokio::test]
async fn given_unparseable_recording_when_getting_info_then_duration_unknown() {
    // Given: A recording that is not real audio
    let h = harness();
    touch(h.dir.path(), "fake.m4a");

    // When: Getting info
    let response = h
        .dispatcher
        .call("get_recording_info", &args(json!({ "filename": "fake.m4a" })))
        .await;

    // Then
    assert!(!response.is_error);
    let lines: Vec<_> = response.text.lines().collect();
    assert_eq!(lines[0], "File: fake.m4a");
    assert_eq!(lines[1], "Size: 0.00 MB");
    assert_eq!(lines.last().copied(), Some("Duration: unknown"));
}

/// WHAT: Unknown tools are an error response
/// WHY: The transport must still answer
#[tokio::test]
async fn given_unknown_tool_when_calling_then_error_response() {
    // Given: A dispatcher
    let h = harness();

    // When: Calling a tool that does not exist
    let response = h.dispatcher.call("format_disk", &Map::new()).await;

    // Then
    assert!(response.is_error);
    assert_eq!(response.text, "Unknown tool: format_disk");
}
