use crate::{CommandBus, CommandEvent, CommandPoster, SocketChannel, paths};

use std::{fs, os::unix::net::UnixDatagram, time::Duration};

use tempfile::TempDir;
use tokio::time::timeout;

fn socket_files(dir: &std::path::Path) -> Vec<std::path::PathBuf> {
    fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .map(|e| e.path())
                .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("sock"))
                .collect()
        })
        .unwrap_or_default()
}

/// WHAT: A datagram reaches a live subscriber
/// WHY: This is how the tool-server asks the recorder to act
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_live_subscriber_when_posting_then_event_delivered() {
    // Given: A subscriber bound in a private channel directory
    let dir = TempDir::new().unwrap();
    let channel = SocketChannel::new(dir.path().join("channel"));
    let mut subscription = channel.subscribe().unwrap();

    // When: Another handle on the same directory posts
    let poster = SocketChannel::new(channel.dir());
    let delivered = poster.post(CommandEvent::StartRecording).unwrap();

    // Then: The subscriber receives the event
    assert_eq!(delivered, 1);
    let received = timeout(Duration::from_secs(2), subscription.recv())
        .await
        .unwrap();
    assert_eq!(received, Some(CommandEvent::StartRecording));
}

/// WHAT: Both processes find the channel inside the recordings folder
/// WHY: A tool-server launched with a stripped environment must still reach
/// the recorder, so the location may depend on nothing but the shared folder
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_same_recordings_dir_when_building_channels_then_they_meet() {
    // Given: A recorder-side and a tool-server-side channel built independently
    let dir = TempDir::new().unwrap();
    let recorder_side = SocketChannel::for_recordings(dir.path());
    let server_side = SocketChannel::for_recordings(dir.path());
    let mut subscription = recorder_side.subscribe().unwrap();

    // When: The tool-server posts
    let delivered = server_side.post(CommandEvent::StopRecording).unwrap();

    // Then: Same hidden directory, and the event arrives
    assert_eq!(recorder_side.dir(), dir.path().join(".pochi-channel"));
    assert_eq!(server_side.dir(), paths::channel_dir(dir.path()));
    assert_eq!(delivered, 1);
    let received = timeout(Duration::from_secs(2), subscription.recv())
        .await
        .unwrap();
    assert_eq!(received, Some(CommandEvent::StopRecording));
}

/// WHAT: Posting without any subscriber drops the event
/// WHY: Commands are best-effort; the poller reports "unconfirmed"
#[test]
#[allow(clippy::unwrap_used)]
fn given_no_subscriber_when_posting_then_nothing_delivered() {
    // Given: A channel directory that does not exist, and one that is empty
    let dir = TempDir::new().unwrap();
    let missing = SocketChannel::new(dir.path().join("missing"));
    let empty = SocketChannel::new(dir.path());

    // When: Posting to both
    let to_missing = missing.post(CommandEvent::StopRecording).unwrap();
    let to_empty = empty.post(CommandEvent::StopRecording).unwrap();

    // Then: Nothing is delivered and nothing fails
    assert_eq!(to_missing, 0);
    assert_eq!(to_empty, 0);
}

/// WHAT: Sockets left by dead subscribers are removed on post
/// WHY: A crashed recorder must not leave the channel cluttered
#[test]
#[allow(clippy::unwrap_used)]
fn given_stale_socket_when_posting_then_socket_pruned() {
    // Given: A socket file whose owner has gone away
    let dir = TempDir::new().unwrap();
    let stale = dir.path().join("99999-0.sock");
    drop(UnixDatagram::bind(&stale).unwrap());
    assert!(stale.exists());

    // When: Posting
    let channel = SocketChannel::new(dir.path());
    let delivered = channel.post(CommandEvent::StartRecording).unwrap();

    // Then: Nothing was delivered and the stale socket is gone
    assert_eq!(delivered, 0);
    assert!(!stale.exists());
}

/// WHAT: Cancelling a subscription removes its socket
/// WHY: Later posts must not count a recorder that shut down
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_subscription_when_cancelled_then_socket_removed() {
    // Given: A live subscription
    let dir = TempDir::new().unwrap();
    let channel = SocketChannel::new(dir.path());
    let mut subscription = channel.subscribe().unwrap();
    assert_eq!(socket_files(dir.path()).len(), 1);

    // When: Cancelling it
    subscription.cancel();

    // Then: The socket is gone and posts reach nobody
    assert!(socket_files(dir.path()).is_empty());
    assert_eq!(channel.post(CommandEvent::StartRecording).unwrap(), 0);
    assert!(subscription.recv().await.is_none());
}

/// WHAT: Unknown datagrams are ignored
/// WHY: Only the two recorder events may cause transitions
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_unknown_datagram_when_receiving_then_skipped() {
    // Given: A subscriber
    let dir = TempDir::new().unwrap();
    let channel = SocketChannel::new(dir.path());
    let mut subscription = channel.subscribe().unwrap();
    let socket = socket_files(dir.path()).pop().unwrap();

    // When: A foreign datagram arrives before a real event
    let sender = UnixDatagram::unbound().unwrap();
    sender.send_to(b"hello", &socket).unwrap();
    channel.post(CommandEvent::StopRecording).unwrap();

    // Then: Only the real event is surfaced
    let received = timeout(Duration::from_secs(2), subscription.recv())
        .await
        .unwrap();
    assert_eq!(received, Some(CommandEvent::StopRecording));
}

/// WHAT: The posting process may also be a subscriber
/// WHY: Self-delivery must be harmless
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_two_subscribers_when_posting_then_both_receive() {
    // Given: Two subscriptions on one channel
    let dir = TempDir::new().unwrap();
    let channel = SocketChannel::new(dir.path());
    let mut first = channel.subscribe().unwrap();
    let mut second = channel.subscribe().unwrap();

    // When: Posting once
    let delivered = channel.post(CommandEvent::StartRecording).unwrap();

    // Then: Each receives a copy
    assert_eq!(delivered, 2);
    for subscription in [&mut first, &mut second] {
        let received = timeout(Duration::from_secs(2), subscription.recv())
            .await
            .unwrap();
        assert_eq!(received, Some(CommandEvent::StartRecording));
    }
}
