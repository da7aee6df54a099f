//! Cross-process command channel over Unix datagram sockets.
//!
//! Every subscriber binds its own socket inside a shared directory. Posting
//! sends the event name to each socket found there, so the post reaches every
//! live subscriber on the machine, the posting process included if it
//! subscribed. Sockets left behind by dead processes are pruned on post.

use crate::{
    CoreResult, PochiError,
    channel::{CommandBus, CommandEvent, CommandPoster, CommandSubscription},
    paths,
};

use std::{
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use tracing::{debug, info};

/// Socket file extension used by subscribers.
const SOCKET_EXTENSION: &str = "sock";

/// Largest datagram a subscriber accepts; event names are far shorter.
const MAX_DATAGRAM: usize = 256;

static SUBSCRIPTION_SEQ: AtomicU64 = AtomicU64::new(0);

/// Datagram-socket command channel rooted at a directory.
#[derive(Debug, Clone)]
pub struct SocketChannel {
    dir: PathBuf,
}

impl SocketChannel {
    /// Channel whose subscriber sockets live in `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Channel shared by every Pochi process using `recordings_dir`.
    pub fn for_recordings(recordings_dir: &Path) -> Self {
        Self::new(paths::channel_dir(recordings_dir))
    }

    /// Directory holding subscriber sockets.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn next_socket_path(&self) -> PathBuf {
        let seq = SUBSCRIPTION_SEQ.fetch_add(1, Ordering::Relaxed);
        self.dir.join(format!(
            "{}-{}.{}",
            std::process::id(),
            seq,
            SOCKET_EXTENSION
        ))
    }
}

#[cfg(unix)]
impl CommandPoster for SocketChannel {
    #[track_caller]
    fn post(&self, event: CommandEvent) -> CoreResult<usize> {
        use std::{fs, io::ErrorKind, os::unix::net::UnixDatagram};
        use tracing::warn;

        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(event = %event, "No channel directory, event dropped");
                return Ok(0);
            }
            Err(e) => return Err(PochiError::io_at(&self.dir, e)),
        };

        let sender = UnixDatagram::unbound().map_err(|e| PochiError::io_at(&self.dir, e))?;
        sender
            .set_nonblocking(true)
            .map_err(|e| PochiError::io_at(&self.dir, e))?;

        let mut delivered = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SOCKET_EXTENSION) {
                continue;
            }

            match sender.send_to(event.name().as_bytes(), &path) {
                Ok(_) => delivered += 1,
                Err(e) if matches!(e.kind(), ErrorKind::ConnectionRefused | ErrorKind::NotFound) => {
                    debug!(path = ?path, "Pruning stale subscriber socket");
                    let _ = fs::remove_file(&path);
                }
                Err(e) => {
                    warn!(path = ?path, error = %e, "Failed to deliver command event");
                }
            }
        }

        debug!(event = %event, delivered, "Posted command event");

        Ok(delivered)
    }
}

#[cfg(unix)]
impl CommandBus for SocketChannel {
    #[track_caller]
    fn subscribe(&self) -> CoreResult<CommandSubscription> {
        use tokio::{net::UnixDatagram, sync::mpsc};
        use tracing::warn;

        paths::ensure_dir(&self.dir)?;

        let socket_path = self.next_socket_path();
        let _ = std::fs::remove_file(&socket_path);

        let socket =
            UnixDatagram::bind(&socket_path).map_err(|e| PochiError::io_at(&socket_path, e))?;

        let (tx, rx) = mpsc::unbounded_channel();

        let listener = tokio::spawn(async move {
            let mut buf = [0u8; MAX_DATAGRAM];
            loop {
                match socket.recv(&mut buf).await {
                    Ok(n) => {
                        let name = String::from_utf8_lossy(&buf[..n]);
                        match CommandEvent::from_name(name.trim()) {
                            Some(event) => {
                                if tx.send(event).is_err() {
                                    break;
                                }
                            }
                            None => debug!(name = %name, "Ignoring unknown command datagram"),
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Command socket receive failed");
                        break;
                    }
                }
            }
        });

        info!(path = ?socket_path, "Subscribed to command channel");

        Ok(CommandSubscription::socket(rx, listener, socket_path))
    }
}

#[cfg(not(unix))]
impl CommandPoster for SocketChannel {
    #[track_caller]
    fn post(&self, _event: CommandEvent) -> CoreResult<usize> {
        Err(unsupported())
    }
}

#[cfg(not(unix))]
impl CommandBus for SocketChannel {
    #[track_caller]
    fn subscribe(&self) -> CoreResult<CommandSubscription> {
        Err(unsupported())
    }
}

#[cfg(not(unix))]
#[track_caller]
fn unsupported() -> PochiError {
    use error_location::ErrorLocation;
    use std::panic::Location;

    PochiError::Channel {
        reason: "Command channel requires Unix domain sockets".to_string(),
        location: ErrorLocation::from(Location::caller()),
    }
}
