use crate::channel::CommandEvent;

use std::{fs, path::PathBuf};

use tokio::{sync::mpsc, task::JoinHandle};
use tracing::debug;

/// A live registration on a command channel.
///
/// Events are pulled with [`CommandSubscription::recv`] by whichever loop owns
/// the recorder state, so handlers always run on that loop. Cancelling tears
/// down the registration; dropping the subscription cancels it too.
#[derive(Debug)]
pub struct CommandSubscription {
    events: mpsc::UnboundedReceiver<CommandEvent>,
    listener: Option<JoinHandle<()>>,
    socket_path: Option<PathBuf>,
    cancelled: bool,
}

impl CommandSubscription {
    pub(crate) fn local(events: mpsc::UnboundedReceiver<CommandEvent>) -> Self {
        Self {
            events,
            listener: None,
            socket_path: None,
            cancelled: false,
        }
    }

    pub(crate) fn socket(
        events: mpsc::UnboundedReceiver<CommandEvent>,
        listener: JoinHandle<()>,
        socket_path: PathBuf,
    ) -> Self {
        Self {
            events,
            listener: Some(listener),
            socket_path: Some(socket_path),
            cancelled: false,
        }
    }

    /// Next event, or `None` once the subscription is cancelled or the
    /// channel is gone.
    pub async fn recv(&mut self) -> Option<CommandEvent> {
        if self.cancelled {
            return None;
        }
        self.events.recv().await
    }

    /// Whether [`CommandSubscription::cancel`] has run.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Release the registration. Safe to call more than once.
    pub fn cancel(&mut self) {
        if self.cancelled {
            return;
        }
        self.cancelled = true;

        self.events.close();

        if let Some(listener) = self.listener.take() {
            listener.abort();
        }

        if let Some(path) = self.socket_path.take() {
            match fs::remove_file(&path) {
                Ok(()) => debug!(path = ?path, "Removed subscriber socket"),
                Err(e) => debug!(path = ?path, error = %e, "Subscriber socket already gone"),
            }
        }
    }
}

impl Drop for CommandSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}
