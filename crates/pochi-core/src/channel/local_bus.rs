use crate::{
    CoreResult,
    channel::{CommandBus, CommandEvent, CommandPoster, CommandSubscription},
};

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{debug, error};

/// In-process observer list.
///
/// Same contract as [`super::SocketChannel`] without leaving the process:
/// events go to whoever is subscribed at post time and are otherwise lost.
#[derive(Debug, Clone, Default)]
pub struct LocalBus {
    subscribers: Arc<Mutex<Vec<mpsc::UnboundedSender<CommandEvent>>>>,
}

impl LocalBus {
    /// Create a bus with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CommandPoster for LocalBus {
    fn post(&self, event: CommandEvent) -> CoreResult<usize> {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(|e| {
            error!("Subscriber list lock poisoned, recovering: {}", e);
            e.into_inner()
        });

        // Closed receivers are pruned as a side effect of posting.
        let mut delivered = 0;
        subscribers.retain(|tx| {
            let alive = tx.send(event).is_ok();
            if alive {
                delivered += 1;
            }
            alive
        });

        debug!(event = %event, delivered, "Posted command event");

        Ok(delivered)
    }
}

impl CommandBus for LocalBus {
    fn subscribe(&self) -> CoreResult<CommandSubscription> {
        let (tx, rx) = mpsc::unbounded_channel();

        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(tx);

        Ok(CommandSubscription::local(rx))
    }
}
