//! Name-only command signals between the tool-server and the recorder.
//!
//! Delivery is at-most-once with no acknowledgement. Posting with nobody
//! subscribed drops the event. Callers that need to know whether a command
//! took effect poll the status store instead.

mod command_event;
mod local_bus;
mod socket_channel;
mod subscription;

pub use {
    command_event::CommandEvent, local_bus::LocalBus, socket_channel::SocketChannel,
    subscription::CommandSubscription,
};

use crate::CoreResult;

/// Sending side of the command channel.
pub trait CommandPoster: Send + Sync {
    /// Broadcast `event` to every current subscriber.
    ///
    /// Returns how many subscribers the event was handed to. Zero is not an
    /// error: the recorder may simply not be running.
    fn post(&self, event: CommandEvent) -> CoreResult<usize>;
}

/// A command channel that can also be subscribed to.
pub trait CommandBus: CommandPoster {
    /// Start receiving events. The subscription ends when cancelled or dropped.
    fn subscribe(&self) -> CoreResult<CommandSubscription>;
}
