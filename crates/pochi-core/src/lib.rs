//! Pochi Core Library
//!
//! Coordination between the Pochi recorder and the Pochi tool-server: two
//! independently launched processes that share no memory. They agree on
//! recording state through a status document on disk, exchange commands over
//! a fire-and-forget channel, and observe each other's file changes through a
//! directory watch.
//!
//! # Example
//!
//! ```no_run
//! use pochi_core::{
//!     CoreResult, RecordingLibrary, SocketChannel, StatusStore, ToolDispatcher,
//!     paths::default_recordings_dir,
//! };
//!
//! use std::sync::Arc;
//!
//! use serde_json::Map;
//!
//! #[tokio::main]
//! async fn main() -> CoreResult<()> {
//!     let dir = default_recordings_dir();
//!     let dispatcher = ToolDispatcher::new(
//!         RecordingLibrary::new(&dir),
//!         StatusStore::in_dir(&dir),
//!         Arc::new(SocketChannel::for_recordings(&dir)),
//!     );
//!
//!     let response = dispatcher.call("start_recording", &Map::new()).await;
//!     println!("{}", response.text);
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod dispatcher;
mod error;
pub mod library;
pub mod paths;
pub mod recorder;
pub mod registry;
pub mod status;
pub mod watch;

pub use {
    channel::{
        CommandBus, CommandEvent, CommandPoster, CommandSubscription, LocalBus, SocketChannel,
    },
    dispatcher::{
        ConfirmPolicy, ToolDefinition, ToolDispatcher, ToolKind, ToolResponse, tool_catalogue,
    },
    error::{PochiError, Result as CoreResult},
    library::{RecordingFile, RecordingLibrary, SystemTrash, Trash},
    recorder::{
        CaptureBackend, Recorder, RecorderSession, SessionUpdate, TickOutcome, Transition,
        WavCapture,
    },
    registry::{Recording, RecordingRegistry},
    status::{RecordingStatus, StatusStore},
    watch::{ChangeBatch, DirectoryWatch},
};

#[cfg(test)]
mod tests;
