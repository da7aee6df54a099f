//! The shared recording status document.

mod status_document;
mod store;

pub use {status_document::RecordingStatus, store::StatusStore};
