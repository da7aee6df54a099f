//! Direct filesystem access to the Pochi Directory.
//!
//! Everything here treats the directory listing as the source of truth and
//! re-reads it on every call. Nothing is cached between operations.

mod media;
mod naming;
mod recording_file;
mod recording_library;
mod trash;

pub use {
    media::read_duration,
    naming::{allocate_file_name, sanitize_name, validate_file_name},
    recording_file::{RecordingFile, scan_recordings},
    recording_library::{
        DEFAULT_LIST_LIMIT, ListFilter, Listing, RecordingInfo, RecordingLibrary,
    },
    trash::{SystemTrash, Trash},
};
