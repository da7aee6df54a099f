//! Coalesced observation of the Pochi Directory.

mod change_batch;
mod directory_watch;

pub use {change_batch::ChangeBatch, directory_watch::DirectoryWatch};
