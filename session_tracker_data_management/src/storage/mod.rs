use std::{io, path::PathBuf};

use thiserror::Error;

mod file_store;
mod memory_store;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("could not locate project root: {0}")]
    ProjectRoot(io::Error),
    #[error("failed to encode sessions: {0}")]
    Encode(#[from] session_tracker_lib::CodecError),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// The raw key-value storage the sessions are kept in between runs.
pub trait SessionStore {
    /// `None` when nothing has been stored yet.
    fn load(&self) -> Result<Option<Vec<u8>>, StorageError>;
    fn save(&mut self, blob: &[u8]) -> Result<(), StorageError>;
    fn clear(&mut self) -> Result<(), StorageError>;
}
