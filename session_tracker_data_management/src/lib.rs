use const_format::concatcp;
use session_tracker_lib::{RestoreError, ValidationError};
use thiserror::Error;

pub mod projection;
pub mod registry;
mod session_manager;
pub mod storage;

pub use session_manager::*;
pub use storage::StorageError;

pub const DATA_DIR: &str = "data/";
pub const SESSIONS_FILE: &str = concatcp!(DATA_DIR, "sessions.json");
pub const MAP_ZOOM_LEVEL: f64 = 13.0;

#[derive(Debug, Error)]
pub enum SessionManagerError {
    #[error("invalid session: {0}")]
    Validation(#[from] ValidationError),
    #[error("no session with id {id}")]
    NotFound { id: String },
    #[error("a session with id {id} already exists")]
    DuplicateId { id: String },
    #[error("persistence failed: {0}")]
    Persistence(#[from] StorageError),
    #[error("restore failed: {0}")]
    Restore(#[from] RestoreError),
}
