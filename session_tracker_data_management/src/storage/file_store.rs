use std::{io::ErrorKind, path::{Path, PathBuf}};

use crate::SESSIONS_FILE;

use super::{SessionStore, StorageError};

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `data/sessions.json` under the project root.
    pub fn in_project_root() -> Result<Self, StorageError> {
        let root: PathBuf = project_root::get_project_root().map_err(StorageError::ProjectRoot)?;
        Ok(Self::new(root.join(SESSIONS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileStore {
    fn load(&self) -> Result<Option<Vec<u8>>, StorageError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read { path: self.path.clone(), source }),
        }
    }

    fn save(&mut self, blob: &[u8]) -> Result<(), StorageError> {
        // Create data dir if it doesn't exist
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                std::fs::create_dir_all(dir).map_err(|source| StorageError::Write { path: dir.to_path_buf(), source })?;
            }
        }

        std::fs::write(&self.path, blob).map_err(|source| StorageError::Write { path: self.path.clone(), source })?;
        tracing::debug!("Wrote {} bytes to {:?}", blob.len(), self.path);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Write { path: self.path.clone(), source }),
        }
    }
}
