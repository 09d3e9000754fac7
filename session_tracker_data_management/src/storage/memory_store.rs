use super::{SessionStore, StorageError};

/// Keeps the blob in memory. While unavailable every call fails, like a browser with storage disabled.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    blob: Option<Vec<u8>>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(blob: impl Into<Vec<u8>>) -> Self {
        Self {
            blob: Some(blob.into()),
            unavailable: false,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            blob: None,
            unavailable: true,
        }
    }

    pub fn set_available(&mut self, available: bool) {
        self.unavailable = !available;
    }

    pub fn blob(&self) -> Option<&[u8]> {
        self.blob.as_deref()
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.unavailable {
            Err(StorageError::Unavailable("memory store switched off".into()))
        } else {
            Ok(())
        }
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<Option<Vec<u8>>, StorageError> {
        self.check_available()?;
        Ok(self.blob.clone())
    }

    fn save(&mut self, blob: &[u8]) -> Result<(), StorageError> {
        self.check_available()?;
        self.blob = Some(blob.to_vec());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.check_available()?;
        self.blob = None;
        Ok(())
    }
}
