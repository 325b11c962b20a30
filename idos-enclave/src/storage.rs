use crate::KeyKind;
use async_trait::async_trait;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Mutex,
};
use thiserror::Error;

/// Slot holding the raw 32-byte secret of a kind.
pub fn secret_slot(kind: KeyKind) -> String {
    format!("secure_storage:{kind}:secret")
}

/// Slot holding the JSON key metadata of a kind.
pub fn metadata_slot(kind: KeyKind) -> String {
    format!("metadata_storage:{kind}:meta")
}

/// Error thrown by a key store backend.
#[derive(Debug, Error)]
#[error("key store error: {details}")]
pub struct StorageError {
    pub details: String,
}

impl StorageError {
    pub fn new(details: impl Into<String>) -> Self {
        Self { details: details.into() }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Platform secure storage, reduced to namespaced byte slots.
///
/// Implementations must be single-writer per slot; the orchestrator
/// guarantees unlock attempts are serialized above this layer.
#[async_trait]
pub trait KeyStore: Send + Sync {
    async fn read(&self, slot: &str) -> Result<Option<Vec<u8>>, StorageError>;
    async fn write(&self, slot: &str, value: &[u8]) -> Result<(), StorageError>;
    /// Deleting an absent slot is not an error.
    async fn delete(&self, slot: &str) -> Result<(), StorageError>;
}

/// In-memory key store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryKeyStore {
    slots: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyStore for MemoryKeyStore {
    async fn read(&self, slot: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.slots.lock().unwrap().get(slot).cloned())
    }

    async fn write(&self, slot: &str, value: &[u8]) -> Result<(), StorageError> {
        self.slots.lock().unwrap().insert(slot.to_owned(), value.to_vec());
        Ok(())
    }

    async fn delete(&self, slot: &str) -> Result<(), StorageError> {
        self.slots.lock().unwrap().remove(slot);
        Ok(())
    }
}

/// File-backed key store: one file per slot under a directory, written
/// atomically via a rename and restricted to the owning user on Unix.
#[derive(Debug, Clone)]
pub struct FileKeyStore {
    dir: PathBuf,
}

impl FileKeyStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, slot: &str) -> PathBuf {
        self.dir.join(slot.replace(':', "-"))
    }

    #[cfg(unix)]
    async fn restrict(path: &Path) -> std::io::Result<()> {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await
    }

    #[cfg(not(unix))]
    async fn restrict(_path: &Path) -> std::io::Result<()> {
        Ok(())
    }
}

#[async_trait]
impl KeyStore for FileKeyStore {
    async fn read(&self, slot: &str) -> Result<Option<Vec<u8>>, StorageError> {
        match tokio::fs::read(self.path(slot)).await {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn write(&self, slot: &str, value: &[u8]) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path(slot);
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, value).await?;
        Self::restrict(&tmp).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn delete(&self, slot: &str) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.path(slot)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
