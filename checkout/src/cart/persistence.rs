//! Durable persistence for the cart state.
//!
//! The whole [`CartState`] is written as one JSON snapshot under a single
//! named entry, mirroring how a browser client keeps it in local storage.
//! Writes are last-writer-wins; there is no merge logic.

use crate::cart::state::CartState;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Failure reading or writing the cart snapshot.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored snapshot could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Storage backend for the persisted cart entry.
///
/// Implementations hold exactly one snapshot. `load` returns `None` when
/// no snapshot has ever been written (first launch) or after `clear`.
pub trait CartStorage: Send + Sync {
    /// Load the persisted snapshot, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry exists but cannot be read or parsed.
    fn load(&self) -> Result<Option<CartState>, StorageError>;

    /// Overwrite the persisted snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be serialized or written.
    fn save(&self, state: &CartState) -> Result<(), StorageError>;

    /// Remove the persisted snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry exists but cannot be removed.
    fn clear(&self) -> Result<(), StorageError>;
}

/// File-backed storage: one JSON document at a fixed path.
///
/// Date-typed fields round-trip through RFC 3339 strings, so a reloaded
/// snapshot rehydrates `reservation_expiry` as a real instant.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    /// Create storage writing to the given path.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The path of the persisted entry.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CartStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<CartState>, StorageError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };

        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&self, state: &CartState) -> Result<(), StorageError> {
        let raw = serde_json::to_string(state)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

/// In-memory storage for tests and headless demos.
///
/// Serializes through the same JSON path as [`JsonFileStorage`], so
/// round-trip fidelity (including date rehydration) is exercised too.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    entry: Mutex<Option<String>>,
}

impl InMemoryStorage {
    /// Create empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartStorage for InMemoryStorage {
    fn load(&self) -> Result<Option<CartState>, StorageError> {
        #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
        let entry = self.entry.lock().unwrap();
        entry
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(StorageError::from)
    }

    fn save(&self, state: &CartState) -> Result<(), StorageError> {
        let raw = serde_json::to_string(state)?;
        #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
        let mut entry = self.entry.lock().unwrap();
        *entry = Some(raw);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
        let mut entry = self.entry.lock().unwrap();
        *entry = None;
        Ok(())
    }
}
