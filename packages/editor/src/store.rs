//! # State persistence
//!
//! The store keeps the latest serialized editor state under a single
//! well-known key so a later session can pick up where the last one
//! left off. Storage itself is behind the [`Storage`] trait; the
//! in-memory backend exists for tests and the file backend for the
//! CLI.
//!
//! The lifecycle matches the app around it:
//!
//! 1. [`Store::load`] reads whatever the previous session persisted,
//! 2. [`Store::attach`] replays that state into a fresh view,
//! 3. [`Store::sync`] writes the view's current state back out,
//!    typically after a debounce quiet period.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::error::EditorError;
use crate::state::SerializedState;
use crate::view::ViewProvider;

/// Key every session reads and writes.
pub const STORAGE_KEY: &str = "editor-store";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("stored editor state is not valid JSON: {0}")]
    Corrupt(serde_json::Error),

    #[error("editor state could not be encoded: {0}")]
    Serialize(serde_json::Error),
}

/// A flat string-to-string keyed store.
pub trait Storage {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Keeps entries in a map. Also counts writes, which lets tests
/// observe how often a debounced sync actually ran.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    writes: u64,
}

impl MemoryStorage {
    pub fn new() -> MemoryStorage {
        MemoryStorage::default()
    }

    pub fn write_count(&self) -> u64 {
        self.writes
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}

/// Stores each key as `<key>.json` inside one directory.
#[derive(Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Result<FileStorage, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(FileStorage { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::Io(err)),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

/// Persists and restores serialized editor state through a [`Storage`]
/// backend.
#[derive(Debug)]
pub struct Store<S: Storage> {
    storage: S,
    loaded: Option<SerializedState>,
}

impl<S: Storage> Store<S> {
    pub fn new(storage: S) -> Store<S> {
        Store {
            storage,
            loaded: None,
        }
    }

    /// Reads the persisted state, if any. Absent and blank entries
    /// both count as "nothing stored"; anything else has to parse.
    pub fn load(&mut self) -> Result<Option<&SerializedState>, StoreError> {
        let raw = match self.storage.read(STORAGE_KEY)? {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => return Ok(None),
        };
        let state: SerializedState =
            serde_json::from_str(&raw).map_err(StoreError::Corrupt)?;
        tracing::debug!("loaded stored editor state");
        self.loaded = Some(state);
        Ok(self.loaded.as_ref())
    }

    /// Replays the loaded state, if there is one, into a view.
    pub fn attach(&self, view: &mut ViewProvider) -> Result<(), EditorError> {
        if let Some(loaded) = &self.loaded {
            view.hydrate_state_from_json(loaded)?;
        }
        Ok(())
    }

    /// Writes the view's current state out through the backend.
    pub fn sync(&mut self, view: &ViewProvider) -> Result<(), EditorError> {
        let serialized = view.state_to_json()?;
        let payload =
            serde_json::to_string(&serialized).map_err(StoreError::Serialize)?;
        self.storage.write(STORAGE_KEY, &payload)?;
        tracing::debug!(bytes = payload.len(), "synced editor state");
        Ok(())
    }

    pub fn loaded_state(&self) -> Option<&SerializedState> {
        self.loaded.as_ref()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}
