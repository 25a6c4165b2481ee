//! Durable key-value storage behind the entry list and the collection.
//!
//! Persistence is a string-per-key contract: callers serialize their own
//! JSON payloads and hand them over under a stable key (`"entries"`,
//! `"collection"`, ...). Store handles are constructed explicitly and
//! injected into the components that need them, so tests can run against an
//! isolated [`MemoryStore`] while the application uses a [`FileStore`]
//! rooted in the platform data directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no platform data directory available")]
    NoDataDir,
    #[error("cannot access store key {key:?}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

/// A durable map from stable keys to string payloads.
pub trait KeyValueStore {
    /// Read the payload stored under `key`, `None` if absent.
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    /// Write `value` under `key`, replacing any previous payload.
    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Drop the payload stored under `key`. Removing an absent key is fine.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).write(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Load and deserialize the payload under `key`. Unreadable or corrupt
/// state degrades to `None` with a warning; it never propagates.
pub(crate) fn load_json<S, T>(store: &S, key: &str) -> Option<T>
where
    S: KeyValueStore,
    T: serde::de::DeserializeOwned,
{
    match store.read(key) {
        Ok(Some(data)) => match serde_json::from_str(&data) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("discarding corrupt {key:?} state: {e}");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            log::warn!("cannot read {key:?} state: {e}");
            None
        }
    }
}

/// Serialize and write `value` under `key`. Failures are logged; in-memory
/// state stays authoritative.
pub(crate) fn persist_json<S, T>(store: &mut S, key: &str, value: &T)
where
    S: KeyValueStore,
    T: serde::Serialize,
{
    match serde_json::to_string(value) {
        Ok(payload) => {
            if let Err(e) = store.write(key, &payload) {
                log::warn!("failed to persist {key:?} state: {e}");
            }
        }
        Err(e) => log::warn!("failed to serialize {key:?} state: {e}"),
    }
}

/// One JSON file per key under a root directory.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Store rooted at the platform data directory, e.g.
    /// `~/.local/share/totp-codex` on Linux.
    pub fn open_default() -> Result<Self, StoreError> {
        let mut root = dirs::data_dir().ok_or(StoreError::NoDataDir)?;
        root.push("totp-codex");
        Ok(FileStore::new(root))
    }

    /// Store rooted at an explicit directory. The directory is created on
    /// first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(key).with_extension("json")
    }

    fn io(key: &str, source: std::io::Error) -> StoreError {
        StoreError::Io {
            key: key.to_string(),
            source,
        }
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.key_path(key)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io(key, e)),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.root).map_err(|e| Self::io(key, e))?;
        std::fs::write(self.key_path(key), value).map_err(|e| Self::io(key, e))
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io(key, e)),
        }
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.values.remove(key);
        Ok(())
    }
}
