//! String key-value storage in the shape of browser local storage.
//!
//! [`MemoryStorage`] keeps values in process; [`FileStorage`] keeps them
//! in one JSON object on disk, rewritten whole on every change.

use std::collections::BTreeMap;
use std::path::PathBuf;

use parking_lot::Mutex;

use super::StoreError;

/// Minimal async string-to-string storage.
pub trait KeyValueStorage: Send + Sync {
    /// Returns the value under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the underlying storage cannot be read.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the underlying storage cannot be written.
    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Removes `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the underlying storage cannot be written.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// In-process storage. Contents vanish with the value.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    /// Creates empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// Storage persisted as a single JSON object `{key: value}` on disk.
///
/// A missing file reads as empty storage. The parent directory is created
/// on first write. Each read-modify-write of the file runs under one lock.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    io: tokio::sync::Mutex<()>,
}

impl FileStorage {
    /// Creates storage backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            io: tokio::sync::Mutex::new(()),
        }
    }

    async fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => serde_json::from_str(&text).map_err(|source| StoreError::Malformed {
                key: self.path.display().to_string(),
                source,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    async fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(entries).map_err(|source| StoreError::Encode {
            key: self.path.display().to_string(),
            source,
        })?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }
        tokio::fs::write(&self.path, text)
            .await
            .map_err(|e| self.io_error(e))
    }

    async fn update(
        &self,
        apply: impl FnOnce(&mut BTreeMap<String, String>) + Send,
    ) -> Result<(), StoreError> {
        let _guard = self.io.lock().await;
        let mut entries = self.read_all().await?;
        apply(&mut entries);
        self.write_all(&entries).await
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl KeyValueStorage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.io.lock().await;
        Ok(self.read_all().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.update(|entries| {
            entries.remove(key);
        })
        .await
    }
}
