//! JSON file store for the checklist document.
//!
//! The [`StateStore`] owns the durable copy of [`ChecklistState`]. Every
//! write replaces the whole file; there is no merging. A missing file is
//! created with the default document on first read.
//!
//! Individual reads and writes are serialized within one process so a
//! reader never observes a half-written file. A read-modify-write sequence
//! spanning two calls is not atomic: concurrent writers race and the last
//! write wins.

use std::path::{Path, PathBuf};

use checklist_proto::state::{self, ChecklistState};
use tokio::sync::Mutex;

/// Errors raised while reading or writing the document.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The file could not be read or written.
    #[error("state file {path}: {source}")]
    Io {
        /// File that was accessed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file exists but does not hold a valid document.
    #[error("state file {path} is corrupt: {reason}")]
    Corrupt {
        /// File that was parsed.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },
}

/// Whole-document JSON store backed by a single file.
pub struct StateStore {
    path: PathBuf,
    io: Mutex<()>,
}

impl StateStore {
    /// Creates a store for the given file. Nothing is touched on disk until
    /// the first [`load`](Self::load) or [`save`](Self::save).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            io: Mutex::new(()),
        }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the document, writing the default one first if the file is
    /// absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be read, created, or parsed.
    pub async fn load(&self) -> Result<ChecklistState, StoreError> {
        let _guard = self.io.lock().await;
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => state::from_document(&text).map_err(|reason| StoreError::Corrupt {
                path: self.path.clone(),
                reason,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "creating default state file");
                let initial = ChecklistState::default();
                self.write(&initial).await?;
                Ok(initial)
            }
            Err(e) => Err(self.io_error(e)),
        }
    }

    /// Overwrites the document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file cannot be written.
    pub async fn save(&self, state: &ChecklistState) -> Result<(), StoreError> {
        let _guard = self.io.lock().await;
        self.write(state).await
    }

    /// Overwrites the document with the default one and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file cannot be written.
    pub async fn reset(&self) -> Result<ChecklistState, StoreError> {
        let initial = ChecklistState::default();
        self.save(&initial).await?;
        Ok(initial)
    }

    /// Writes without taking the lock; callers hold it.
    async fn write(&self, state: &ChecklistState) -> Result<(), StoreError> {
        let text = state::to_document(state).map_err(|reason| StoreError::Corrupt {
            path: self.path.clone(),
            reason,
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

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
