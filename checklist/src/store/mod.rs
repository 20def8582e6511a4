//! Persistence backends for the lifecycle manager.
//!
//! Defines the [`ChecklistStore`] trait that every backend must satisfy.
//! Concrete implementations include:
//! - [`local::LocalStore`] — browser-style key-value storage (in memory or a JSON file)
//! - [`remote::RemoteStore`] — the State API over HTTP
//!
//! [`AnyStore`] picks one of them at construction time.

pub mod kv;
pub mod local;
pub mod remote;

use std::fmt;

use checklist_proto::local::TaskStateEntry;
use checklist_proto::state::ChecklistState;
use checklist_proto::task::TaskId;

use self::kv::FileStorage;
use self::local::LocalStore;
use self::remote::RemoteStore;

/// Describes which kind of backend is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// Key-value storage on this machine.
    Local,
    /// The State API on a server.
    Remote,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

/// Everything a backend may persist about one checklist session.
///
/// Remote backends only keep [`Snapshot::state`]; local backends keep all
/// three parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Active task and completed list.
    pub state: ChecklistState,
    /// Tasks selected for bulk actions, in task order.
    pub selected: Vec<TaskId>,
    /// Status of every task, in task order.
    pub task_states: Vec<TaskStateEntry>,
}

/// Errors that can occur while loading or saving a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The storage file could not be read or written.
    #[error("storage I/O error on {path}: {source}")]
    Io {
        /// File that was accessed.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A stored value was not valid JSON of the expected shape.
    #[error("malformed stored value under {key}: {source}")]
    Malformed {
        /// Storage key (or file) holding the value.
        key: String,
        /// Parser error.
        source: serde_json::Error,
    },

    /// A value could not be encoded for storage.
    #[error("failed to encode {key}: {source}")]
    Encode {
        /// Storage key being written.
        key: String,
        /// Serializer error.
        source: serde_json::Error,
    },

    /// The server URL could not be combined with an API path.
    #[error("invalid server URL: {0}")]
    Url(#[from] url::ParseError),

    /// The HTTP request failed or returned a non-success status.
    #[error("state API request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Async persistence backend for checklist snapshots.
///
/// Reads and writes are whole-snapshot replacements. There is no locking:
/// two sessions writing the same backend race and the last write wins.
pub trait ChecklistStore: Send + Sync {
    /// Load the persisted snapshot.
    ///
    /// Returns `Ok(None)` when nothing has been persisted yet.
    fn load(&self) -> impl Future<Output = Result<Option<Snapshot>, StoreError>> + Send;

    /// Replace the persisted snapshot.
    fn save(&self, snapshot: &Snapshot) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Discard the persisted snapshot so the next load starts over.
    fn reset(&self) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Return the kind of this backend.
    fn kind(&self) -> StoreKind;
}

/// Backend chosen from configuration at startup.
pub enum AnyStore {
    /// JSON-file key-value storage.
    Local(LocalStore<FileStorage>),
    /// The State API.
    Remote(RemoteStore),
}

impl ChecklistStore for AnyStore {
    async fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        match self {
            Self::Local(store) => store.load().await,
            Self::Remote(store) => store.load().await,
        }
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        match self {
            Self::Local(store) => store.save(snapshot).await,
            Self::Remote(store) => store.save(snapshot).await,
        }
    }

    async fn reset(&self) -> Result<(), StoreError> {
        match self {
            Self::Local(store) => store.reset().await,
            Self::Remote(store) => store.reset().await,
        }
    }

    fn kind(&self) -> StoreKind {
        match self {
            Self::Local(store) => store.kind(),
            Self::Remote(store) => store.kind(),
        }
    }
}
