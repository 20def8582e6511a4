//! The persisted checklist document.
//!
//! Stored as a single JSON object `{activeTaskId, completed}`. Reads and
//! writes always replace the whole document; a document that is loaded and
//! saved unchanged is written back byte for byte.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::task::TaskId;

/// Active task id of a freshly created or reset document.
pub const DEFAULT_ACTIVE_TASK_ID: &str = "1";

const ACTIVE_TASK_ID_FIELD: &str = "activeTaskId";
const COMPLETED_FIELD: &str = "completed";

/// Durable record of which task is active and which tasks are complete.
///
/// The document read from disk is kept alongside the typed fields, so
/// unrecognised keys, key order, and an explicit `null` survive a
/// load/save cycle. Writing only replaces the values of the two known keys.
#[derive(Debug, Clone)]
pub struct ChecklistState {
    /// Current active task, or `None` once no task remains.
    pub active_task_id: Option<TaskId>,
    /// Completed task ids. Order carries no meaning.
    pub completed: Vec<TaskId>,
    document: Map<String, Value>,
}

impl Default for ChecklistState {
    fn default() -> Self {
        Self::starting_at(Some(TaskId::new(DEFAULT_ACTIVE_TASK_ID)))
    }
}

impl ChecklistState {
    /// Creates a document with the given active task and nothing completed.
    #[must_use]
    pub fn starting_at(active_task_id: Option<TaskId>) -> Self {
        let mut document = Map::new();
        if let Some(id) = &active_task_id {
            document.insert(ACTIVE_TASK_ID_FIELD.to_string(), Value::String(id.to_string()));
        }
        document.insert(COMPLETED_FIELD.to_string(), Value::Array(Vec::new()));
        Self {
            active_task_id,
            completed: Vec::new(),
            document,
        }
    }

    /// Returns `true` if `id` is recorded as completed.
    #[must_use]
    pub fn is_completed(&self, id: &TaskId) -> bool {
        self.completed.contains(id)
    }

    /// Unrecognised top-level fields, in document order.
    pub fn extra_fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.document
            .iter()
            .map(|(key, value)| (key.as_str(), value))
            .filter(|(key, _)| *key != ACTIVE_TASK_ID_FIELD && *key != COMPLETED_FIELD)
    }

    /// The document as written: the stored document with the known keys
    /// updated in place.
    fn to_map(&self) -> Map<String, Value> {
        let mut document = self.document.clone();

        match &self.active_task_id {
            Some(id) => {
                document.insert(ACTIVE_TASK_ID_FIELD.to_string(), Value::String(id.to_string()));
            }
            None => {
                if let Some(slot) = document.get_mut(ACTIVE_TASK_ID_FIELD) {
                    *slot = Value::Null;
                }
            }
        }

        let completed = Value::Array(
            self.completed
                .iter()
                .map(|id| Value::String(id.to_string()))
                .collect(),
        );
        match document.get_mut(COMPLETED_FIELD) {
            Some(slot) if slot.is_null() && self.completed.is_empty() => {}
            Some(slot) => *slot = completed,
            None if self.completed.is_empty() => {}
            None => {
                document.insert(COMPLETED_FIELD.to_string(), completed);
            }
        }
        document
    }
}

impl PartialEq for ChecklistState {
    fn eq(&self, other: &Self) -> bool {
        self.active_task_id == other.active_task_id
            && self.completed == other.completed
            && self.extra_fields().eq(other.extra_fields())
    }
}

impl Eq for ChecklistState {}

impl Serialize for ChecklistState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ChecklistState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let document = Map::<String, Value>::deserialize(deserializer)?;
        let active_task_id = match document.get(ACTIVE_TASK_ID_FIELD) {
            None | Some(Value::Null) => None,
            Some(value) => Some(TaskId::deserialize(value).map_err(D::Error::custom)?),
        };
        let completed = match document.get(COMPLETED_FIELD) {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => Vec::<TaskId>::deserialize(value).map_err(D::Error::custom)?,
        };
        Ok(Self {
            active_task_id,
            completed,
            document,
        })
    }
}

/// Serializes a document the way it is written to disk (two-space indent).
///
/// # Errors
///
/// Returns an error string if serialization fails.
pub fn to_document(state: &ChecklistState) -> Result<String, String> {
    serde_json::to_string_pretty(state).map_err(|e| format!("state encode error: {e}"))
}

/// Parses a document read from disk.
///
/// # Errors
///
/// Returns an error string if the text is not a JSON object of the
/// expected shape.
pub fn from_document(text: &str) -> Result<ChecklistState, String> {
    serde_json::from_str(text).map_err(|e| format!("state decode error: {e}"))
}
