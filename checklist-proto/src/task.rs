//! Task records for the change-request checklist.
//!
//! A [`Task`] is one row of the checklist. Its position in the owning list
//! defines succession order; only [`Task::status`] is ever mutated.

use serde::{Deserialize, Serialize};

/// Identifier of a task, unique within one checklist and stable for the
/// task's lifetime. Serialized as a bare JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a task identifier from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string form of this identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the identifier is the empty string.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Lifecycle status of a task.
///
/// `Pending -> Active -> Complete`, or `Pending -> Complete` through direct
/// completion. Only a global reset returns a task to `Pending`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Waiting for its turn.
    #[default]
    Pending,
    /// The single task currently eligible for completion.
    Active,
    /// Done. Terminal.
    #[serde(alias = "completed")]
    Complete,
}

impl TaskStatus {
    /// Returns `true` for [`TaskStatus::Complete`].
    #[must_use]
    pub const fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Active => write!(f, "active"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// Catalog entry describing a task before any status is assigned.
///
/// Display attributes are read-only presentation data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDefinition {
    /// Unique task identifier.
    pub id: TaskId,
    /// Task name shown in the table and in confirmation prompts.
    pub name: String,
    /// Assignee user id.
    #[serde(default)]
    pub assigned_to: String,
    /// Assignee display name.
    #[serde(default)]
    pub assigned_to_name: String,
}

impl TaskDefinition {
    /// Creates a definition with empty assignee fields.
    pub fn new(id: impl Into<TaskId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            assigned_to: String::new(),
            assigned_to_name: String::new(),
        }
    }

    /// Sets the assignee id and display name.
    #[must_use]
    pub fn assigned(mut self, user: impl Into<String>, display_name: impl Into<String>) -> Self {
        self.assigned_to = user.into();
        self.assigned_to_name = display_name.into();
        self
    }
}

/// One checklist row: its definition plus the current status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier.
    pub id: TaskId,
    /// Task name.
    pub name: String,
    /// Assignee user id.
    pub assigned_to: String,
    /// Assignee display name.
    pub assigned_to_name: String,
    /// Current lifecycle status.
    pub status: TaskStatus,
}

impl Task {
    /// Creates a pending task from its catalog definition.
    #[must_use]
    pub fn from_definition(definition: TaskDefinition) -> Self {
        Self {
            id: definition.id,
            name: definition.name,
            assigned_to: definition.assigned_to,
            assigned_to_name: definition.assigned_to_name,
            status: TaskStatus::Pending,
        }
    }
}
