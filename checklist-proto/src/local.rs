//! Keys and records of the browser-local persistence path.
//!
//! Three keys are written side by side:
//! - [`COMPLETED_TASKS_KEY`]: JSON array of completed task ids
//! - [`ACTIVE_TASK_ID_KEY`]: the active task id as a plain string
//! - [`CHANGE_REQUEST_STATE_KEY`]: JSON [`ChangeRequestState`]

use serde::{Deserialize, Serialize};

use crate::task::{TaskId, TaskStatus};

/// Key holding the completed task ids.
pub const COMPLETED_TASKS_KEY: &str = "completedTasks";
/// Key holding the active task id (not JSON-encoded).
pub const ACTIVE_TASK_ID_KEY: &str = "activeTaskId";
/// Key holding selection and per-task status.
pub const CHANGE_REQUEST_STATE_KEY: &str = "changeRequestState";

/// Status of one task as recorded under [`CHANGE_REQUEST_STATE_KEY`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStateEntry {
    /// Task identifier.
    pub id: TaskId,
    /// Status at save time.
    pub status: TaskStatus,
}

/// Selection set plus per-task statuses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRequestState {
    /// Ids of the tasks selected for bulk actions.
    #[serde(default)]
    pub selected_tasks: Vec<TaskId>,
    /// Status of every task at save time.
    #[serde(default)]
    pub task_states: Vec<TaskStateEntry>,
}

impl ChangeRequestState {
    /// Ids whose recorded status is complete, in recorded order.
    pub fn completed_ids(&self) -> impl Iterator<Item = &TaskId> {
        self.task_states
            .iter()
            .filter(|entry| entry.status.is_complete())
            .map(|entry| &entry.id)
    }
}
