//! JSON bodies and paths of the State API.
//!
//! | Method | Path                   | Request                  | Response                   |
//! |--------|------------------------|--------------------------|----------------------------|
//! | GET    | `/api/active-task`     | -                        | [`ActiveTaskResponse`]     |
//! | POST   | `/api/active-task`     | [`SetActiveTaskRequest`] | [`MessageResponse`]        |
//! | GET    | `/api/completed-tasks` | -                        | [`CompletedTasksResponse`] |
//! | POST   | `/api/reset`           | -                        | [`MessageResponse`]        |
//!
//! Failures carry an [`ErrorResponse`].

use serde::{Deserialize, Serialize};

use crate::task::TaskId;

/// Path for reading and writing the active task.
pub const ACTIVE_TASK_PATH: &str = "/api/active-task";
/// Path for reading the completed task list.
pub const COMPLETED_TASKS_PATH: &str = "/api/completed-tasks";
/// Path for resetting the persisted state.
pub const RESET_PATH: &str = "/api/reset";

/// `GET /api/active-task` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTaskResponse {
    /// Persisted active task; absent when the document has none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_task_id: Option<TaskId>,
}

/// `POST /api/active-task` request.
///
/// Both fields are optional on the wire so that a missing `activeTaskId`
/// can be reported as a validation error instead of a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetActiveTaskRequest {
    /// New active task. Required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_task_id: Option<TaskId>,
    /// Replacement completed list. Left untouched when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<Vec<TaskId>>,
}

/// `GET /api/completed-tasks` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedTasksResponse {
    /// Completed task ids; empty when none are recorded.
    #[serde(default)]
    pub completed: Vec<TaskId>,
}

/// Success body carrying a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable outcome.
    pub message: String,
}

impl MessageResponse {
    /// Creates a message body.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failure body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Description of what went wrong.
    pub error: String,
}
