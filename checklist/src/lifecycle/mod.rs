//! Task status lifecycle for the checklist.
//!
//! Owns the single-active-task invariant: at most one task is
//! [`TaskStatus::Active`](checklist_proto::task::TaskStatus::Active), and
//! completing it hands the active slot to the nearest following pending
//! task. State is mirrored to a pluggable
//! [`ChecklistStore`](crate::store::ChecklistStore).

pub mod manager;
pub mod selection;

pub use manager::LifecycleManager;
pub use selection::{SelectAllState, Selection};

use checklist_proto::task::TaskId;
use thiserror::Error;

/// Errors that can occur during lifecycle operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    /// Two catalog entries share an id.
    #[error("duplicate task id: {0}")]
    DuplicateTaskId(TaskId),
    /// No task with the given id exists.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
}

/// Result of completing the active task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advance {
    /// Task that moved from active to complete.
    pub completed: TaskId,
    /// Task that became active, if any pending task followed.
    pub next: Option<TaskId>,
    /// Whether the new state reached the backend.
    pub persisted: bool,
}

/// Result of a direct or bulk completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The listed tasks were marked complete, in task order.
    Completed {
        /// Newly completed tasks.
        tasks: Vec<TaskId>,
        /// Whether the new state reached the backend.
        persisted: bool,
    },
    /// Every targeted task was already complete; nothing changed.
    AlreadyComplete,
    /// The user declined the confirmation prompt; nothing changed.
    Declined,
    /// Bulk completion was requested with an empty selection.
    NothingSelected,
}

/// Task counts for the summary view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Number of tasks in the checklist.
    pub total: usize,
    /// Number of complete tasks.
    pub completed: usize,
    /// Number of tasks not yet complete.
    pub remaining: usize,
}
