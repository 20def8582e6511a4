//! Lifecycle manager: status transitions, succession, and persistence.
//!
//! `LifecycleManager` holds the ordered task list for one session. Every
//! mutation keeps at most one task active and mirrors the resulting
//! snapshot to its [`ChecklistStore`]. Backend failures are logged and
//! reported through the `persisted` flag; they never undo a transition.

use std::collections::HashSet;
use std::time::Duration;

use checklist_proto::local::TaskStateEntry;
use checklist_proto::state::ChecklistState;
use checklist_proto::task::{Task, TaskDefinition, TaskId, TaskStatus};

use super::selection::{SelectAllState, Selection};
use super::{Advance, CompletionOutcome, LifecycleError, Summary};
use crate::confirm::Confirm;
use crate::store::{ChecklistStore, Snapshot};

/// Simulated processing time before a task is marked complete.
pub const DEFAULT_COMPLETION_DELAY: Duration = Duration::from_millis(300);

/// Simulated processing time before a bulk completion starts.
pub const DEFAULT_BULK_DELAY: Duration = Duration::from_millis(1000);

/// Drives task status transitions for one checklist session.
///
/// Task order is the catalog order given at construction and decides
/// succession. The persistence backend `S` and the confirmation
/// capability `C` are fixed for the manager's lifetime.
pub struct LifecycleManager<S, C> {
    tasks: Vec<Task>,
    selection: Selection,
    store: S,
    confirm: C,
    completion_delay: Duration,
    bulk_delay: Duration,
}

impl<S: ChecklistStore, C: Confirm> LifecycleManager<S, C> {
    /// Creates a manager over the given catalog with the first task active
    /// and all others pending.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::DuplicateTaskId`] if two entries share an id.
    pub fn new(
        definitions: impl IntoIterator<Item = TaskDefinition>,
        store: S,
        confirm: C,
    ) -> Result<Self, LifecycleError> {
        let mut seen = HashSet::new();
        let mut tasks = Vec::new();
        for definition in definitions {
            if !seen.insert(definition.id.clone()) {
                return Err(LifecycleError::DuplicateTaskId(definition.id));
            }
            tasks.push(Task::from_definition(definition));
        }

        let mut manager = Self {
            tasks,
            selection: Selection::new(),
            store,
            confirm,
            completion_delay: DEFAULT_COMPLETION_DELAY,
            bulk_delay: DEFAULT_BULK_DELAY,
        };
        manager.apply_initial();
        Ok(manager)
    }

    /// Sets the delay applied before each task is marked complete.
    #[must_use]
    pub fn with_completion_delay(mut self, delay: Duration) -> Self {
        self.completion_delay = delay;
        self
    }

    /// Sets the delay applied before a bulk completion starts.
    #[must_use]
    pub fn with_bulk_delay(mut self, delay: Duration) -> Self {
        self.bulk_delay = delay;
        self
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    /// All tasks in order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Looks up a task by id.
    #[must_use]
    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == *id)
    }

    /// The active task, if any.
    #[must_use]
    pub fn active_task(&self) -> Option<&Task> {
        self.tasks.iter().find(|t| t.status == TaskStatus::Active)
    }

    /// Current selection.
    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Persistence backend.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Select-all tri-state for the current selection.
    #[must_use]
    pub fn select_all_state(&self) -> SelectAllState {
        self.selection.select_all_state(self.tasks.len())
    }

    /// Total, completed, and remaining task counts.
    #[must_use]
    pub fn summary(&self) -> Summary {
        let total = self.tasks.len();
        let completed = self
            .tasks
            .iter()
            .filter(|t| t.status.is_complete())
            .count();
        Summary {
            total,
            completed,
            remaining: total - completed,
        }
    }

    /// Checklist state derived from the current task statuses.
    #[must_use]
    pub fn state(&self) -> ChecklistState {
        let mut state = ChecklistState::starting_at(self.active_task().map(|t| t.id.clone()));
        state.completed = self
            .tasks
            .iter()
            .filter(|t| t.status.is_complete())
            .map(|t| t.id.clone())
            .collect();
        state
    }

    /// Everything a backend may persist, in task order.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state(),
            selected: self
                .tasks
                .iter()
                .filter(|t| self.selection.contains(&t.id))
                .map(|t| t.id.clone())
                .collect(),
            task_states: self
                .tasks
                .iter()
                .map(|t| TaskStateEntry {
                    id: t.id.clone(),
                    status: t.status,
                })
                .collect(),
        }
    }

    // -----------------------------------------------------------------------
    // Restore and persist
    // -----------------------------------------------------------------------

    /// Restores statuses and selection from the backend.
    ///
    /// Returns `true` if persisted statuses were applied. When the backend
    /// has nothing stored, fails, or holds a state naming no task of this
    /// catalog (neither the active id nor any completed id), the current
    /// statuses are kept.
    pub async fn load(&mut self) -> bool {
        match self.store.load().await {
            Ok(Some(snapshot)) => {
                self.selection.clear();
                for id in snapshot.selected {
                    if self.index_of(&id).is_some() {
                        self.selection.select(id);
                    }
                }
                if !self.recognizes(&snapshot.state) {
                    tracing::debug!(
                        backend = %self.store.kind(),
                        active = ?snapshot.state.active_task_id,
                        "persisted state names no catalog task, keeping current statuses"
                    );
                    return false;
                }
                self.restore(&snapshot.state);
                tracing::debug!(
                    backend = %self.store.kind(),
                    active = ?self.active_task().map(|t| &t.id),
                    "checklist state restored"
                );
                true
            }
            Ok(None) => {
                tracing::debug!(backend = %self.store.kind(), "no persisted checklist state");
                false
            }
            Err(e) => {
                tracing::warn!(
                    backend = %self.store.kind(),
                    error = %e,
                    "failed to restore checklist state, keeping current statuses"
                );
                false
            }
        }
    }

    /// Sets every task's status from a persisted state.
    ///
    /// A task is complete if its id is in the completed set, active if it
    /// equals the active id (and is not completed), pending otherwise.
    pub fn restore(&mut self, state: &ChecklistState) {
        for task in &mut self.tasks {
            task.status = if state.is_completed(&task.id) {
                TaskStatus::Complete
            } else if state.active_task_id.as_ref() == Some(&task.id) {
                TaskStatus::Active
            } else {
                TaskStatus::Pending
            };
        }
    }

    /// Persists the current snapshot. Returns whether the backend accepted it.
    pub async fn save(&self) -> bool {
        let snapshot = self.snapshot();
        match self.store.save(&snapshot).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    backend = %self.store.kind(),
                    error = %e,
                    "failed to persist checklist state"
                );
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Completes the active task and hands the active slot to the nearest
    /// following pending task.
    ///
    /// Returns `None`, changing nothing, when no task is active.
    pub async fn complete_active(&mut self) -> Option<Advance> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.status == TaskStatus::Active)?;
        self.tasks[index].status = TaskStatus::Complete;
        let completed = self.tasks[index].id.clone();

        let next = self.tasks[index + 1..]
            .iter_mut()
            .find(|t| t.status == TaskStatus::Pending)
            .map(|t| {
                t.status = TaskStatus::Active;
                t.id.clone()
            });

        tracing::info!(task_id = %completed, next = ?next, "active task completed");
        let persisted = self.save().await;
        Some(Advance {
            completed,
            next,
            persisted,
        })
    }

    /// Completes one task directly, after confirmation.
    ///
    /// No other task changes status; completing the active task this way
    /// leaves no task active.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::TaskNotFound`] for an unknown id.
    pub async fn complete_specific(
        &mut self,
        id: &TaskId,
    ) -> Result<CompletionOutcome, LifecycleError> {
        let index = self
            .index_of(id)
            .ok_or_else(|| LifecycleError::TaskNotFound(id.clone()))?;
        if self.tasks[index].status.is_complete() {
            return Ok(CompletionOutcome::AlreadyComplete);
        }

        let prompt = format!(
            "Are you sure you want to complete task \"{}\"?",
            self.tasks[index].name
        );
        if !self.confirm.confirm(&prompt) {
            tracing::debug!(task_id = %id, "completion declined");
            return Ok(CompletionOutcome::Declined);
        }

        self.finish(index).await;
        let persisted = self.save().await;
        Ok(CompletionOutcome::Completed {
            tasks: vec![id.clone()],
            persisted,
        })
    }

    /// Completes every selected task that is not yet complete, after
    /// confirmation. Tasks are completed in task order.
    pub async fn complete_selected(&mut self) -> CompletionOutcome {
        let selected: Vec<usize> = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| self.selection.contains(&t.id))
            .map(|(i, _)| i)
            .collect();
        if selected.is_empty() {
            return CompletionOutcome::NothingSelected;
        }

        let targets: Vec<usize> = selected
            .into_iter()
            .filter(|&i| !self.tasks[i].status.is_complete())
            .collect();
        if targets.is_empty() {
            return CompletionOutcome::AlreadyComplete;
        }

        let prompt = format!(
            "Are you sure you want to complete {} task(s)?",
            targets.len()
        );
        if !self.confirm.confirm(&prompt) {
            tracing::debug!(count = targets.len(), "bulk completion declined");
            return CompletionOutcome::Declined;
        }

        if !self.bulk_delay.is_zero() {
            tokio::time::sleep(self.bulk_delay).await;
        }
        for &index in &targets {
            self.finish(index).await;
        }

        let tasks: Vec<TaskId> = targets.iter().map(|&i| self.tasks[i].id.clone()).collect();
        tracing::info!(count = tasks.len(), "selected tasks completed");
        let persisted = self.save().await;
        CompletionOutcome::Completed { tasks, persisted }
    }

    /// Restores the initial state (first task active, all others pending),
    /// clears the selection, and discards the persisted snapshot.
    ///
    /// Returns whether the backend reset succeeded.
    pub async fn reset(&mut self) -> bool {
        self.apply_initial();
        self.selection.clear();
        tracing::info!("checklist reset");
        match self.store.reset().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    backend = %self.store.kind(),
                    error = %e,
                    "failed to reset persisted checklist state"
                );
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// Selects or deselects every task.
    pub fn select_all(&mut self, selected: bool) {
        if selected {
            for task in &self.tasks {
                self.selection.select(task.id.clone());
            }
        } else {
            self.selection.clear();
        }
    }

    /// Adds a task to the selection. Returns `true` if it was newly added.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::TaskNotFound`] for an unknown id.
    pub fn select_task(&mut self, id: &TaskId) -> Result<bool, LifecycleError> {
        self.require(id)?;
        Ok(self.selection.select(id.clone()))
    }

    /// Removes a task from the selection. Returns `true` if it was selected.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::TaskNotFound`] for an unknown id.
    pub fn deselect_task(&mut self, id: &TaskId) -> Result<bool, LifecycleError> {
        self.require(id)?;
        Ok(self.selection.deselect(id))
    }

    /// Flips a task's selection. Returns the new membership.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::TaskNotFound`] for an unknown id.
    pub fn toggle_task(&mut self, id: &TaskId) -> Result<bool, LifecycleError> {
        self.require(id)?;
        Ok(self.selection.toggle(id))
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    fn apply_initial(&mut self) {
        for (i, task) in self.tasks.iter_mut().enumerate() {
            task.status = if i == 0 {
                TaskStatus::Active
            } else {
                TaskStatus::Pending
            };
        }
    }

    fn recognizes(&self, state: &ChecklistState) -> bool {
        self.tasks.iter().any(|t| {
            state.active_task_id.as_ref() == Some(&t.id) || state.is_completed(&t.id)
        })
    }

    fn index_of(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == *id)
    }

    fn require(&self, id: &TaskId) -> Result<usize, LifecycleError> {
        self.index_of(id)
            .ok_or_else(|| LifecycleError::TaskNotFound(id.clone()))
    }

    /// Waits out the completion delay, then marks the task complete.
    async fn finish(&mut self, index: usize) {
        if !self.completion_delay.is_zero() {
            tokio::time::sleep(self.completion_delay).await;
        }
        let task = &mut self.tasks[index];
        let previous = task.status;
        task.status = TaskStatus::Complete;
        tracing::debug!(task_id = %task.id, from = %previous, "task marked complete");
    }
}
