//! Selection set scoping bulk actions.
//!
//! Selection is independent of status: selecting or deselecting a task
//! never changes its lifecycle state.

use std::collections::HashSet;

use checklist_proto::task::TaskId;

/// Tri-state of the select-all control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectAllState {
    /// Nothing selected.
    None,
    /// Some, but not all, tasks selected.
    Partial,
    /// Every task selected.
    All,
}

/// Set of selected task ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: HashSet<TaskId>,
}

impl Selection {
    /// Creates an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `id`. Returns `true` if it was not already selected.
    pub fn select(&mut self, id: TaskId) -> bool {
        self.ids.insert(id)
    }

    /// Removes `id`. Returns `true` if it was selected.
    pub fn deselect(&mut self, id: &TaskId) -> bool {
        self.ids.remove(id)
    }

    /// Flips `id`. Returns the new membership.
    pub fn toggle(&mut self, id: &TaskId) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.clone());
            true
        }
    }

    /// Removes every id.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Returns `true` if `id` is selected.
    #[must_use]
    pub fn contains(&self, id: &TaskId) -> bool {
        self.ids.contains(id)
    }

    /// Number of selected ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Select-all tri-state relative to a list of `total` tasks.
    #[must_use]
    pub fn select_all_state(&self, total: usize) -> SelectAllState {
        match self.ids.len() {
            0 => SelectAllState::None,
            n if n >= total => SelectAllState::All,
            _ => SelectAllState::Partial,
        }
    }
}
