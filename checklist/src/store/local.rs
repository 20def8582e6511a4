//! Local persistence under the browser-storage keys.
//!
//! Writes `completedTasks`, `activeTaskId` and `changeRequestState` into a
//! [`KeyValueStorage`]. On load, completed ids from both the
//! `completedTasks` list and the complete entries of `changeRequestState`
//! are honoured.

use checklist_proto::local::{
    ACTIVE_TASK_ID_KEY, CHANGE_REQUEST_STATE_KEY, COMPLETED_TASKS_KEY, ChangeRequestState,
};
use checklist_proto::state::ChecklistState;
use checklist_proto::task::TaskId;
use serde::de::DeserializeOwned;

use super::kv::KeyValueStorage;
use super::{ChecklistStore, Snapshot, StoreError, StoreKind};

/// [`ChecklistStore`] over browser-style key-value storage.
pub struct LocalStore<K> {
    storage: K,
}

impl<K: KeyValueStorage> LocalStore<K> {
    /// Wraps the given storage.
    pub const fn new(storage: K) -> Self {
        Self { storage }
    }

    /// Borrow the underlying storage.
    pub const fn storage(&self) -> &K {
        &self.storage
    }

    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.storage.get(key).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Malformed {
                key: key.to_string(),
                source,
            })
    }

    async fn write_json<T: serde::Serialize + Sync>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.storage.set(key, &raw).await
    }
}

impl<K: KeyValueStorage> ChecklistStore for LocalStore<K> {
    async fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        let completed_list: Option<Vec<TaskId>> = self.read_json(COMPLETED_TASKS_KEY).await?;
        let active = self.storage.get(ACTIVE_TASK_ID_KEY).await?;
        let record: Option<ChangeRequestState> = self.read_json(CHANGE_REQUEST_STATE_KEY).await?;

        if completed_list.is_none() && active.is_none() && record.is_none() {
            return Ok(None);
        }

        let mut completed = completed_list.unwrap_or_default();
        let record = record.unwrap_or_default();
        for id in record.completed_ids() {
            if !completed.contains(id) {
                completed.push(id.clone());
            }
        }

        let mut state = ChecklistState::starting_at(active.map(TaskId::from));
        state.completed = completed;
        Ok(Some(Snapshot {
            state,
            selected: record.selected_tasks,
            task_states: record.task_states,
        }))
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        self.write_json(COMPLETED_TASKS_KEY, &snapshot.state.completed)
            .await?;
        match &snapshot.state.active_task_id {
            Some(id) => self.storage.set(ACTIVE_TASK_ID_KEY, id.as_str()).await?,
            None => self.storage.remove(ACTIVE_TASK_ID_KEY).await?,
        }
        let record = ChangeRequestState {
            selected_tasks: snapshot.selected.clone(),
            task_states: snapshot.task_states.clone(),
        };
        self.write_json(CHANGE_REQUEST_STATE_KEY, &record).await
    }

    async fn reset(&self) -> Result<(), StoreError> {
        self.storage.remove(COMPLETED_TASKS_KEY).await?;
        self.storage.remove(ACTIVE_TASK_ID_KEY).await?;
        self.storage.remove(CHANGE_REQUEST_STATE_KEY).await
    }

    fn kind(&self) -> StoreKind {
        StoreKind::Local
    }
}
