//! Remote persistence through the State API.
//!
//! Only the active task id and the completed list live on the server;
//! selection and per-task statuses stay with the session. Requests are
//! sent once, with no retry and no timeout beyond the HTTP client's.

use checklist_proto::api::{
    ACTIVE_TASK_PATH, ActiveTaskResponse, COMPLETED_TASKS_PATH, CompletedTasksResponse,
    MessageResponse, RESET_PATH, SetActiveTaskRequest,
};
use checklist_proto::state::ChecklistState;
use checklist_proto::task::TaskId;
use url::Url;

use super::{ChecklistStore, Snapshot, StoreError, StoreKind};

/// [`ChecklistStore`] backed by a checklist state server.
pub struct RemoteStore {
    client: reqwest::Client,
    base: Url,
}

impl RemoteStore {
    /// Creates a store talking to the server at `base`
    /// (e.g. `http://127.0.0.1:3000`).
    #[must_use]
    pub fn new(base: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, StoreError> {
        Ok(self.base.join(path)?)
    }
}

/// Picks the id sent as `activeTaskId`.
///
/// The server requires one. Once no task is active the last completed id
/// stands in; restore gives completion precedence, so it reads back as
/// complete rather than active.
fn outgoing_active_id(state: &ChecklistState) -> Option<&TaskId> {
    state
        .active_task_id
        .as_ref()
        .filter(|id| !id.is_empty())
        .or_else(|| state.completed.last())
}

impl ChecklistStore for RemoteStore {
    async fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        let active: ActiveTaskResponse = self
            .client
            .get(self.endpoint(ACTIVE_TASK_PATH)?)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let completed: CompletedTasksResponse = self
            .client
            .get(self.endpoint(COMPLETED_TASKS_PATH)?)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        tracing::debug!(
            active = ?active.active_task_id,
            completed = completed.completed.len(),
            "fetched remote checklist state"
        );

        let mut state = ChecklistState::starting_at(active.active_task_id);
        state.completed = completed.completed;
        Ok(Some(Snapshot {
            state,
            ..Snapshot::default()
        }))
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let Some(active_task_id) = outgoing_active_id(&snapshot.state) else {
            tracing::debug!("nothing active or completed, skipping remote save");
            return Ok(());
        };
        let request = SetActiveTaskRequest {
            active_task_id: Some(active_task_id.clone()),
            completed: Some(snapshot.state.completed.clone()),
        };
        let reply: MessageResponse = self
            .client
            .post(self.endpoint(ACTIVE_TASK_PATH)?)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        tracing::debug!(message = %reply.message, "remote checklist state saved");
        Ok(())
    }

    async fn reset(&self) -> Result<(), StoreError> {
        let reply: MessageResponse = self
            .client
            .post(self.endpoint(RESET_PATH)?)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        tracing::debug!(message = %reply.message, "remote checklist state reset");
        Ok(())
    }

    fn kind(&self) -> StoreKind {
        StoreKind::Remote
    }
}
