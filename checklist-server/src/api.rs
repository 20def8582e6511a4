//! State API: shared server state, HTTP handlers, and server startup.
//!
//! Four JSON endpoints wrap the [`StateStore`]:
//! - `GET  /api/active-task`      read the active task id
//! - `POST /api/active-task`      set the active task (and optionally the completed list)
//! - `GET  /api/completed-tasks`  read the completed list
//! - `POST /api/reset`            restore the default document
//!
//! The only validation is the presence of `activeTaskId` on writes.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checklist_proto::api::{
    ACTIVE_TASK_PATH, ActiveTaskResponse, COMPLETED_TASKS_PATH, CompletedTasksResponse,
    ErrorResponse, MessageResponse, RESET_PATH, SetActiveTaskRequest,
};

use crate::store::{StateStore, StoreError};

/// Shared server state.
pub struct AppState {
    /// Durable copy of the checklist document.
    pub store: StateStore,
}

impl AppState {
    /// Creates server state around an existing store.
    #[must_use]
    pub const fn new(store: StateStore) -> Self {
        Self { store }
    }
}

/// Errors returned to API callers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// `activeTaskId` was absent, null, or empty.
    #[error("activeTaskId is required")]
    MissingActiveTaskId,

    /// The body was not a JSON object of the expected shape.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// The backing file could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::MissingActiveTaskId | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match &self {
            Self::Store(e) => {
                tracing::error!(error = %e, "state store failure");
                "failed to access task state".to_string()
            }
            other => {
                tracing::debug!(error = %other, "rejected request");
                other.to_string()
            }
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

/// Builds the State API router.
pub fn router(state: Arc<AppState>) -> axum::Router {
    axum::Router::new()
        .route(
            ACTIVE_TASK_PATH,
            axum::routing::get(get_active_task).post(set_active_task),
        )
        .route(COMPLETED_TASKS_PATH, axum::routing::get(get_completed_tasks))
        .route(RESET_PATH, axum::routing::post(reset))
        .with_state(state)
}

/// Starts the server on the given address and returns the bound address
/// and a join handle.
///
/// Binding to port `0` picks a free port, which is how tests run the
/// server in-process.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server(
    addr: &str,
    state: Arc<AppState>,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "state server error");
        }
    });

    Ok((bound_addr, handle))
}

async fn get_active_task(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ActiveTaskResponse>, ApiError> {
    let doc = state.store.load().await?;
    Ok(Json(ActiveTaskResponse {
        active_task_id: doc.active_task_id,
    }))
}

async fn set_active_task(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SetActiveTaskRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload?;
    let Some(active_task_id) = request.active_task_id.filter(|id| !id.is_empty()) else {
        return Err(ApiError::MissingActiveTaskId);
    };

    let mut doc = state.store.load().await?;
    doc.active_task_id = Some(active_task_id.clone());
    if let Some(completed) = request.completed {
        doc.completed = completed;
    }
    state.store.save(&doc).await?;

    tracing::info!(
        task_id = %active_task_id,
        completed = doc.completed.len(),
        "active task updated"
    );
    Ok(Json(MessageResponse::new(format!(
        "Task {active_task_id} is now active."
    ))))
}

async fn get_completed_tasks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CompletedTasksResponse>, ApiError> {
    let doc = state.store.load().await?;
    Ok(Json(CompletedTasksResponse {
        completed: doc.completed,
    }))
}

async fn reset(State(state): State<Arc<AppState>>) -> Result<Json<MessageResponse>, ApiError> {
    state.store.reset().await?;
    tracing::info!("task state reset");
    Ok(Json(MessageResponse::new("Task state reset.")))
}
