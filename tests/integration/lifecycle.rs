//! Integration tests for the lifecycle manager over file-backed local storage.
//!
//! Each test builds a fresh manager per "session" on the same storage file,
//! mirroring a page reload: state written by one session must be restored
//! by the next.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::Path;
use std::time::Duration;

use checklist::confirm::{AutoConfirm, AutoDecline, Confirm};
use checklist::lifecycle::{CompletionOutcome, LifecycleManager, SelectAllState};
use checklist::store::kv::{FileStorage, KeyValueStorage};
use checklist::store::local::LocalStore;
use checklist_proto::local::{ACTIVE_TASK_ID_KEY, CHANGE_REQUEST_STATE_KEY, COMPLETED_TASKS_KEY};
use checklist_proto::task::{TaskDefinition, TaskId, TaskStatus};

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

type FileManager<C> = LifecycleManager<LocalStore<FileStorage>, C>;

fn catalog() -> Vec<TaskDefinition> {
    vec![
        TaskDefinition::new("1", "Submit change request").assigned("jsmith", "John Smith"),
        TaskDefinition::new("2", "Assess impact").assigned("mgarcia", "Maria Garcia"),
        TaskDefinition::new("3", "Obtain approval").assigned("achen", "Alice Chen"),
        TaskDefinition::new("4", "Implement change").assigned("rpatel", "Raj Patel"),
    ]
}

/// Opens a session on `path` and restores whatever it holds.
async fn session<C: Confirm>(path: &Path, confirm: C) -> FileManager<C> {
    let mut mgr = LifecycleManager::new(catalog(), LocalStore::new(FileStorage::new(path)), confirm)
        .unwrap()
        .with_completion_delay(Duration::ZERO)
        .with_bulk_delay(Duration::ZERO);
    mgr.load().await;
    mgr
}

fn statuses<C: Confirm>(mgr: &FileManager<C>) -> Vec<TaskStatus> {
    mgr.tasks().iter().map(|t| t.status).collect()
}

fn active_count<C: Confirm>(mgr: &FileManager<C>) -> usize {
    mgr.tasks()
        .iter()
        .filter(|t| t.status == TaskStatus::Active)
        .count()
}

fn id(raw: &str) -> TaskId {
    TaskId::new(raw)
}

use TaskStatus::{Active, Complete, Pending};

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn first_session_starts_with_first_task_active() {
    let dir = tempfile::tempdir().unwrap();
    let mgr = session(&dir.path().join("storage.json"), AutoConfirm).await;
    assert_eq!(statuses(&mgr), vec![Active, Pending, Pending, Pending]);
}

#[tokio::test]
async fn succession_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    let mut mgr = session(&path, AutoConfirm).await;
    let advance = mgr.complete_active().await.unwrap();
    assert_eq!(advance.next, Some(id("2")));
    assert!(advance.persisted);
    drop(mgr);

    let mgr = session(&path, AutoConfirm).await;
    assert_eq!(statuses(&mgr), vec![Complete, Active, Pending, Pending]);
}

#[tokio::test]
async fn completing_every_task_leaves_none_active() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    let mut mgr = session(&path, AutoConfirm).await;
    for _ in 0..4 {
        mgr.complete_active().await.unwrap();
        assert!(active_count(&mgr) <= 1);
    }
    assert!(mgr.complete_active().await.is_none());
    drop(mgr);

    let storage = FileStorage::new(&path);
    assert_eq!(storage.get(ACTIVE_TASK_ID_KEY).await.unwrap(), None);

    let mgr = session(&path, AutoConfirm).await;
    assert_eq!(statuses(&mgr), vec![Complete; 4]);
    assert!(mgr.active_task().is_none());
}

#[tokio::test]
async fn direct_completion_does_not_disturb_active_task() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    let mut mgr = session(&path, AutoConfirm).await;
    mgr.complete_specific(&id("3")).await.unwrap();
    assert_eq!(statuses(&mgr), vec![Active, Pending, Complete, Pending]);

    // Succession skips the task completed out of order.
    mgr.complete_active().await.unwrap();
    mgr.complete_active().await.unwrap();
    assert_eq!(statuses(&mgr), vec![Complete, Complete, Complete, Active]);
}

#[tokio::test]
async fn bulk_completion_persists_selection_and_statuses() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    let mut mgr = session(&path, AutoConfirm).await;
    mgr.select_task(&id("2")).unwrap();
    mgr.select_task(&id("4")).unwrap();
    assert_eq!(mgr.select_all_state(), SelectAllState::Partial);

    let outcome = mgr.complete_selected().await;
    assert_eq!(
        outcome,
        CompletionOutcome::Completed {
            tasks: vec![id("2"), id("4")],
            persisted: true
        }
    );
    drop(mgr);

    let mgr = session(&path, AutoConfirm).await;
    assert_eq!(statuses(&mgr), vec![Active, Complete, Pending, Complete]);
    assert!(mgr.selection().contains(&id("2")));
    assert!(mgr.selection().contains(&id("4")));
}

#[tokio::test]
async fn declined_bulk_completion_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    let mut mgr = session(&path, AutoDecline).await;
    mgr.select_all(true);
    assert_eq!(mgr.select_all_state(), SelectAllState::All);
    assert_eq!(mgr.complete_selected().await, CompletionOutcome::Declined);
    assert!(!path.exists());
}

#[tokio::test]
async fn reset_is_idempotent_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    let mut mgr = session(&path, AutoConfirm).await;
    mgr.complete_active().await.unwrap();
    mgr.complete_specific(&id("4")).await.unwrap();
    assert!(mgr.reset().await);
    let once = mgr.state();
    assert!(mgr.reset().await);
    assert_eq!(mgr.state(), once);
    drop(mgr);

    let mgr = session(&path, AutoConfirm).await;
    assert_eq!(statuses(&mgr), vec![Active, Pending, Pending, Pending]);
    assert!(mgr.selection().is_empty());
}

#[tokio::test]
async fn legacy_storage_layout_is_restored() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    let storage = FileStorage::new(&path);
    storage.set(COMPLETED_TASKS_KEY, r#"["1"]"#).await.unwrap();
    storage.set(ACTIVE_TASK_ID_KEY, "3").await.unwrap();
    storage
        .set(
            CHANGE_REQUEST_STATE_KEY,
            r#"{"selectedTasks":["4","99"],"taskStates":[{"id":"2","status":"completed"}]}"#,
        )
        .await
        .unwrap();

    let mgr = session(&path, AutoConfirm).await;
    assert_eq!(statuses(&mgr), vec![Complete, Complete, Active, Pending]);
    assert_eq!(mgr.selection().len(), 1);
    assert!(mgr.selection().contains(&id("4")));
}

#[tokio::test]
async fn completed_takes_precedence_over_active_on_restore() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    let storage = FileStorage::new(&path);
    storage.set(COMPLETED_TASKS_KEY, r#"["2"]"#).await.unwrap();
    storage.set(ACTIVE_TASK_ID_KEY, "2").await.unwrap();

    let mgr = session(&path, AutoConfirm).await;
    assert_eq!(statuses(&mgr), vec![Pending, Complete, Pending, Pending]);
    assert_eq!(active_count(&mgr), 0);
}

#[tokio::test]
async fn corrupt_storage_degrades_to_initial_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    std::fs::write(&path, "not json").unwrap();

    let mgr = session(&path, AutoConfirm).await;
    assert_eq!(statuses(&mgr), vec![Active, Pending, Pending, Pending]);
}
