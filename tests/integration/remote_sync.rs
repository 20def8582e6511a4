//! Integration tests for remote persistence through the State API.
//!
//! Runs `checklist-server` in-process on an OS-assigned port and drives a
//! lifecycle manager backed by [`RemoteStore`] against it.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use checklist::confirm::AutoConfirm;
use checklist::lifecycle::LifecycleManager;
use checklist::store::remote::RemoteStore;
use checklist::store::{ChecklistStore, StoreKind};
use checklist_proto::state::from_document;
use checklist_proto::task::{TaskDefinition, TaskId, TaskStatus};
use checklist_server::api::{AppState, start_server};
use checklist_server::store::StateStore;
use url::Url;

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// A running server plus the directory holding its data file.
struct TestServer {
    url: Url,
    dir: tempfile::TempDir,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = StateStore::new(dir.path().join("state.json"));
        let (addr, handle) = start_server("127.0.0.1:0", Arc::new(AppState::new(store)))
            .await
            .expect("failed to start test server");
        Self {
            url: Url::parse(&format!("http://{addr}")).unwrap(),
            dir,
            handle,
        }
    }

    fn document(&self) -> checklist_proto::state::ChecklistState {
        let text = std::fs::read_to_string(self.dir.path().join("state.json")).unwrap();
        from_document(&text).unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

type RemoteManager = LifecycleManager<RemoteStore, AutoConfirm>;

fn catalog() -> Vec<TaskDefinition> {
    (1..=4)
        .map(|i| TaskDefinition::new(i.to_string(), format!("Task {i}")))
        .collect()
}

async fn session(url: &Url) -> (RemoteManager, bool) {
    session_with(url, catalog()).await
}

async fn session_with(url: &Url, catalog: Vec<TaskDefinition>) -> (RemoteManager, bool) {
    let mut mgr = LifecycleManager::new(catalog, RemoteStore::new(url.clone()), AutoConfirm)
        .unwrap()
        .with_completion_delay(Duration::ZERO)
        .with_bulk_delay(Duration::ZERO);
    let restored = mgr.load().await;
    (mgr, restored)
}

fn statuses(mgr: &RemoteManager) -> Vec<TaskStatus> {
    mgr.tasks().iter().map(|t| t.status).collect()
}

fn id(raw: &str) -> TaskId {
    TaskId::new(raw)
}

/// A URL on a port nothing listens on.
async fn unreachable_url() -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{addr}")).unwrap()
}

use TaskStatus::{Active, Complete, Pending};

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fresh_server_restores_default_state() {
    let server = TestServer::start().await;
    let (mgr, restored) = session(&server.url).await;
    assert!(restored);
    assert_eq!(mgr.store().kind(), StoreKind::Remote);
    assert_eq!(statuses(&mgr), vec![Active, Pending, Pending, Pending]);
}

#[tokio::test]
async fn completion_is_visible_to_next_session() {
    let server = TestServer::start().await;

    let (mut mgr, _) = session(&server.url).await;
    let advance = mgr.complete_active().await.unwrap();
    assert!(advance.persisted);
    mgr.complete_specific(&id("4")).await.unwrap();

    let doc = server.document();
    assert_eq!(doc.active_task_id, Some(id("2")));
    assert_eq!(doc.completed, vec![id("1"), id("4")]);

    let (next, _) = session(&server.url).await;
    assert_eq!(statuses(&next), vec![Complete, Active, Pending, Complete]);
}

#[tokio::test]
async fn finishing_the_checklist_round_trips() {
    let server = TestServer::start().await;

    let (mut mgr, _) = session(&server.url).await;
    while mgr.complete_active().await.is_some() {}
    assert!(mgr.active_task().is_none());

    // With nothing active the last completed id stands in on the wire.
    assert_eq!(server.document().active_task_id, Some(id("4")));

    let (next, _) = session(&server.url).await;
    assert_eq!(statuses(&next), vec![Complete; 4]);
}

#[tokio::test]
async fn reset_clears_remote_state() {
    let server = TestServer::start().await;

    let (mut mgr, _) = session(&server.url).await;
    mgr.complete_active().await.unwrap();
    mgr.complete_active().await.unwrap();
    assert!(mgr.reset().await);

    let doc = server.document();
    assert_eq!(doc.active_task_id, Some(id("1")));
    assert!(doc.completed.is_empty());

    let (next, _) = session(&server.url).await;
    assert_eq!(statuses(&next), vec![Active, Pending, Pending, Pending]);
}

#[tokio::test]
async fn remote_store_load_reads_both_endpoints() {
    let server = TestServer::start().await;
    let store = RemoteStore::new(server.url.clone());

    let (mut mgr, _) = session(&server.url).await;
    mgr.complete_active().await.unwrap();

    let snapshot = store.load().await.unwrap().unwrap();
    assert_eq!(snapshot.state.active_task_id, Some(id("2")));
    assert_eq!(snapshot.state.completed, vec![id("1")]);
    assert!(snapshot.selected.is_empty());
}

#[tokio::test]
async fn catalog_not_starting_at_one_keeps_its_first_task_active() {
    let server = TestServer::start().await;
    let lettered = || {
        ["a", "b", "c"]
            .into_iter()
            .map(|i| TaskDefinition::new(i, format!("Task {i}")))
            .collect::<Vec<_>>()
    };

    let (mut mgr, restored) = session_with(&server.url, lettered()).await;
    assert!(!restored);
    assert_eq!(statuses(&mgr), vec![Active, Pending, Pending]);

    let advance = mgr.complete_active().await.unwrap();
    assert_eq!(advance.completed, id("a"));
    assert_eq!(advance.next, Some(id("b")));
    assert!(advance.persisted);

    let (mut next, restored) = session_with(&server.url, lettered()).await;
    assert!(restored);
    assert_eq!(statuses(&next), vec![Complete, Active, Pending]);

    assert!(next.reset().await);
    let (fresh, _) = session_with(&server.url, lettered()).await;
    assert_eq!(statuses(&fresh), vec![Active, Pending, Pending]);
}

#[tokio::test]
async fn unreachable_server_degrades_to_initial_state() {
    let url = unreachable_url().await;

    let (mut mgr, restored) = session(&url).await;
    assert!(!restored);
    assert_eq!(statuses(&mgr), vec![Active, Pending, Pending, Pending]);

    let advance = mgr.complete_active().await.unwrap();
    assert!(!advance.persisted);
    assert_eq!(statuses(&mgr), vec![Complete, Active, Pending, Pending]);

    assert!(!mgr.reset().await);
    assert_eq!(statuses(&mgr), vec![Active, Pending, Pending, Pending]);
}
