//! Property-based tests for the task lifecycle.
//!
//! Uses proptest to drive random operation sequences and verify:
//! 1. At most one task is active after every operation.
//! 2. A complete task only leaves `complete` through a reset.
//! 3. Succession picks the nearest following pending task.
//! 4. Restoring from the derived state reproduces every status.
//! 5. Reset always yields the initial state.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::time::Duration;

use checklist::confirm::AutoConfirm;
use checklist::lifecycle::LifecycleManager;
use checklist::store::kv::MemoryStorage;
use checklist::store::local::LocalStore;
use checklist_proto::task::{TaskDefinition, TaskId, TaskStatus};
use proptest::prelude::*;

type Manager = LifecycleManager<LocalStore<MemoryStorage>, AutoConfirm>;

const TASKS: usize = 6;

#[derive(Debug, Clone)]
enum Op {
    CompleteActive,
    CompleteSpecific(usize),
    Select(usize),
    Toggle(usize),
    SelectAll(bool),
    CompleteSelected,
    Reset,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => Just(Op::CompleteActive),
        2 => (0..TASKS).prop_map(Op::CompleteSpecific),
        2 => (0..TASKS).prop_map(Op::Select),
        1 => (0..TASKS).prop_map(Op::Toggle),
        1 => any::<bool>().prop_map(Op::SelectAll),
        1 => Just(Op::CompleteSelected),
        1 => Just(Op::Reset),
    ]
}

fn manager() -> Manager {
    let defs = (1..=TASKS).map(|i| TaskDefinition::new(i.to_string(), format!("Task {i}")));
    LifecycleManager::new(defs, LocalStore::new(MemoryStorage::new()), AutoConfirm)
        .unwrap()
        .with_completion_delay(Duration::ZERO)
        .with_bulk_delay(Duration::ZERO)
}

fn task_id(index: usize) -> TaskId {
    TaskId::new((index + 1).to_string())
}

fn statuses(mgr: &Manager) -> Vec<TaskStatus> {
    mgr.tasks().iter().map(|t| t.status).collect()
}

fn initial() -> Vec<TaskStatus> {
    let mut expected = vec![TaskStatus::Pending; TASKS];
    expected[0] = TaskStatus::Active;
    expected
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

async fn apply(mgr: &mut Manager, op: &Op) {
    match op {
        Op::CompleteActive => {
            mgr.complete_active().await;
        }
        Op::CompleteSpecific(i) => {
            mgr.complete_specific(&task_id(*i)).await.unwrap();
        }
        Op::Select(i) => {
            mgr.select_task(&task_id(*i)).unwrap();
        }
        Op::Toggle(i) => {
            mgr.toggle_task(&task_id(*i)).unwrap();
        }
        Op::SelectAll(selected) => mgr.select_all(*selected),
        Op::CompleteSelected => {
            mgr.complete_selected().await;
        }
        Op::Reset => {
            mgr.reset().await;
        }
    }
}

proptest! {
    #[test]
    fn at_most_one_active_task(ops in prop::collection::vec(arb_op(), 0..40)) {
        let rt = runtime();
        let mut mgr = manager();
        for op in &ops {
            rt.block_on(apply(&mut mgr, op));
            let active = mgr.tasks().iter().filter(|t| t.status == TaskStatus::Active).count();
            prop_assert!(active <= 1, "{active} active tasks after {op:?}");
            let summary = mgr.summary();
            prop_assert_eq!(summary.completed + summary.remaining, summary.total);
        }
    }

    #[test]
    fn completion_is_terminal_until_reset(ops in prop::collection::vec(arb_op(), 0..40)) {
        let rt = runtime();
        let mut mgr = manager();
        for op in &ops {
            let before = statuses(&mgr);
            rt.block_on(apply(&mut mgr, op));
            if matches!(op, Op::Reset) {
                continue;
            }
            for (old, new) in before.iter().zip(statuses(&mgr)) {
                if old.is_complete() {
                    prop_assert!(new.is_complete(), "complete task changed after {:?}", op);
                }
            }
        }
    }

    #[test]
    fn succession_picks_nearest_following_pending(ops in prop::collection::vec(arb_op(), 0..30)) {
        let rt = runtime();
        let mut mgr = manager();
        for op in &ops {
            rt.block_on(apply(&mut mgr, op));
        }

        let before = statuses(&mgr);
        let active_index = before.iter().position(|s| *s == TaskStatus::Active);
        let advance = rt.block_on(mgr.complete_active());

        match active_index {
            None => {
                prop_assert!(advance.is_none());
                prop_assert_eq!(statuses(&mgr), before);
            }
            Some(index) => {
                let expected_next = before[index + 1..]
                    .iter()
                    .position(|s| *s == TaskStatus::Pending)
                    .map(|offset| task_id(index + 1 + offset));
                let advance = advance.unwrap();
                prop_assert_eq!(advance.completed, task_id(index));
                prop_assert_eq!(advance.next, expected_next);
            }
        }
    }

    #[test]
    fn restore_from_state_reproduces_statuses(ops in prop::collection::vec(arb_op(), 0..30)) {
        let rt = runtime();
        let mut mgr = manager();
        for op in &ops {
            rt.block_on(apply(&mut mgr, op));
        }

        let expected = statuses(&mgr);
        let state = mgr.state();
        let mut fresh = manager();
        fresh.restore(&state);
        prop_assert_eq!(statuses(&fresh), expected);
    }

    #[test]
    fn reset_yields_initial_state(ops in prop::collection::vec(arb_op(), 0..30)) {
        let rt = runtime();
        let mut mgr = manager();
        for op in &ops {
            rt.block_on(apply(&mut mgr, op));
        }

        rt.block_on(mgr.reset());
        prop_assert_eq!(statuses(&mgr), initial());
        prop_assert!(mgr.selection().is_empty());
        let state = mgr.state();
        prop_assert_eq!(state.active_task_id, Some(task_id(0)));
        prop_assert!(state.completed.is_empty());
    }
}
