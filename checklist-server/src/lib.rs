//! Checklist state server library.
//!
//! Exposes the State API router and the JSON file store for use in tests
//! and embedding. The server keeps a single document recording the active
//! task and the completed task list.

pub mod api;
pub mod config;
pub mod store;
