//! Shared definitions for the checklist: task records, the persisted
//! checklist document, State API bodies, and browser-local storage keys.

pub mod api;
pub mod local;
pub mod state;
pub mod task;
