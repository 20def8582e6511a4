//! Change-request checklist: the task lifecycle manager and its
//! persistence backends.

pub mod config;
pub mod confirm;
pub mod lifecycle;
pub mod store;
pub mod view;
