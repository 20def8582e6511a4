//! Plain-text rendering of the checklist for the CLI.

use std::fmt::Write as _;

use checklist_proto::task::{Task, TaskStatus};

use crate::lifecycle::{SelectAllState, Selection, Summary};

const fn status_glyph(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "[ ]",
        TaskStatus::Active => "[>]",
        TaskStatus::Complete => "[x]",
    }
}

const fn select_all_marker(state: SelectAllState) -> &'static str {
    match state {
        SelectAllState::None => "( )",
        SelectAllState::Partial => "(-)",
        SelectAllState::All => "(*)",
    }
}

/// Renders the task table: selection, id, status, name, assignee.
#[must_use]
pub fn render_table(tasks: &[Task], selection: &Selection) -> String {
    let id_width = tasks
        .iter()
        .map(|t| t.id.as_str().chars().count())
        .chain(std::iter::once(2))
        .max()
        .unwrap_or(2);
    let name_width = tasks
        .iter()
        .map(|t| t.name.chars().count())
        .chain(std::iter::once(4))
        .max()
        .unwrap_or(4);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}  {:<id_width$}  {:<12}  {:<name_width$}  ASSIGNED TO",
        select_all_marker(selection.select_all_state(tasks.len())),
        "ID",
        "STATUS",
        "TASK",
    );
    for task in tasks {
        let marker = if selection.contains(&task.id) {
            "(*)"
        } else {
            "( )"
        };
        let assignee = match (task.assigned_to.is_empty(), task.assigned_to_name.is_empty()) {
            (true, true) => String::new(),
            (false, true) => task.assigned_to.clone(),
            (true, false) => task.assigned_to_name.clone(),
            (false, false) => format!("{} ({})", task.assigned_to_name, task.assigned_to),
        };
        let _ = writeln!(
            out,
            "{marker}  {:<id_width$}  {} {:<8}  {:<name_width$}  {assignee}",
            task.id.as_str(),
            status_glyph(task.status),
            task.status.to_string(),
            task.name,
        );
    }
    out
}

/// One-line task counts.
#[must_use]
pub fn render_summary(summary: &Summary) -> String {
    format!(
        "{} of {} tasks complete, {} remaining",
        summary.completed, summary.total, summary.remaining
    )
}
