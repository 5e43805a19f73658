//! Pure query operations on issue collections.
//!
//! These functions operate on slices of issues without requiring repository
//! access, so board views and the repositories share one definition of
//! "backlog", "sprint scope" and so on.

use crate::domain::{Issue, IssueStatus};

/// Issues belonging to a project.
pub fn query_by_project<'a>(issues: &'a [Issue], project_id: &str) -> Vec<&'a Issue> {
    issues.iter().filter(|i| i.project_id == project_id).collect()
}

/// Issues planned into a sprint.
pub fn query_by_sprint<'a>(issues: &'a [Issue], sprint_id: &str) -> Vec<&'a Issue> {
    issues
        .iter()
        .filter(|i| i.sprint_id.as_deref() == Some(sprint_id))
        .collect()
}

/// Issues in a project that are not planned into any sprint.
pub fn query_backlog<'a>(issues: &'a [Issue], project_id: &str) -> Vec<&'a Issue> {
    issues
        .iter()
        .filter(|i| i.project_id == project_id && i.is_backlog())
        .collect()
}

/// Issues with the given status.
pub fn query_by_status<'a>(issues: &'a [Issue], status: IssueStatus) -> Vec<&'a Issue> {
    issues.iter().filter(|i| i.status == status).collect()
}

/// Issues assigned to a user.
pub fn query_by_assignee<'a>(issues: &'a [Issue], assignee_id: &str) -> Vec<&'a Issue> {
    issues
        .iter()
        .filter(|i| i.assignee_id.as_deref() == Some(assignee_id))
        .collect()
}

/// Kanban columns: issues split by status, preserving input order.
#[derive(Debug, Default)]
pub struct BoardColumns<'a> {
    pub to_do: Vec<&'a Issue>,
    pub in_progress: Vec<&'a Issue>,
    pub done: Vec<&'a Issue>,
}

/// Group issues into Kanban columns.
pub fn board_columns<'a, I>(issues: I) -> BoardColumns<'a>
where
    I: IntoIterator<Item = &'a Issue>,
{
    let mut columns = BoardColumns::default();
    for issue in issues {
        match issue.status {
            IssueStatus::ToDo => columns.to_do.push(issue),
            IssueStatus::InProgress => columns.in_progress.push(issue),
            IssueStatus::Done => columns.done.push(issue),
        }
    }
    columns
}

/// Sum of estimated hours; issues without an estimate count as zero.
pub fn total_estimate<'a, I>(issues: I) -> f32
where
    I: IntoIterator<Item = &'a Issue>,
{
    issues
        .into_iter()
        .filter_map(|i| i.estimated_hours)
        .sum()
}
