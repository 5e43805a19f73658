//! Element status aggregation.
//!
//! Rules, first match wins:
//! 1. every linked issue done → `completed`, 100
//! 2. any linked issue in progress → `in_progress`, share of done issues
//! 3. otherwise → `not_started`, 0
//!
//! `blocked` exists in the model but no rule produces it yet.

use crate::domain::{ElementState, ElementStatus, Issue, IssueStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregate the issues linked to one element into its status.
///
/// Returns `None` for an empty slice: unlinked elements have no status record.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use flowboard::domain::{ElementState, Issue, IssueStatus, NewIssue};
/// use flowboard::status::compute_status;
///
/// let now = Utc::now();
/// let issue = |id: &str, status| {
///     Issue::from_draft(id.to_string(), NewIssue::new("t", "u", "p").with_status(status), now)
/// };
/// let issues = [
///     issue("a", IssueStatus::Done),
///     issue("b", IssueStatus::InProgress),
///     issue("c", IssueStatus::ToDo),
/// ];
/// let linked: Vec<&Issue> = issues.iter().collect();
///
/// let status = compute_status("Task_1", &linked, now).unwrap();
/// assert_eq!(status.status, ElementState::InProgress);
/// assert_eq!(status.progress, 33);
/// ```
pub fn compute_status(
    element_id: &str,
    linked_issues: &[&Issue],
    now: DateTime<Utc>,
) -> Option<ElementStatus> {
    let total = linked_issues.len();
    if total == 0 {
        return None;
    }

    let done = count(linked_issues, IssueStatus::Done);
    let in_progress = count(linked_issues, IssueStatus::InProgress);

    let (status, progress) = if done == total {
        (ElementState::Completed, 100)
    } else if in_progress > 0 {
        (ElementState::InProgress, percent(done, total))
    } else {
        (ElementState::NotStarted, 0)
    };

    Some(ElementStatus {
        element_id: element_id.to_string(),
        status,
        progress,
        last_updated: now,
    })
}

fn count(issues: &[&Issue], status: IssueStatus) -> usize {
    issues.iter().filter(|i| i.status == status).count()
}

/// `round(100 * part / total)`; callers guarantee `part <= total` and `total > 0`.
fn percent(part: usize, total: usize) -> u8 {
    ((part as f64 * 100.0) / total as f64).round() as u8
}

/// Stroke and fill colours for one status, as CSS hex strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Colors {
    pub stroke: String,
    pub fill: String,
}

impl Colors {
    pub fn new(stroke: impl Into<String>, fill: impl Into<String>) -> Self {
        Self {
            stroke: stroke.into(),
            fill: fill.into(),
        }
    }
}

/// Colours renderers apply to elements, by status.
///
/// `blocked` has no colour because nothing produces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusPalette {
    pub completed: Colors,
    pub in_progress: Colors,
    pub not_started: Colors,
}

impl Default for StatusPalette {
    fn default() -> Self {
        Self {
            completed: Colors::new("#4caf50", "#e8f5e9"),
            in_progress: Colors::new("#ff9800", "#fff8e1"),
            not_started: Colors::new("#9e9e9e", "#f5f5f5"),
        }
    }
}

impl StatusPalette {
    pub fn colors_for(&self, state: ElementState) -> Option<&Colors> {
        match state {
            ElementState::Completed => Some(&self.completed),
            ElementState::InProgress => Some(&self.in_progress),
            ElementState::NotStarted => Some(&self.not_started),
            ElementState::Blocked => None,
        }
    }
}
