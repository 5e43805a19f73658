//! Unit tests for domain query functions
//!
//! These tests verify that issue queries work as pure functions over slices,
//! independent of the repositories.

use chrono::Utc;
use flowboard::domain::queries::*;
use flowboard::domain::*;

fn make_issue(id: &str, project: &str, status: IssueStatus) -> Issue {
    Issue::from_draft(
        id.to_string(),
        NewIssue::new(format!("Issue {}", id), "alice", project).with_status(status),
        Utc::now(),
    )
}

fn make_planned(id: &str, project: &str, sprint: &str) -> Issue {
    Issue::from_draft(
        id.to_string(),
        NewIssue::new(format!("Issue {}", id), "alice", project).with_sprint(sprint),
        Utc::now(),
    )
}

#[test]
fn test_query_backlog_excludes_planned_and_foreign_issues() {
    let issues = vec![
        make_issue("id1", "p1", IssueStatus::ToDo),
        make_planned("id2", "p1", "s1"),
        make_issue("id3", "p2", IssueStatus::ToDo),
        make_issue("id4", "p1", IssueStatus::Done),
    ];

    let backlog = query_backlog(&issues, "p1");

    let ids: Vec<&str> = backlog.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["id1", "id4"]);
}

#[test]
fn test_query_by_sprint_and_project() {
    let issues = vec![
        make_planned("id1", "p1", "s1"),
        make_planned("id2", "p1", "s2"),
        make_issue("id3", "p2", IssueStatus::ToDo),
    ];

    assert_eq!(query_by_sprint(&issues, "s1").len(), 1);
    assert_eq!(query_by_project(&issues, "p1").len(), 2);
    assert!(query_by_sprint(&issues, "missing").is_empty());
}

#[test]
fn test_query_by_status() {
    let issues = vec![
        make_issue("id1", "p1", IssueStatus::InProgress),
        make_issue("id2", "p1", IssueStatus::Done),
        make_issue("id3", "p1", IssueStatus::InProgress),
    ];

    let in_progress = query_by_status(&issues, IssueStatus::InProgress);
    assert_eq!(in_progress.len(), 2);
    assert!(in_progress.iter().all(|i| i.status == IssueStatus::InProgress));
}

#[test]
fn test_query_by_assignee_skips_unassigned() {
    let mut assigned = make_issue("id1", "p1", IssueStatus::ToDo);
    assigned.assignee_id = Some("bob".to_string());
    let issues = vec![assigned, make_issue("id2", "p1", IssueStatus::ToDo)];

    let result = query_by_assignee(&issues, "bob");
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].id, "id1");
}

#[test]
fn test_board_columns_preserve_order() {
    let issues = vec![
        make_issue("id1", "p1", IssueStatus::Done),
        make_issue("id2", "p1", IssueStatus::ToDo),
        make_issue("id3", "p1", IssueStatus::Done),
        make_issue("id4", "p1", IssueStatus::InProgress),
    ];

    let columns = board_columns(&issues);

    assert_eq!(columns.to_do.len(), 1);
    assert_eq!(columns.in_progress[0].id, "id4");
    let done: Vec<&str> = columns.done.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(done, vec!["id1", "id3"]);
}

#[test]
fn test_total_estimate_ignores_missing_estimates() {
    let mut a = make_issue("id1", "p1", IssueStatus::ToDo);
    a.estimated_hours = Some(2.5);
    let mut b = make_issue("id2", "p1", IssueStatus::ToDo);
    b.estimated_hours = Some(4.0);
    let issues = vec![a, b, make_issue("id3", "p1", IssueStatus::ToDo)];

    assert_eq!(total_estimate(&issues), 6.5);
}
