//! Integration tests for the workspace: linking, status projection and
//! cascades, exercised through the public API only.

mod harness;

use flowboard::config::BoardConfig;
use flowboard::domain::{
    BpmnElement, ElementKind, ElementState, ElementUpdate, Event, IssueStatus, IssueUpdate,
    NewDiagram, NewElement, NewIssue, NewSprint,
};
use flowboard::ids::SequentialIds;
use flowboard::workspace::Workspace;
use harness::BoardHarness;
use std::rc::Rc;

#[test]
fn test_added_issue_reads_back_unchanged() {
    let mut board = BoardHarness::new();
    let draft = NewIssue::new("Payment form", "alice", &board.project_id)
        .with_description("Card and IBAN")
        .with_assignee("bob")
        .with_estimate(5.0);

    let issue = board.ws.add_issue(draft);
    let stored = board.ws.issues().get(&issue.id).unwrap();

    assert_eq!(stored, &issue);
    assert_eq!(stored.title, "Payment form");
    assert_eq!(stored.assignee_id.as_deref(), Some("bob"));
    assert_eq!(stored.status, IssueStatus::ToDo);
}

#[test]
fn test_linking_twice_keeps_one_link_on_both_sides() {
    let mut board = BoardHarness::new();
    let element = board.element("Task_pay");
    let issue = board.issue("Payment form");

    assert!(board.link(&issue.id, "Task_pay"));
    assert!(!board.link(&issue.id, "Task_pay"));

    assert_eq!(board.ws.issues().get_linked_elements(&issue.id).len(), 1);
    assert_eq!(board.ws.bpmn().linked_issue_ids(&element), vec![issue.id.clone()]);
    assert_eq!(board.ws.links().len(), 1);
}

#[test]
fn test_diagram_delete_removes_elements_and_statuses_but_not_links() {
    let mut board = BoardHarness::new();
    board.element("Task_a");
    board.element("Task_b");
    let issue = board.issue("A");
    board.link(&issue.id, "Task_a");
    assert!(board.status_of("Task_a").is_some());

    let diagram_id = board.diagram_id.clone();
    let removal = board.ws.delete_diagram(&diagram_id).unwrap();

    assert_eq!(removal.elements.len(), 2);
    assert!(board.ws.bpmn().get_elements_by_diagram(&diagram_id).is_empty());
    assert!(board.status_of("Task_a").is_none());
    assert_eq!(board.ws.issues().get_linked_elements(&issue.id).len(), 1);
    assert_eq!(board.ws.dangling_links().len(), 1);
}

#[test]
fn test_status_examples_through_workspace() {
    let mut board = BoardHarness::new();
    board.element("Task_done");
    board.element("Task_mixed");
    board.element("Task_todo");

    for _ in 0..3 {
        let issue = board.issue_with_status("done", IssueStatus::Done);
        board.link(&issue.id, "Task_done");
    }
    for status in [IssueStatus::Done, IssueStatus::InProgress, IssueStatus::ToDo] {
        let issue = board.issue_with_status("mixed", status);
        board.link(&issue.id, "Task_mixed");
    }
    for _ in 0..2 {
        let issue = board.issue("todo");
        board.link(&issue.id, "Task_todo");
    }

    assert_eq!(board.status_of("Task_done"), Some((ElementState::Completed, 100)));
    assert_eq!(board.status_of("Task_mixed"), Some((ElementState::InProgress, 33)));
    assert_eq!(board.status_of("Task_todo"), Some((ElementState::NotStarted, 0)));
}

#[test]
fn test_backlog_lists_only_unplanned_project_issues() {
    let mut board = BoardHarness::new();
    let start = chrono::Utc::now();
    let sprint = board
        .ws
        .sprints_mut()
        .add(NewSprint::new("Sprint 1", &board.project_id, start, start));

    let backlog = board.issue("Unplanned");
    let planned = board.issue("Planned");
    board
        .ws
        .assign_issue_to_sprint(&planned.id, Some(sprint.id.clone()));
    board.ws.add_issue(NewIssue::new("Other project", "alice", "elsewhere"));

    let result = board.ws.issues().get_backlog(&board.project_id);
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].id, backlog.id);
    assert_eq!(
        board.ws.sprints().get(&sprint.id).unwrap().issue_ids,
        vec![planned.id]
    );
}

#[test]
fn test_done_update_changes_only_elements_linked_to_that_issue() {
    let mut board = BoardHarness::new();
    board.element("Task_a");
    board.element("Task_b");
    let a = board.issue("A");
    let b = board.issue("B");
    board.link(&a.id, "Task_a");
    board.link(&b.id, "Task_b");

    board
        .ws
        .update_issue(&a.id, IssueUpdate::status(IssueStatus::Done))
        .unwrap();

    assert_eq!(board.status_of("Task_a"), Some((ElementState::Completed, 100)));
    assert_eq!(board.status_of("Task_b"), Some((ElementState::NotStarted, 0)));
    match board.ws.events().last() {
        Some(Event::StatusesRecomputed { changed, .. }) => assert_eq!(changed, &vec!["Task_a"]),
        other => panic!("expected a recompute event, got {:?}", other),
    }
}

#[test]
fn test_unlinking_last_issue_clears_status() {
    let mut board = BoardHarness::new();
    board.element("Task_a");
    let a = board.issue("A");
    let b = board.issue("B");
    board.link(&a.id, "Task_a");
    board.link(&b.id, "Task_a");

    let diagram_id = board.diagram_id.clone();
    board.ws.unlink_issue(&a.id, &diagram_id, "Task_a");
    assert!(board.status_of("Task_a").is_some());

    board.ws.unlink_issue(&b.id, &diagram_id, "Task_a");
    assert!(board.status_of("Task_a").is_none());
}

#[test]
fn test_element_seeded_with_issues_gets_status() {
    let mut board = BoardHarness::new();
    let issue = board.issue_with_status("A", IssueStatus::InProgress);

    board.ws.add_element(
        NewElement::new(&board.diagram_id, "Task_seeded", ElementKind::Task, "Seeded")
            .with_linked_issue(&issue.id),
    );

    assert_eq!(board.status_of("Task_seeded"), Some((ElementState::InProgress, 0)));
    assert_eq!(board.ws.issues().get_linked_elements(&issue.id).len(), 1);
}

#[test]
fn test_renaming_element_id_moves_links() {
    let mut board = BoardHarness::new();
    let element = board.element("Task_old");
    let issue = board.issue("A");
    board.link(&issue.id, "Task_old");

    board
        .ws
        .update_element(
            &element.id,
            ElementUpdate {
                element_id: Some("Task_new".to_string()),
                ..ElementUpdate::default()
            },
        )
        .unwrap();

    let linked = board.ws.issues().get_linked_elements(&issue.id);
    assert_eq!(linked[0].element_id, "Task_new");
    assert!(board.status_of("Task_old").is_none());
    assert_eq!(board.status_of("Task_new"), Some((ElementState::NotStarted, 0)));
}

#[test]
fn test_renaming_element_without_rekey_keeps_status() {
    let mut board = BoardHarness::new();
    let element = board.element("Task_a");
    let issue = board.issue_with_status("A", IssueStatus::Done);
    board.link(&issue.id, "Task_a");

    let updated = board
        .ws
        .update_element(
            &element.id,
            ElementUpdate {
                name: Some("Charge card".to_string()),
                ..ElementUpdate::default()
            },
        )
        .unwrap();

    assert_eq!(updated.name, "Charge card");
    assert_eq!(board.status_of("Task_a"), Some((ElementState::Completed, 100)));
}

#[test]
fn test_element_side_unlink_clears_status() {
    let mut board = BoardHarness::new();
    board.element("Task_a");
    board.element("Task_b");
    let a = board.issue("A");
    let b = board.issue("B");
    board.link(&b.id, "Task_b");

    assert!(board.ws.link_element_issue("Task_a", &a.id));
    assert!(!board.ws.link_element_issue("Task_a", &a.id));
    assert_eq!(board.status_of("Task_a"), Some((ElementState::NotStarted, 0)));
    assert!(matches!(
        board.ws.events().iter().rev().nth(1),
        Some(Event::IssueLinked { element_id, .. }) if element_id == "Task_a"
    ));

    assert!(board.ws.unlink_element_issue("Task_a", &a.id));
    assert!(board.status_of("Task_a").is_none());
    assert!(board.ws.issues().get_linked_elements(&a.id).is_empty());
    assert!(board
        .ws
        .events()
        .iter()
        .any(|e| matches!(e, Event::IssueUnlinked { element_id, .. } if element_id == "Task_a")));

    // A later recompute must not bring the status back
    board
        .ws
        .update_issue(&b.id, IssueUpdate::status(IssueStatus::Done))
        .unwrap();
    assert!(board.status_of("Task_a").is_none());
    assert_eq!(board.status_of("Task_b"), Some((ElementState::Completed, 100)));
}

#[test]
fn test_element_side_link_ignores_unknown_issue() {
    let mut board = BoardHarness::new();
    board.element("Task_a");

    assert!(!board.ws.link_element_issue("Task_a", "ghost"));
    assert!(!board.ws.unlink_element_issue("Task_a", "ghost"));
    assert!(board.status_of("Task_a").is_none());
    assert!(board.ws.links().all().is_empty());
}

/// Second diagram in the harness project holding `element_id`, linked to `issue_id`
fn shared_element_in_second_diagram(
    board: &mut BoardHarness,
    element_id: &str,
    issue_id: &str,
) -> (String, BpmnElement) {
    let diagram = board.ws.bpmn_mut().add_diagram(NewDiagram::new(
        "Refund flow",
        &board.project_id,
        "<definitions/>",
    ));
    let element = board.ws.add_element(NewElement::new(
        &diagram.id,
        element_id,
        ElementKind::Task,
        element_id,
    ));
    assert!(board.ws.link_issue(issue_id, &diagram.id, element_id));
    (diagram.id, element)
}

#[test]
fn test_deleting_element_reprojects_shared_external_id() {
    let mut board = BoardHarness::new();
    let first = board.element("Task_shared");
    let todo = board.issue("Open");
    let done = board.issue_with_status("Closed", IssueStatus::Done);
    board.link(&todo.id, "Task_shared");
    shared_element_in_second_diagram(&mut board, "Task_shared", &done.id);

    board.ws.delete_element(&first.id).unwrap();

    assert_eq!(board.status_of("Task_shared"), Some((ElementState::Completed, 100)));
}

#[test]
fn test_deleting_diagram_reprojects_shared_external_id() {
    let mut board = BoardHarness::new();
    board.element("Task_shared");
    let todo = board.issue("Open");
    let done = board.issue_with_status("Closed", IssueStatus::Done);
    board.link(&done.id, "Task_shared");
    let (second, _) = shared_element_in_second_diagram(&mut board, "Task_shared", &todo.id);

    board.ws.delete_diagram(&second).unwrap();

    assert_eq!(board.status_of("Task_shared"), Some((ElementState::Completed, 100)));
}

#[test]
fn test_snapshot_round_trip_recomputes_statuses() {
    let mut board = BoardHarness::new();
    board.element("Task_a");
    let issue = board.issue_with_status("A", IssueStatus::Done);
    board.link(&issue.id, "Task_a");

    let json = board.ws.to_snapshot().to_json().unwrap();
    assert!(!json.contains("last_updated"));

    let snapshot = flowboard::snapshot::WorkspaceSnapshot::from_json(&json).unwrap();
    let restored = Workspace::from_snapshot(
        snapshot,
        Rc::new(SequentialIds::new("restored")),
        BoardConfig::default(),
    );

    assert_eq!(restored.issues().get(&issue.id), board.ws.issues().get(&issue.id));
    assert_eq!(restored.links().all(), board.ws.links().all());
    assert_eq!(
        restored.bpmn().get_element_status("Task_a").map(|s| s.status),
        Some(ElementState::Completed)
    );
    assert_eq!(restored.to_snapshot(), board.ws.to_snapshot());
}

#[test]
fn test_missing_ids_are_noops() {
    let mut board = BoardHarness::new();

    assert!(board.ws.update_issue_status("ghost", IssueStatus::Done).is_none());
    assert!(board.ws.delete_issue("ghost").is_none());
    assert!(!board.ws.link_issue("ghost", "d", "e"));
    assert!(board.ws.delete_diagram("ghost").is_none());
    assert!(board.ws.delete_element("ghost").is_none());
    assert!(board.ws.delete_project("ghost").is_none());
    assert!(board.ws.events().is_empty());
}
