//! Projection of issue state onto element statuses.
//!
//! [`recompute_statuses`] is a full pass: every element with at least one
//! linked issue gets a fresh status. It never creates a record for an element
//! without linked issues, and it never deletes records; removing statuses
//! after unlinks and deletions is [`prune_orphaned_statuses`]'s job.

use crate::domain::{BpmnElement, ElementState, ElementStatus, Issue};
use crate::status::compute_status;
use crate::storage::{BpmnRepository, IssueRepository};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Outcome of one recomputation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// External ids of every element whose status was written
    pub recomputed: Vec<String>,
    /// Subset of `recomputed` whose status or progress differs from before
    pub changed: Vec<String>,
}

/// Resolve an element's linked issues, skipping ids with no stored issue.
fn linked_issues<'a>(
    issues: &'a IssueRepository,
    bpmn: &BpmnRepository,
    element: &BpmnElement,
) -> Vec<&'a Issue> {
    bpmn.linked_issue_ids(element)
        .iter()
        .filter_map(|id| issues.get(id))
        .collect()
}

/// Recompute and upsert the status of every element with linked issues.
///
/// Elements of different diagrams sharing an external id write the same
/// record; each id is reported once, and counts as changed only if its final
/// value differs from the value before the pass.
pub fn recompute_statuses(
    issues: &IssueRepository,
    bpmn: &mut BpmnRepository,
    now: DateTime<Utc>,
) -> SyncReport {
    let before: HashMap<String, (ElementState, u8)> = bpmn
        .element_statuses()
        .into_iter()
        .map(|s| (s.element_id.clone(), (s.status, s.progress)))
        .collect();

    let computed: Vec<ElementStatus> = bpmn
        .elements_with_links()
        .into_iter()
        .filter_map(|element| {
            let linked = linked_issues(issues, bpmn, element);
            compute_status(&element.element_id, &linked, now)
        })
        .collect();

    let mut report = SyncReport::default();
    let mut seen = HashSet::new();
    for status in computed {
        let element_id = status.element_id.clone();
        bpmn.set_element_status(status);
        if seen.insert(element_id.clone()) {
            report.recomputed.push(element_id);
        }
    }

    for element_id in &report.recomputed {
        let Some(fresh) = bpmn.get_element_status(element_id) else {
            continue;
        };
        if before.get(element_id) != Some(&(fresh.status, fresh.progress)) {
            debug!(element_id = %element_id, status = %fresh.status, progress = fresh.progress, "element status changed");
            report.changed.push(element_id.clone());
        }
    }

    info!(
        recomputed = report.recomputed.len(),
        changed = report.changed.len(),
        "element statuses recomputed"
    );
    report
}

/// Remove status records whose element no longer has any resolvable linked
/// issue. Returns the external ids that were removed.
pub fn prune_orphaned_statuses(issues: &IssueRepository, bpmn: &mut BpmnRepository) -> Vec<String> {
    let orphaned: Vec<String> = bpmn
        .element_statuses()
        .into_iter()
        .map(|s| s.element_id.clone())
        .filter(|element_id| {
            !bpmn
                .elements()
                .iter()
                .filter(|e| &e.element_id == element_id)
                .any(|e| !linked_issues(issues, bpmn, e).is_empty())
        })
        .collect();

    for element_id in &orphaned {
        bpmn.remove_element_status(element_id);
        debug!(element_id = %element_id, "orphaned element status removed");
    }
    orphaned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ElementKind, ElementState, IssueStatus, NewElement, NewIssue};
    use crate::ids::SequentialIds;
    use crate::storage::LinkTable;
    use std::rc::Rc;

    fn repos() -> (IssueRepository, BpmnRepository) {
        let links = LinkTable::new();
        let ids = Rc::new(SequentialIds::new("id"));
        (
            IssueRepository::new(links.clone(), ids.clone()),
            BpmnRepository::new(links, ids),
        )
    }

    #[test]
    fn test_unlinked_elements_get_no_status() {
        let (issues, mut bpmn) = repos();
        bpmn.add_element(NewElement::new("d1", "Task_1", ElementKind::Task, "A"));

        let report = recompute_statuses(&issues, &mut bpmn, Utc::now());

        assert!(report.recomputed.is_empty());
        assert!(bpmn.element_statuses().is_empty());
    }

    #[test]
    fn test_recompute_reports_only_changed_elements() {
        let (mut issues, mut bpmn) = repos();
        let a = issues.add(NewIssue::new("A", "u", "p"));
        let b = issues.add(NewIssue::new("B", "u", "p"));
        bpmn.add_element(NewElement::new("d1", "Task_1", ElementKind::Task, "1"));
        bpmn.add_element(NewElement::new("d1", "Task_2", ElementKind::Task, "2"));
        issues.link_to_bpmn(&a.id, "d1", "Task_1");
        issues.link_to_bpmn(&b.id, "d1", "Task_2");

        let first = recompute_statuses(&issues, &mut bpmn, Utc::now());
        assert_eq!(first.changed.len(), 2);

        issues.update_status(&a.id, IssueStatus::Done);
        let second = recompute_statuses(&issues, &mut bpmn, Utc::now());

        assert_eq!(second.recomputed.len(), 2);
        assert_eq!(second.changed, vec!["Task_1"]);
        assert_eq!(
            bpmn.get_element_status("Task_1").unwrap().status,
            ElementState::Completed
        );
        assert_eq!(
            bpmn.get_element_status("Task_2").unwrap().status,
            ElementState::NotStarted
        );
    }

    #[test]
    fn test_links_to_missing_issues_are_ignored() {
        let (issues, mut bpmn) = repos();
        bpmn.add_element(
            NewElement::new("d1", "Task_1", ElementKind::Task, "A").with_linked_issue("ghost"),
        );

        recompute_statuses(&issues, &mut bpmn, Utc::now());

        assert!(bpmn.get_element_status("Task_1").is_none());
    }

    #[test]
    fn test_prune_removes_status_after_last_unlink() {
        let (mut issues, mut bpmn) = repos();
        let a = issues.add(NewIssue::new("A", "u", "p"));
        bpmn.add_element(NewElement::new("d1", "Task_1", ElementKind::Task, "1"));
        issues.link_to_bpmn(&a.id, "d1", "Task_1");
        recompute_statuses(&issues, &mut bpmn, Utc::now());

        issues.unlink_from_bpmn(&a.id, "d1", "Task_1");
        recompute_statuses(&issues, &mut bpmn, Utc::now());
        // Recomputation alone leaves the stale record in place.
        assert!(bpmn.get_element_status("Task_1").is_some());

        let removed = prune_orphaned_statuses(&issues, &mut bpmn);

        assert_eq!(removed, vec!["Task_1"]);
        assert!(bpmn.get_element_status("Task_1").is_none());
    }

    #[test]
    fn test_shared_external_id_reported_once() {
        let (mut issues, mut bpmn) = repos();
        let a = issues.add(NewIssue::new("A", "u", "p"));
        let b = issues.add(NewIssue::new("B", "u", "p"));
        issues.update_status(&b.id, IssueStatus::Done);
        bpmn.add_element(NewElement::new("d1", "Task_1", ElementKind::Task, "1"));
        bpmn.add_element(NewElement::new("d2", "Task_1", ElementKind::Task, "1"));
        issues.link_to_bpmn(&a.id, "d1", "Task_1");
        issues.link_to_bpmn(&b.id, "d2", "Task_1");

        let first = recompute_statuses(&issues, &mut bpmn, Utc::now());
        assert_eq!(first.recomputed, vec!["Task_1"]);
        assert_eq!(first.changed, vec!["Task_1"]);

        let second = recompute_statuses(&issues, &mut bpmn, Utc::now());
        assert_eq!(second.recomputed, vec!["Task_1"]);
        assert!(second.changed.is_empty());
    }

    #[test]
    fn test_prune_keeps_linked_statuses() {
        let (mut issues, mut bpmn) = repos();
        let a = issues.add(NewIssue::new("A", "u", "p"));
        bpmn.add_element(NewElement::new("d1", "Task_1", ElementKind::Task, "1"));
        issues.link_to_bpmn(&a.id, "d1", "Task_1");
        recompute_statuses(&issues, &mut bpmn, Utc::now());

        assert!(prune_orphaned_statuses(&issues, &mut bpmn).is_empty());
        assert!(bpmn.get_element_status("Task_1").is_some());
    }
}
