//! In-memory issue repository.
//!
//! Issues are kept in insertion order so board columns and the backlog list
//! render in the order issues were created. Links to diagram elements live in
//! the shared [`LinkTable`]; deleting an issue removes its rows there, which
//! detaches it from every element at once.

use crate::domain::queries;
use crate::domain::{Issue, IssueStatus, IssueUpdate, LinkedElement, NewIssue};
use crate::ids::IdGenerator;
use crate::storage::links::{Link, LinkTable};
use chrono::Utc;
use std::rc::Rc;
use tracing::debug;

/// Issue collection with CRUD, relation queries and BPMN link operations.
///
/// Lookups that miss return `None`/empty; mutations of unknown ids are
/// no-ops that return `None`/`false`.
///
/// # Examples
///
/// ```
/// use flowboard::domain::{IssueStatus, NewIssue};
/// use flowboard::ids::SequentialIds;
/// use flowboard::storage::{IssueRepository, LinkTable};
/// use std::rc::Rc;
///
/// let mut issues = IssueRepository::new(LinkTable::new(), Rc::new(SequentialIds::new("issue")));
/// let issue = issues.add(NewIssue::new("Write docs", "alice", "proj-1"));
/// issues.update_status(&issue.id, IssueStatus::Done);
///
/// assert_eq!(issues.get(&issue.id).unwrap().status, IssueStatus::Done);
/// ```
pub struct IssueRepository {
    issues: Vec<Issue>,
    links: LinkTable,
    ids: Rc<dyn IdGenerator>,
}

impl IssueRepository {
    pub fn new(links: LinkTable, ids: Rc<dyn IdGenerator>) -> Self {
        Self {
            issues: Vec::new(),
            links,
            ids,
        }
    }

    /// Store a new issue with a fresh id and both timestamps set to now.
    pub fn add(&mut self, draft: NewIssue) -> Issue {
        let issue = Issue::from_draft(self.ids.next_id(), draft, Utc::now());
        debug!(issue_id = %issue.id, project_id = %issue.project_id, "issue added");
        self.issues.push(issue.clone());
        issue
    }

    /// Store an issue as-is, keeping its id and timestamps. Replaces any
    /// issue with the same id. Used when restoring snapshots.
    pub fn restore(&mut self, issue: Issue) {
        match self.position(&issue.id) {
            Some(idx) => self.issues[idx] = issue,
            None => self.issues.push(issue),
        }
    }

    /// Apply a partial update and stamp `updated_at`.
    pub fn update(&mut self, id: &str, update: IssueUpdate) -> Option<Issue> {
        let issue = self.get_mut(id)?;
        update.apply_to(issue);
        issue.updated_at = Utc::now();
        Some(issue.clone())
    }

    /// Remove an issue and every link row that names it.
    pub fn delete(&mut self, id: &str) -> Option<Issue> {
        let idx = self.position(id)?;
        let removed = self.issues.remove(idx);
        let unlinked = self.links.remove_issue(id);
        debug!(issue_id = %id, links_removed = unlinked.len(), "issue deleted");
        Some(removed)
    }

    pub fn get(&self, id: &str) -> Option<&Issue> {
        self.issues.iter().find(|i| i.id == id)
    }

    /// All issues in insertion order.
    pub fn list(&self) -> &[Issue] {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn get_by_project(&self, project_id: &str) -> Vec<&Issue> {
        queries::query_by_project(&self.issues, project_id)
    }

    pub fn get_by_sprint(&self, sprint_id: &str) -> Vec<&Issue> {
        queries::query_by_sprint(&self.issues, sprint_id)
    }

    /// Issues of a project that are not in any sprint.
    pub fn get_backlog(&self, project_id: &str) -> Vec<&Issue> {
        queries::query_backlog(&self.issues, project_id)
    }

    pub fn get_by_status(&self, status: IssueStatus) -> Vec<&Issue> {
        queries::query_by_status(&self.issues, status)
    }

    pub fn get_by_assignee(&self, assignee_id: &str) -> Vec<&Issue> {
        queries::query_by_assignee(&self.issues, assignee_id)
    }

    pub fn update_status(&mut self, id: &str, status: IssueStatus) -> Option<Issue> {
        self.update(id, IssueUpdate::status(status))
    }

    /// Move an issue into a sprint, or back to the backlog with `None`.
    pub fn assign_to_sprint(&mut self, id: &str, sprint_id: Option<String>) -> Option<Issue> {
        self.update(id, IssueUpdate::sprint(sprint_id))
    }

    /// Link an issue to a diagram element.
    ///
    /// Returns `true` only when a new link was created. Linking an existing
    /// pair again, or linking an unknown issue, changes nothing.
    pub fn link_to_bpmn(&mut self, issue_id: &str, diagram_id: &str, element_id: &str) -> bool {
        let Some(issue) = self.issues.iter_mut().find(|i| i.id == issue_id) else {
            return false;
        };
        if !self.links.insert(Link::new(issue_id, diagram_id, element_id)) {
            return false;
        }
        issue.updated_at = Utc::now();
        debug!(issue_id, diagram_id, element_id, "issue linked");
        true
    }

    /// Remove the link between an issue and a diagram element.
    ///
    /// Stamps `updated_at` whenever the issue exists, even if no link matched.
    pub fn unlink_from_bpmn(&mut self, issue_id: &str, diagram_id: &str, element_id: &str) -> bool {
        let Some(issue) = self.issues.iter_mut().find(|i| i.id == issue_id) else {
            return false;
        };
        issue.updated_at = Utc::now();
        let removed = self.links.remove(issue_id, diagram_id, element_id);
        if removed {
            debug!(issue_id, diagram_id, element_id, "issue unlinked");
        }
        removed
    }

    /// Issues linked to an external element id, in any diagram.
    pub fn get_issues_by_bpmn_element(&self, element_id: &str) -> Vec<&Issue> {
        let linked = self.links.issues_for_element_id(element_id);
        self.issues.iter().filter(|i| linked.contains(&i.id)).collect()
    }

    /// Issues linked to any element of a diagram.
    pub fn get_issues_by_bpmn_diagram(&self, diagram_id: &str) -> Vec<&Issue> {
        let linked = self.links.issues_for_diagram(diagram_id);
        self.issues.iter().filter(|i| linked.contains(&i.id)).collect()
    }

    /// Elements an issue is linked to; empty for unknown issues.
    pub fn get_linked_elements(&self, issue_id: &str) -> Vec<LinkedElement> {
        self.links.elements_for_issue(issue_id)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.issues.iter().position(|i| i.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Issue> {
        self.issues.iter_mut().find(|i| i.id == id)
    }
}
