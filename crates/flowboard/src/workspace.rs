//! Composition root.
//!
//! A [`Workspace`] owns one of each repository, the shared link table, the
//! configuration and the change-event log. Issue mutations, link changes and
//! element edits or deletions go through it so that element statuses are
//! recomputed (when `sync.auto_recompute` is on) and the cascades that remove
//! stale statuses run after unlinks and deletions. Read access to the
//! repositories is direct.

use crate::config::BoardConfig;
use crate::domain::{
    BpmnElement, ElementUpdate, Event, Issue, IssueStatus, IssueUpdate, NewElement, NewIssue,
    Project,
};
use crate::ids::{IdGenerator, UuidGenerator};
use crate::snapshot::{WorkspaceSnapshot, SNAPSHOT_VERSION};
use crate::status::StatusPalette;
use crate::storage::{
    BpmnRepository, DiagramRemoval, IssueRepository, Link, LinkTable, ProjectRepository,
    SprintRepository,
};
use crate::sync::{self, SyncReport};
use chrono::Utc;
use std::rc::Rc;
use tracing::{debug, info};

/// Process-wide board state.
///
/// # Examples
///
/// ```
/// use flowboard::config::BoardConfig;
/// use flowboard::domain::{ElementKind, ElementState, IssueStatus, NewDiagram, NewElement, NewIssue};
/// use flowboard::workspace::Workspace;
///
/// let mut ws = Workspace::new(BoardConfig::default());
/// let diagram = ws.bpmn_mut().add_diagram(NewDiagram::new("Checkout", "p1", "<bpmn/>"));
/// ws.add_element(NewElement::new(&diagram.id, "Task_pay", ElementKind::Task, "Pay"));
/// let issue = ws.add_issue(NewIssue::new("Payment form", "alice", "p1"));
///
/// ws.link_issue(&issue.id, &diagram.id, "Task_pay");
/// ws.update_issue_status(&issue.id, IssueStatus::Done);
///
/// let status = ws.bpmn().get_element_status("Task_pay").unwrap();
/// assert_eq!(status.status, ElementState::Completed);
/// ```
pub struct Workspace {
    issues: IssueRepository,
    bpmn: BpmnRepository,
    sprints: SprintRepository,
    projects: ProjectRepository,
    links: LinkTable,
    config: BoardConfig,
    events: Vec<Event>,
}

impl Workspace {
    /// Empty workspace with random UUID identities.
    pub fn new(config: BoardConfig) -> Self {
        Self::with_ids(Rc::new(UuidGenerator), config)
    }

    /// Empty workspace drawing identities from `ids`.
    pub fn with_ids(ids: Rc<dyn IdGenerator>, config: BoardConfig) -> Self {
        let links = LinkTable::new();
        Self {
            issues: IssueRepository::new(links.clone(), ids.clone()),
            bpmn: BpmnRepository::new(links.clone(), ids.clone()),
            sprints: SprintRepository::new(ids.clone()),
            projects: ProjectRepository::new(ids),
            links,
            config,
            events: Vec::new(),
        }
    }

    /// Rebuild a workspace from a snapshot and recompute element statuses.
    pub fn from_snapshot(
        snapshot: WorkspaceSnapshot,
        ids: Rc<dyn IdGenerator>,
        config: BoardConfig,
    ) -> Self {
        let mut ws = Self::with_ids(ids, config);
        for project in snapshot.projects {
            ws.projects.restore(project);
        }
        for sprint in snapshot.sprints {
            ws.sprints.restore(sprint);
        }
        for issue in snapshot.issues {
            ws.issues.restore(issue);
        }
        for diagram in snapshot.diagrams {
            ws.bpmn.restore_diagram(diagram);
        }
        for element in snapshot.elements {
            ws.bpmn.restore_element(element);
        }
        for link in snapshot.links {
            ws.links.insert(link);
        }
        info!(
            issues = ws.issues.len(),
            elements = ws.bpmn.elements().len(),
            links = ws.links.len(),
            "workspace restored from snapshot"
        );
        ws.recompute();
        ws
    }

    /// Capture the authored state. Element statuses are derived and omitted.
    pub fn to_snapshot(&self) -> WorkspaceSnapshot {
        WorkspaceSnapshot {
            version: SNAPSHOT_VERSION,
            projects: self.projects.list().to_vec(),
            sprints: self.sprints.list().to_vec(),
            issues: self.issues.list().to_vec(),
            diagrams: self.bpmn.diagrams().to_vec(),
            elements: self.bpmn.elements().to_vec(),
            links: self.links.all(),
        }
    }

    pub fn issues(&self) -> &IssueRepository {
        &self.issues
    }

    pub fn bpmn(&self) -> &BpmnRepository {
        &self.bpmn
    }

    /// Direct access for diagram edits (adding or renaming diagrams).
    ///
    /// Changes made here bypass status projection. Link changes, element
    /// updates and deletions go through the workspace methods instead.
    pub fn bpmn_mut(&mut self) -> &mut BpmnRepository {
        &mut self.bpmn
    }

    pub fn sprints(&self) -> &SprintRepository {
        &self.sprints
    }

    pub fn sprints_mut(&mut self) -> &mut SprintRepository {
        &mut self.sprints
    }

    pub fn projects(&self) -> &ProjectRepository {
        &self.projects
    }

    pub fn projects_mut(&mut self) -> &mut ProjectRepository {
        &mut self.projects
    }

    pub fn links(&self) -> &LinkTable {
        &self.links
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn palette(&self) -> StatusPalette {
        self.config.palette()
    }

    /// Change log, oldest first.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    // ------------------------------------------------------------------
    // Issue mutations
    // ------------------------------------------------------------------

    pub fn add_issue(&mut self, draft: NewIssue) -> Issue {
        let issue = self.issues.add(draft);
        if let Some(sprint_id) = &issue.sprint_id {
            self.sprints.add_issue(sprint_id, &issue.id);
        }
        self.record(Event::IssueCreated {
            issue_id: issue.id.clone(),
            timestamp: issue.created_at,
            title: issue.title.clone(),
        });
        self.after_issue_change();
        issue
    }

    /// Apply a partial update. Sprint membership lists follow `sprint_id`.
    pub fn update_issue(&mut self, id: &str, update: IssueUpdate) -> Option<Issue> {
        let before = self.issues.get(id)?.clone();
        let after = self.issues.update(id, update)?;

        if before.sprint_id != after.sprint_id {
            if let Some(old) = &before.sprint_id {
                self.sprints.remove_issue(old, id);
            }
            if let Some(new) = &after.sprint_id {
                self.sprints.add_issue(new, id);
            }
        }

        if before.status != after.status {
            self.record(Event::IssueStatusChanged {
                issue_id: id.to_string(),
                timestamp: after.updated_at,
                from: before.status,
                to: after.status,
            });
        } else {
            self.record(Event::IssueUpdated {
                issue_id: id.to_string(),
                timestamp: after.updated_at,
            });
        }
        self.after_issue_change();
        Some(after)
    }

    pub fn update_issue_status(&mut self, id: &str, status: IssueStatus) -> Option<Issue> {
        self.update_issue(id, IssueUpdate::status(status))
    }

    /// Move an issue into a sprint, or back to the backlog with `None`.
    pub fn assign_issue_to_sprint(&mut self, id: &str, sprint_id: Option<String>) -> Option<Issue> {
        self.update_issue(id, IssueUpdate::sprint(sprint_id))
    }

    /// Delete an issue, detach it from every element and sprint, and drop
    /// statuses of elements left without linked issues.
    pub fn delete_issue(&mut self, id: &str) -> Option<Issue> {
        let issue = self.remove_issue_records(id)?;
        self.after_unlink();
        Some(issue)
    }

    fn remove_issue_records(&mut self, id: &str) -> Option<Issue> {
        let issue = self.issues.delete(id)?;
        self.sprints.forget_issue(id);
        self.record(Event::IssueDeleted {
            issue_id: id.to_string(),
            timestamp: Utc::now(),
        });
        Some(issue)
    }

    /// Link an issue to an element. Idempotent; returns `true` if a link was added.
    pub fn link_issue(&mut self, issue_id: &str, diagram_id: &str, element_id: &str) -> bool {
        if !self.issues.link_to_bpmn(issue_id, diagram_id, element_id) {
            return false;
        }
        self.record(Event::IssueLinked {
            issue_id: issue_id.to_string(),
            diagram_id: diagram_id.to_string(),
            element_id: element_id.to_string(),
            timestamp: Utc::now(),
        });
        self.after_issue_change();
        true
    }

    pub fn unlink_issue(&mut self, issue_id: &str, diagram_id: &str, element_id: &str) -> bool {
        if !self.issues.unlink_from_bpmn(issue_id, diagram_id, element_id) {
            return false;
        }
        self.record(Event::IssueUnlinked {
            issue_id: issue_id.to_string(),
            diagram_id: diagram_id.to_string(),
            element_id: element_id.to_string(),
            timestamp: Utc::now(),
        });
        self.after_unlink();
        true
    }

    // ------------------------------------------------------------------
    // Diagram, element and project cascades
    // ------------------------------------------------------------------

    /// Add an element; if it was created with linked issues its status is
    /// projected right away.
    pub fn add_element(&mut self, draft: NewElement) -> BpmnElement {
        let seeded = !draft.linked_issue_ids.is_empty();
        let element = self.bpmn.add_element(draft);
        if seeded {
            self.after_issue_change();
        }
        element
    }

    /// Apply a partial element update. A changed diagram or external id
    /// moves the element's links, so statuses are pruned and re-projected.
    pub fn update_element(&mut self, id: &str, update: ElementUpdate) -> Option<BpmnElement> {
        let before = self.bpmn.get_element(id)?.clone();
        let after = self.bpmn.update_element(id, update)?;
        if before.diagram_id != after.diagram_id || before.element_id != after.element_id {
            debug!(
                id,
                from = %before.element_id,
                to = %after.element_id,
                "element rekeyed"
            );
            self.after_unlink();
        }
        Some(after)
    }

    /// Link an issue to every element carrying `element_id`.
    ///
    /// Returns `true` if any link was added. Unknown issues are ignored.
    pub fn link_element_issue(&mut self, element_id: &str, issue_id: &str) -> bool {
        if self.issues.get(issue_id).is_none() {
            return false;
        }
        let diagrams = self.diagrams_with_element(element_id);
        let missing: Vec<String> = diagrams
            .into_iter()
            .filter(|d| !self.links.contains(issue_id, d, element_id))
            .collect();
        if !self.bpmn.link_issue(element_id, issue_id) {
            return false;
        }
        for diagram_id in missing {
            self.record(Event::IssueLinked {
                issue_id: issue_id.to_string(),
                diagram_id,
                element_id: element_id.to_string(),
                timestamp: Utc::now(),
            });
        }
        self.after_issue_change();
        true
    }

    /// Unlink an issue from every element carrying `element_id`.
    pub fn unlink_element_issue(&mut self, element_id: &str, issue_id: &str) -> bool {
        let linked: Vec<String> = self
            .diagrams_with_element(element_id)
            .into_iter()
            .filter(|d| self.links.contains(issue_id, d, element_id))
            .collect();
        if !self.bpmn.unlink_issue(element_id, issue_id) {
            return false;
        }
        for diagram_id in linked {
            self.record(Event::IssueUnlinked {
                issue_id: issue_id.to_string(),
                diagram_id,
                element_id: element_id.to_string(),
                timestamp: Utc::now(),
            });
        }
        self.after_unlink();
        true
    }

    fn diagrams_with_element(&self, element_id: &str) -> Vec<String> {
        self.bpmn
            .elements()
            .iter()
            .filter(|e| e.element_id == element_id)
            .map(|e| e.diagram_id.clone())
            .collect()
    }

    /// Delete an element and its status. Another diagram's element sharing
    /// the external id gets its status re-projected.
    pub fn delete_element(&mut self, id: &str) -> Option<BpmnElement> {
        let element = self.bpmn.delete_element(id)?;
        self.record(Event::ElementDeleted {
            diagram_id: element.diagram_id.clone(),
            element_id: element.element_id.clone(),
            timestamp: Utc::now(),
        });
        self.after_issue_change();
        Some(element)
    }

    /// Delete a diagram with its elements and their statuses. Issue links
    /// into the diagram are kept (see [`Workspace::dangling_links`]).
    pub fn delete_diagram(&mut self, id: &str) -> Option<DiagramRemoval> {
        let removal = self.remove_diagram_records(id)?;
        self.after_issue_change();
        Some(removal)
    }

    fn remove_diagram_records(&mut self, id: &str) -> Option<DiagramRemoval> {
        let removal = self.bpmn.delete_diagram(id)?;
        self.record(Event::DiagramDeleted {
            diagram_id: id.to_string(),
            elements_removed: removal.elements.len(),
            timestamp: Utc::now(),
        });
        Some(removal)
    }

    /// Delete a project with its issues, sprints and diagrams.
    pub fn delete_project(&mut self, id: &str) -> Option<Project> {
        let project = self.projects.delete(id)?;

        let issue_ids: Vec<String> = self
            .issues
            .get_by_project(id)
            .iter()
            .map(|i| i.id.clone())
            .collect();
        for issue_id in &issue_ids {
            self.remove_issue_records(issue_id);
        }

        let sprint_ids: Vec<String> = self
            .sprints
            .get_by_project(id)
            .iter()
            .map(|s| s.id.clone())
            .collect();
        for sprint_id in &sprint_ids {
            self.sprints.delete(sprint_id);
        }

        let diagram_ids: Vec<String> = self
            .bpmn
            .get_diagrams_by_project(id)
            .iter()
            .map(|d| d.id.clone())
            .collect();
        for diagram_id in &diagram_ids {
            self.remove_diagram_records(diagram_id);
        }

        self.record(Event::ProjectDeleted {
            project_id: id.to_string(),
            timestamp: Utc::now(),
        });
        debug!(
            project_id = %id,
            issues = issue_ids.len(),
            sprints = sprint_ids.len(),
            diagrams = diagram_ids.len(),
            "project deleted"
        );
        self.after_unlink();
        Some(project)
    }

    // ------------------------------------------------------------------
    // Projection
    // ------------------------------------------------------------------

    /// Run a full status recomputation regardless of configuration.
    pub fn recompute(&mut self) -> SyncReport {
        let report = sync::recompute_statuses(&self.issues, &mut self.bpmn, Utc::now());
        if !report.changed.is_empty() {
            self.record(Event::StatusesRecomputed {
                changed: report.changed.clone(),
                timestamp: Utc::now(),
            });
        }
        report
    }

    /// Link rows whose issue or element no longer exists.
    pub fn dangling_links(&self) -> Vec<Link> {
        self.links
            .all()
            .into_iter()
            .filter(|l| {
                self.issues.get(&l.issue_id).is_none()
                    || self.bpmn.find_element(&l.diagram_id, &l.element_id).is_none()
            })
            .collect()
    }

    fn after_issue_change(&mut self) {
        if self.config.auto_recompute() {
            self.recompute();
        }
    }

    fn after_unlink(&mut self) {
        sync::prune_orphaned_statuses(&self.issues, &mut self.bpmn);
        self.after_issue_change();
    }

    fn record(&mut self, event: Event) {
        self.events.push(event);
    }
}
