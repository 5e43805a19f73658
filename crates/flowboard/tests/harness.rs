//! Test harness for building boards in-process
//!
//! Provides a fluent API over a [`Workspace`] with deterministic ids, plus a
//! helper to write the board out as a snapshot for CLI tests.

use flowboard::config::BoardConfig;
use flowboard::domain::{
    BpmnElement, ElementKind, ElementState, Issue, IssueStatus, NewDiagram, NewElement, NewIssue,
    NewProject,
};
use flowboard::ids::SequentialIds;
use flowboard::workspace::Workspace;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// A workspace holding one project and one diagram
pub struct BoardHarness {
    pub ws: Workspace,
    pub project_id: String,
    pub diagram_id: String,
}

impl BoardHarness {
    pub fn new() -> Self {
        Self::with_config(BoardConfig::default())
    }

    pub fn with_config(config: BoardConfig) -> Self {
        let mut ws = Workspace::with_ids(Rc::new(SequentialIds::new("id")), config);
        let project = ws.projects_mut().add(NewProject::new("Checkout", "alice"));
        let diagram = ws
            .bpmn_mut()
            .add_diagram(NewDiagram::new("Order flow", &project.id, "<definitions/>"));
        Self {
            ws,
            project_id: project.id,
            diagram_id: diagram.id,
        }
    }

    // === Fluent API for common operations ===

    /// Add a task element to the harness diagram
    pub fn element(&mut self, element_id: &str) -> BpmnElement {
        self.ws.add_element(NewElement::new(
            &self.diagram_id,
            element_id,
            ElementKind::Task,
            element_id,
        ))
    }

    /// Add a to-do issue to the harness project
    pub fn issue(&mut self, title: &str) -> Issue {
        self.ws
            .add_issue(NewIssue::new(title, "alice", &self.project_id))
    }

    #[allow(dead_code)]
    pub fn issue_with_status(&mut self, title: &str, status: IssueStatus) -> Issue {
        self.ws
            .add_issue(NewIssue::new(title, "alice", &self.project_id).with_status(status))
    }

    /// Link an issue to an element of the harness diagram
    pub fn link(&mut self, issue_id: &str, element_id: &str) -> bool {
        let diagram_id = self.diagram_id.clone();
        self.ws.link_issue(issue_id, &diagram_id, element_id)
    }

    /// Status and progress of an element, if it has a status record
    pub fn status_of(&self, element_id: &str) -> Option<(ElementState, u8)> {
        self.ws
            .bpmn()
            .get_element_status(element_id)
            .map(|s| (s.status, s.progress))
    }

    /// Save the board as `board.json` under `dir`
    #[allow(dead_code)]
    pub fn write_snapshot(&self, dir: &Path) -> PathBuf {
        let path = dir.join("board.json");
        self.ws.to_snapshot().save(&path).unwrap();
        path
    }
}
