//! Core domain types for the board.
//!
//! Issues, sprints and projects model the planning side; diagrams and
//! elements model the BPMN side. Element statuses are derived from the
//! issues linked to an element and are never authored directly.

use crate::errors::BoardError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of work an issue represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueType {
    /// A unit of implementation work (default)
    Task,
    /// A defect
    Bug,
    /// A user-facing requirement
    UserStory,
}

/// Issue workflow status, one per Kanban column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueStatus {
    /// Not started (default)
    ToDo,
    /// Currently being worked on
    InProgress,
    /// Completed
    Done,
}

/// Issue priority level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    /// Low priority
    Low,
    /// Medium priority (default)
    Medium,
    /// High priority
    High,
    /// Urgent priority
    Urgent,
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IssueStatus::ToDo => "TO_DO",
            IssueStatus::InProgress => "IN_PROGRESS",
            IssueStatus::Done => "DONE",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for IssueStatus {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "todo" => Ok(IssueStatus::ToDo),
            "inprogress" => Ok(IssueStatus::InProgress),
            "done" => Ok(IssueStatus::Done),
            _ => Err(BoardError::InvalidValue {
                field: "status",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for IssueType {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "task" => Ok(IssueType::Task),
            "bug" => Ok(IssueType::Bug),
            "userstory" | "story" => Ok(IssueType::UserStory),
            _ => Err(BoardError::InvalidValue {
                field: "type",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for Priority {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            _ => Err(BoardError::InvalidValue {
                field: "priority",
                value: s.to_string(),
            }),
        }
    }
}

/// Lowercase and strip separators so "IN_PROGRESS", "in-progress" and
/// "InProgress" all compare equal.
fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// An issue representing a unit of work within a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Unique identifier assigned by the repository
    pub id: String,
    /// Short summary of the issue
    pub title: String,
    /// Detailed description
    pub description: String,
    /// Kind of work
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    /// Current workflow status
    pub status: IssueStatus,
    /// Priority level
    pub priority: Priority,
    /// User the issue is assigned to
    pub assignee_id: Option<String>,
    /// User who reported the issue (always set)
    pub reporter_id: String,
    /// Owning project
    pub project_id: String,
    /// Sprint the issue is planned into; `None` means backlog
    pub sprint_id: Option<String>,
    /// Estimated effort in hours
    pub estimated_hours: Option<f32>,
    /// When the issue was created
    pub created_at: DateTime<Utc>,
    /// When the issue was last modified
    pub updated_at: DateTime<Utc>,
}

impl Issue {
    /// Build a stored issue from a draft with repository-assigned identity.
    pub fn from_draft(id: String, draft: NewIssue, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            issue_type: draft.issue_type,
            status: draft.status,
            priority: draft.priority,
            assignee_id: draft.assignee_id,
            reporter_id: draft.reporter_id,
            project_id: draft.project_id,
            sprint_id: draft.sprint_id,
            estimated_hours: draft.estimated_hours,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when the issue sits in its project's backlog (no sprint).
    pub fn is_backlog(&self) -> bool {
        self.sprint_id.is_none()
    }
}

/// Issue fields supplied by the caller; id and timestamps are assigned on add
#[derive(Debug, Clone, PartialEq)]
pub struct NewIssue {
    pub title: String,
    pub description: String,
    pub issue_type: IssueType,
    pub status: IssueStatus,
    pub priority: Priority,
    pub assignee_id: Option<String>,
    pub reporter_id: String,
    pub project_id: String,
    pub sprint_id: Option<String>,
    pub estimated_hours: Option<f32>,
}

impl NewIssue {
    /// Create a draft with default type, status and priority
    pub fn new(
        title: impl Into<String>,
        reporter_id: impl Into<String>,
        project_id: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            issue_type: IssueType::Task,
            status: IssueStatus::ToDo,
            priority: Priority::Medium,
            assignee_id: None,
            reporter_id: reporter_id.into(),
            project_id: project_id.into(),
            sprint_id: None,
            estimated_hours: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_type(mut self, issue_type: IssueType) -> Self {
        self.issue_type = issue_type;
        self
    }

    pub fn with_status(mut self, status: IssueStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_assignee(mut self, assignee_id: impl Into<String>) -> Self {
        self.assignee_id = Some(assignee_id.into());
        self
    }

    pub fn with_sprint(mut self, sprint_id: impl Into<String>) -> Self {
        self.sprint_id = Some(sprint_id.into());
        self
    }

    pub fn with_estimate(mut self, hours: f32) -> Self {
        self.estimated_hours = Some(hours);
        self
    }
}

/// Partial update of an issue.
///
/// `None` leaves a field untouched. Optional fields use a nested `Option`
/// so they can be cleared: `sprint_id: Some(None)` moves an issue back to
/// the backlog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub issue_type: Option<IssueType>,
    pub status: Option<IssueStatus>,
    pub priority: Option<Priority>,
    pub assignee_id: Option<Option<String>>,
    pub reporter_id: Option<String>,
    pub project_id: Option<String>,
    pub sprint_id: Option<Option<String>>,
    pub estimated_hours: Option<Option<f32>>,
}

impl IssueUpdate {
    /// Update that only changes the status
    pub fn status(status: IssueStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Update that only changes the sprint
    pub fn sprint(sprint_id: Option<String>) -> Self {
        Self {
            sprint_id: Some(sprint_id),
            ..Self::default()
        }
    }

    /// Apply every present field to `issue`. Timestamps are left to the caller.
    pub fn apply_to(self, issue: &mut Issue) {
        if let Some(title) = self.title {
            issue.title = title;
        }
        if let Some(description) = self.description {
            issue.description = description;
        }
        if let Some(issue_type) = self.issue_type {
            issue.issue_type = issue_type;
        }
        if let Some(status) = self.status {
            issue.status = status;
        }
        if let Some(priority) = self.priority {
            issue.priority = priority;
        }
        if let Some(assignee_id) = self.assignee_id {
            issue.assignee_id = assignee_id;
        }
        if let Some(reporter_id) = self.reporter_id {
            issue.reporter_id = reporter_id;
        }
        if let Some(project_id) = self.project_id {
            issue.project_id = project_id;
        }
        if let Some(sprint_id) = self.sprint_id {
            issue.sprint_id = sprint_id;
        }
        if let Some(estimated_hours) = self.estimated_hours {
            issue.estimated_hours = estimated_hours;
        }
    }
}

/// Issue-side view of a link: which diagram element an issue is attached to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkedElement {
    pub diagram_id: String,
    /// External element id (as it appears in the diagram markup)
    pub element_id: String,
}

/// A BPMN process diagram
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BpmnDiagram {
    pub id: String,
    pub name: String,
    pub description: String,
    pub project_id: String,
    /// Serialized diagram markup, opaque to this crate
    pub xml: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Diagram fields supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDiagram {
    pub name: String,
    pub description: String,
    pub project_id: String,
    pub xml: String,
}

impl NewDiagram {
    pub fn new(name: impl Into<String>, project_id: impl Into<String>, xml: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            project_id: project_id.into(),
            xml: xml.into(),
        }
    }
}

/// Partial update of a diagram
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagramUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub xml: Option<String>,
}

/// Kind of BPMN element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Task,
    Gateway,
    Event,
    Subprocess,
}

/// A diagram element that issues can be linked to.
///
/// `id` is the repository identity; `element_id` is the id used inside the
/// diagram markup. Links and statuses are keyed by `element_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BpmnElement {
    pub id: String,
    pub diagram_id: String,
    pub element_id: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub name: String,
}

/// Element fields supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewElement {
    pub diagram_id: String,
    pub element_id: String,
    pub kind: ElementKind,
    pub name: String,
    /// Issues to link as soon as the element exists
    pub linked_issue_ids: Vec<String>,
}

impl NewElement {
    pub fn new(
        diagram_id: impl Into<String>,
        element_id: impl Into<String>,
        kind: ElementKind,
        name: impl Into<String>,
    ) -> Self {
        Self {
            diagram_id: diagram_id.into(),
            element_id: element_id.into(),
            kind,
            name: name.into(),
            linked_issue_ids: Vec::new(),
        }
    }

    pub fn with_linked_issue(mut self, issue_id: impl Into<String>) -> Self {
        self.linked_issue_ids.push(issue_id.into());
        self
    }
}

/// Partial update of an element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementUpdate {
    pub diagram_id: Option<String>,
    pub element_id: Option<String>,
    pub kind: Option<ElementKind>,
    pub name: Option<String>,
}

/// Derived progress state of a diagram element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementState {
    NotStarted,
    InProgress,
    Completed,
    /// Never produced by the current aggregation rules
    Blocked,
}

impl fmt::Display for ElementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ElementState::NotStarted => "not_started",
            ElementState::InProgress => "in_progress",
            ElementState::Completed => "completed",
            ElementState::Blocked => "blocked",
        };
        write!(f, "{}", s)
    }
}

/// Projected status of one element, keyed by its external `element_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementStatus {
    pub element_id: String,
    pub status: ElementState,
    /// Percentage of linked issues done, 0..=100
    pub progress: u8,
    pub last_updated: DateTime<Utc>,
}

/// Sprint lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SprintStatus {
    Planning,
    Active,
    Completed,
}

/// A time-boxed grouping of issues within a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprint {
    pub id: String,
    pub name: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub project_id: String,
    pub issue_ids: Vec<String>,
    pub status: SprintStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sprint fields supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSprint {
    pub name: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub project_id: String,
    pub status: SprintStatus,
}

impl NewSprint {
    pub fn new(
        name: impl Into<String>,
        project_id: impl Into<String>,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            start_date,
            end_date,
            project_id: project_id.into(),
            status: SprintStatus::Planning,
        }
    }
}

/// Partial update of a sprint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SprintUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: Option<SprintStatus>,
}

/// A project grouping issues, sprints and diagrams
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub owner_id: String,
    pub member_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Project fields supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub owner_id: String,
    pub member_ids: Vec<String>,
}

impl NewProject {
    pub fn new(name: impl Into<String>, owner_id: impl Into<String>) -> Self {
        let owner_id = owner_id.into();
        Self {
            name: name.into(),
            description: String::new(),
            member_ids: vec![owner_id.clone()],
            owner_id,
        }
    }
}

/// Partial update of a project
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub owner_id: Option<String>,
    pub member_ids: Option<Vec<String>>,
}

/// Change log entry recorded by the workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A new issue was added
    IssueCreated {
        issue_id: String,
        timestamp: DateTime<Utc>,
        title: String,
    },
    /// Issue fields changed
    IssueUpdated {
        issue_id: String,
        timestamp: DateTime<Utc>,
    },
    /// Issue status transitioned
    IssueStatusChanged {
        issue_id: String,
        timestamp: DateTime<Utc>,
        from: IssueStatus,
        to: IssueStatus,
    },
    /// Issue was removed along with its links
    IssueDeleted {
        issue_id: String,
        timestamp: DateTime<Utc>,
    },
    /// Issue linked to a diagram element
    IssueLinked {
        issue_id: String,
        diagram_id: String,
        element_id: String,
        timestamp: DateTime<Utc>,
    },
    /// Issue unlinked from a diagram element
    IssueUnlinked {
        issue_id: String,
        diagram_id: String,
        element_id: String,
        timestamp: DateTime<Utc>,
    },
    /// Element removed together with its status
    ElementDeleted {
        diagram_id: String,
        element_id: String,
        timestamp: DateTime<Utc>,
    },
    /// Diagram removed together with its elements and statuses
    DiagramDeleted {
        diagram_id: String,
        elements_removed: usize,
        timestamp: DateTime<Utc>,
    },
    /// Project removed together with its issues, sprints and diagrams
    ProjectDeleted {
        project_id: String,
        timestamp: DateTime<Utc>,
    },
    /// A recomputation pass changed these element statuses
    StatusesRecomputed {
        changed: Vec<String>,
        timestamp: DateTime<Utc>,
    },
}

impl Event {
    /// Issue this event concerns, if any
    pub fn issue_id(&self) -> Option<&str> {
        match self {
            Event::IssueCreated { issue_id, .. }
            | Event::IssueUpdated { issue_id, .. }
            | Event::IssueStatusChanged { issue_id, .. }
            | Event::IssueDeleted { issue_id, .. }
            | Event::IssueLinked { issue_id, .. }
            | Event::IssueUnlinked { issue_id, .. } => Some(issue_id),
            _ => None,
        }
    }
}
