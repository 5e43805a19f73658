//! In-memory repositories for issues, diagrams, sprints and projects.
//!
//! Every repository is a plain owned value; the [`crate::workspace::Workspace`]
//! owns one of each. The issue and BPMN repositories share one [`LinkTable`]
//! so both sides of an issue ↔ element link are always answered from the
//! same rows.

pub mod bpmn;
pub mod issues;
pub mod links;
pub mod projects;
pub mod sprints;

pub use bpmn::{BpmnRepository, DiagramRemoval};
pub use issues::IssueRepository;
pub use links::{Link, LinkTable};
pub use projects::ProjectRepository;
pub use sprints::SprintRepository;
