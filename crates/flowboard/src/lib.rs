//! flowboard library
//!
//! Issue tracking with links from issues to BPMN diagram elements, and a
//! projection of linked issue progress onto per-element statuses.
//! The binary is a thin reporting layer over [`workspace::Workspace`].

pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod ids;
pub mod output;
pub mod snapshot;
pub mod status;
pub mod storage;
pub mod sync;
pub mod workspace;

// Re-export commonly used types
pub use domain::{ElementState, ElementStatus, Issue, IssueStatus, Priority};
pub use errors::{BoardError, BoardResult};
pub use output::{ExitCode, JsonError, JsonOutput};
pub use status::compute_status;
pub use storage::{BpmnRepository, IssueRepository, LinkTable};
pub use workspace::Workspace;
