//! Portable JSON snapshots of a workspace.
//!
//! A snapshot holds only authored state: projects, sprints, issues,
//! diagrams, elements and the link rows between issues and elements.
//! Element statuses are derived, so they are left out and recomputed when a
//! snapshot is loaded into a [`Workspace`](crate::workspace::Workspace).

use crate::domain::{BpmnDiagram, BpmnElement, Issue, Project, Sprint};
use crate::errors::{BoardError, BoardResult};
use crate::storage::Link;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Snapshot schema version written by this build.
pub const SNAPSHOT_VERSION: u32 = 1;

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceSnapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub sprints: Vec<Sprint>,
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub diagrams: Vec<BpmnDiagram>,
    #[serde(default)]
    pub elements: Vec<BpmnElement>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Default for WorkspaceSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            projects: Vec::new(),
            sprints: Vec::new(),
            issues: Vec::new(),
            diagrams: Vec::new(),
            elements: Vec::new(),
            links: Vec::new(),
        }
    }
}

impl WorkspaceSnapshot {
    /// Parse a snapshot, rejecting versions newer than [`SNAPSHOT_VERSION`].
    pub fn from_json(content: &str) -> BoardResult<Self> {
        let snapshot: Self = serde_json::from_str(content)?;
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(BoardError::SnapshotVersion {
                found: snapshot.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot)
    }

    pub fn to_json(&self) -> BoardResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> BoardResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| BoardError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Write the snapshot atomically (temp file + rename).
    pub fn save(&self, path: &Path) -> BoardResult<()> {
        let json = self.to_json()?;
        let temp_path = path.with_extension("json.tmp");
        let io_err = |source| BoardError::Io {
            path: path.to_path_buf(),
            source,
        };
        std::fs::write(&temp_path, json).map_err(io_err)?;
        std::fs::rename(&temp_path, path).map_err(io_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_sections_default_to_empty() {
        let snapshot = WorkspaceSnapshot::from_json("{}").unwrap();
        assert_eq!(snapshot, WorkspaceSnapshot::default());
    }

    #[test]
    fn test_newer_version_is_rejected() {
        let err = WorkspaceSnapshot::from_json(r#"{"version": 99}"#).unwrap_err();
        assert!(matches!(
            err,
            BoardError::SnapshotVersion {
                found: 99,
                supported: SNAPSHOT_VERSION
            }
        ));
    }

    #[test]
    fn test_malformed_json_is_snapshot_error() {
        let err = WorkspaceSnapshot::from_json("{ not json").unwrap_err();
        assert!(matches!(err, BoardError::Snapshot(_)));
    }

    #[test]
    fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("board.json");
        let snapshot = WorkspaceSnapshot {
            links: vec![Link::new("i1", "d1", "Task_1")],
            ..WorkspaceSnapshot::default()
        };

        snapshot.save(&path).unwrap();
        let loaded = WorkspaceSnapshot::load(&path).unwrap();

        assert_eq!(loaded, snapshot);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let err = WorkspaceSnapshot::load(&temp.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, BoardError::Io { .. }));
    }
}
