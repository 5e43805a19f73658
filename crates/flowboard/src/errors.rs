//! Error types.
//!
//! The repositories never fail: lookups return `Option` and mutations of
//! unknown ids are no-ops. Errors only arise at the edges (parsing user
//! input, loading configuration and snapshots), and are reported through
//! [`BoardError`]. The CLI wraps the ones users hit in an
//! [`ActionableError`] that lists likely causes and fixes.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised at the crate's fallible edges.
#[derive(Debug, Error)]
pub enum BoardError {
    /// A string could not be parsed into an enum value
    #[error("invalid {field} value: '{value}'")]
    InvalidValue { field: &'static str, value: String },

    /// Configuration file exists but is not valid TOML for our schema
    #[error("invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Snapshot JSON could not be (de)serialized
    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// Snapshot schema version is newer than this build understands
    #[error("unsupported snapshot version {found} (expected at most {supported})")]
    SnapshotVersion { found: u32, supported: u32 },

    /// Filesystem failure while reading or writing
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias used across the crate's fallible APIs.
pub type BoardResult<T> = Result<T, BoardError>;

/// A user-facing error with possible causes and remediation steps.
///
/// # Example
///
/// ```
/// use flowboard::errors::ActionableError;
///
/// let error = ActionableError::new("Issue abc not found")
///     .with_cause("The id may be a typo")
///     .with_remedy("List issues: flowboard backlog board.json --project <id>");
///
/// assert!(error.to_string().contains("To fix:"));
/// ```
#[derive(Debug, Clone)]
pub struct ActionableError {
    error: String,
    causes: Vec<String>,
    remediation: Vec<String>,
}

impl ActionableError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            causes: Vec::new(),
            remediation: Vec::new(),
        }
    }

    /// Add a possible cause.
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.causes.push(cause.into());
        self
    }

    /// Add a remediation step.
    pub fn with_remedy(mut self, remedy: impl Into<String>) -> Self {
        self.remediation.push(remedy.into());
        self
    }

    /// The headline message without causes or remedies.
    pub fn message(&self) -> &str {
        &self.error
    }

    pub fn to_error_message(&self) -> String {
        let mut msg = format!("{}\n", self.error);

        if !self.causes.is_empty() {
            msg.push_str("\nPossible causes:\n");
            for cause in &self.causes {
                msg.push_str(&format!("  • {}\n", cause));
            }
        }

        if !self.remediation.is_empty() {
            msg.push_str("\nTo fix:\n");
            for remedy in &self.remediation {
                msg.push_str(&format!("  • {}\n", remedy));
            }
        }

        msg
    }
}

impl fmt::Display for ActionableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_error_message())
    }
}

impl std::error::Error for ActionableError {}

/// Snapshot file missing or unreadable.
pub fn snapshot_not_found(path: &str) -> ActionableError {
    ActionableError::new(format!("Snapshot not found: {}", path))
        .with_cause("The path may be misspelled or relative to another directory")
        .with_remedy("Pass the path to an exported board snapshot (JSON)")
}

/// Issue id given on the command line does not exist in the snapshot.
pub fn issue_not_found(issue_id: &str) -> ActionableError {
    ActionableError::new(format!("Issue not found: {}", issue_id))
        .with_cause("The issue may have been deleted")
        .with_cause("The snapshot may belong to another project")
        .with_remedy("List backlog issues: flowboard backlog <snapshot> --project <project-id>")
}

/// Link rows reference issues or elements that no longer exist.
pub fn dangling_links(count: usize) -> ActionableError {
    ActionableError::new(format!("{} dangling link(s) found", count))
        .with_cause("An element was deleted while issues still pointed at it")
        .with_cause("A diagram was deleted; issue links are kept on purpose")
        .with_remedy("Inspect them: flowboard check <snapshot> --json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actionable_error_formatting() {
        let error = ActionableError::new("Test error")
            .with_cause("First cause")
            .with_remedy("First remedy");

        let msg = error.to_error_message();

        assert!(msg.starts_with("Test error"));
        assert!(msg.contains("Possible causes:"));
        assert!(msg.contains("• First cause"));
        assert!(msg.contains("To fix:"));
        assert!(msg.contains("• First remedy"));
    }

    #[test]
    fn test_error_without_causes() {
        let msg = ActionableError::new("Simple").with_remedy("Fix it").to_error_message();
        assert!(!msg.contains("Possible causes:"));
        assert!(msg.contains("• Fix it"));
    }

    #[test]
    fn test_issue_not_found_helper() {
        let error = issue_not_found("abc123");
        assert_eq!(error.message(), "Issue not found: abc123");
        assert!(error.to_string().contains("flowboard backlog"));
    }

    #[test]
    fn test_invalid_value_display() {
        let err = BoardError::InvalidValue {
            field: "priority",
            value: "huge".to_string(),
        };
        assert_eq!(err.to_string(), "invalid priority value: 'huge'");
    }
}
