//! Structured output formatting for CLI commands.
//!
//! Every command can print either human-readable text or a JSON envelope
//! (`{success, data, metadata}`), so scripts and renderers can consume board
//! state without parsing prose.

use chrono::Utc;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt::Display;
use std::io::{self, Write};

use crate::domain::{ElementKind, ElementState, IssueStatus, LinkedElement, Priority};
use crate::status::Colors;
use crate::storage::Link;

/// Version of the JSON output format
const OUTPUT_VERSION: &str = "0.1.0";

// ============================================================================
// Output Context for Quiet Mode
// ============================================================================

/// Context for controlling output verbosity
pub struct OutputContext {
    quiet: bool,
    json: bool,
}

impl OutputContext {
    pub fn new(quiet: bool, json: bool) -> Self {
        Self { quiet, json }
    }

    /// Print essential output (always shown unless --json)
    pub fn print_data(&self, msg: impl Display) -> io::Result<()> {
        if !self.json {
            writeln_safe(&format!("{}", msg))
        } else {
            Ok(())
        }
    }

    /// Print informational message (suppressed by --quiet or --json)
    pub fn print_info(&self, msg: impl Display) -> io::Result<()> {
        if !self.quiet && !self.json {
            writeln_safe(&format!("{}", msg))
        } else {
            Ok(())
        }
    }

    /// Print a JSON envelope on stdout
    pub fn print_json<T: Serialize>(&self, output: &JsonOutput<T>) -> io::Result<()> {
        let json = output.to_json_string().map_err(io::Error::other)?;
        writeln_safe(&json)
    }

    /// Print a structured error: the JSON envelope on stdout with --json,
    /// otherwise the message and suggestions on stderr.
    pub fn print_error(&self, error: &JsonError) -> io::Result<()> {
        if self.json {
            let json = error.to_json_string().map_err(io::Error::other)?;
            return writeln_safe(&json);
        }
        writeln_safe_stderr(&format!("Error: {}", error.error.message))?;
        for suggestion in &error.error.suggestions {
            writeln_safe_stderr(&format!("  • {}", suggestion))?;
        }
        Ok(())
    }

    pub fn is_json(&self) -> bool {
        self.json
    }
}

/// Safe println that handles broken pipes gracefully
fn writeln_safe(msg: &str) -> io::Result<()> {
    match writeln!(io::stdout(), "{}", msg) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            // Expected when piping to head and similar
            std::process::exit(0);
        }
        Err(e) => Err(e),
    }
}

fn writeln_safe_stderr(msg: &str) -> io::Result<()> {
    match writeln!(io::stderr(), "{}", msg) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            std::process::exit(0);
        }
        Err(e) => Err(e),
    }
}

// ============================================================================
// JSON Output Types
// ============================================================================

/// Wrapper for successful command output with metadata
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub metadata: Metadata,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(data: T, command: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            metadata: Metadata::new(command),
        }
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Wrapper for error output with suggestions
#[derive(Debug, Serialize)]
pub struct JsonError {
    pub success: bool,
    pub error: ErrorDetail,
    pub metadata: Metadata,
}

impl JsonError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        command: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
                suggestions: Vec::new(),
            },
            metadata: Metadata::new(command),
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.error.details = Some(details);
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.error.suggestions.push(suggestion.into());
        self
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        ErrorCode::to_exit_code(&self.error.code)
    }

    pub fn issue_not_found(issue_id: &str, command: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ISSUE_NOT_FOUND,
            format!("Issue not found: {}", issue_id),
            command,
        )
        .with_details(serde_json::json!({"issue_id": issue_id}))
        .with_suggestion("Run 'flowboard backlog <snapshot> --project <id>' to see issues")
        .with_suggestion("Check if the issue ID is correct")
    }

    pub fn diagram_not_found(diagram_id: &str, command: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::DIAGRAM_NOT_FOUND,
            format!("Diagram not found: {}", diagram_id),
            command,
        )
        .with_details(serde_json::json!({"diagram_id": diagram_id}))
        .with_suggestion("Run 'flowboard status <snapshot>' to see all diagrams")
    }

    pub fn project_not_found(project_id: &str, command: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::PROJECT_NOT_FOUND,
            format!("Project not found: {}", project_id),
            command,
        )
        .with_details(serde_json::json!({"project_id": project_id}))
    }

    pub fn dangling_links(links: &[Link], command: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::DANGLING_LINKS,
            format!("{} dangling link(s) found", links.len()),
            command,
        )
        .with_details(serde_json::json!({ "links": links }))
        .with_suggestion("Unlink the issues or restore the missing elements")
    }
}

/// Error details including code, message, and suggestions
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Error code (e.g., "ISSUE_NOT_FOUND", "DANGLING_LINKS")
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

// ============================================================================
// Exit Codes
// ============================================================================

/// Standardized exit codes for the flowboard CLI
///
/// # Examples
///
/// ```rust
/// use flowboard::ExitCode;
///
/// assert_eq!(ExitCode::NotFound.code(), 3);
/// assert_eq!(ExitCode::ValidationFailed.code(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Command succeeded (0)
    Success = 0,

    /// Generic error (1)
    GenericError = 1,

    /// Invalid arguments or usage error (2)
    InvalidArgument = 2,

    /// Resource not found - snapshot, issue, diagram, project (3)
    NotFound = 3,

    /// Validation failed - dangling links, unsupported snapshot (4)
    ValidationFailed = 4,

    /// File system failure (10)
    ExternalError = 10,
}

impl ExitCode {
    /// Convert exit code to i32 for `std::process::exit`
    pub fn code(self) -> i32 {
        self as i32
    }
}

// ============================================================================
// Error Codes (String constants for JSON responses)
// ============================================================================

/// Error codes carried in [`JsonError`]
pub struct ErrorCode;

impl ErrorCode {
    pub const ISSUE_NOT_FOUND: &'static str = "ISSUE_NOT_FOUND";
    pub const DIAGRAM_NOT_FOUND: &'static str = "DIAGRAM_NOT_FOUND";
    pub const PROJECT_NOT_FOUND: &'static str = "PROJECT_NOT_FOUND";
    pub const DANGLING_LINKS: &'static str = "DANGLING_LINKS";

    pub fn to_exit_code(code: &str) -> ExitCode {
        match code {
            Self::ISSUE_NOT_FOUND | Self::DIAGRAM_NOT_FOUND | Self::PROJECT_NOT_FOUND => {
                ExitCode::NotFound
            }
            Self::DANGLING_LINKS => ExitCode::ValidationFailed,
            _ => ExitCode::GenericError,
        }
    }
}

/// Metadata included in all responses
#[derive(Debug, Serialize)]
pub struct Metadata {
    /// Timestamp when the response was generated
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: chrono::DateTime<Utc>,
    /// Version of the output format
    pub version: String,
    /// Command that generated this response
    pub command: String,
}

impl Metadata {
    fn new(command: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            version: OUTPUT_VERSION.to_string(),
            command: command.into(),
        }
    }
}

/// Serialize timestamp in ISO 8601 format
fn serialize_timestamp<S>(dt: &chrono::DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&dt.to_rfc3339())
}

// ============================================================================
// Command Response Types
// ============================================================================

/// One element row in `status` output
#[derive(Debug, Clone, Serialize)]
pub struct ElementStatusView {
    pub diagram_id: String,
    pub element_id: String,
    pub name: String,
    pub kind: ElementKind,
    pub linked_issues: usize,
    /// `None` when the element has no linked issues
    pub status: Option<ElementState>,
    pub progress: Option<u8>,
    pub colors: Option<Colors>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub elements: Vec<ElementStatusView>,
    pub count: usize,
}

/// Compact issue row for listings
#[derive(Debug, Clone, Serialize)]
pub struct IssueSummary {
    pub id: String,
    pub title: String,
    pub status: IssueStatus,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
}

impl From<&crate::domain::Issue> for IssueSummary {
    fn from(issue: &crate::domain::Issue) -> Self {
        Self {
            id: issue.id.clone(),
            title: issue.title.clone(),
            status: issue.status,
            priority: issue.priority,
            assignee_id: issue.assignee_id.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BacklogResponse {
    pub project_id: String,
    pub issues: Vec<IssueSummary>,
    pub count: usize,
    pub estimated_hours: f32,
}

#[derive(Debug, Serialize)]
pub struct LinksResponse {
    pub issue_id: String,
    pub elements: Vec<LinkedElement>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub valid: bool,
    pub dangling_links: Vec<Link>,
}
