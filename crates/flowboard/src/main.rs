//! flowboard CLI
//!
//! Loads a board snapshot, recomputes element statuses from linked issues
//! and reports on them. Logging goes to stderr and is controlled by the
//! `FLOWBOARD_LOG` environment variable (default `warn`).

use anyhow::{Context, Result};
use clap::Parser;
use flowboard::cli::{Cli, Commands};
use flowboard::config::{BoardConfig, CONFIG_FILE_NAME};
use flowboard::domain::{queries, IssueStatus};
use flowboard::errors::{self, ActionableError, BoardError};
use flowboard::ids::UuidGenerator;
use flowboard::output::{
    BacklogResponse, CheckResponse, ElementStatusView, ExitCode, IssueSummary, JsonError,
    JsonOutput, LinksResponse, OutputContext, StatusResponse,
};
use flowboard::snapshot::WorkspaceSnapshot;
use flowboard::workspace::Workspace;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Map an error chain onto a process exit code
fn error_to_exit_code(error: &anyhow::Error) -> ExitCode {
    for cause in error.chain() {
        if let Some(board) = cause.downcast_ref::<BoardError>() {
            return match board {
                BoardError::InvalidValue { .. } | BoardError::Config { .. } => {
                    ExitCode::InvalidArgument
                }
                BoardError::Snapshot(_) | BoardError::SnapshotVersion { .. } => {
                    ExitCode::ValidationFailed
                }
                BoardError::Io { source, .. } => match source.kind() {
                    std::io::ErrorKind::NotFound => ExitCode::NotFound,
                    _ => ExitCode::ExternalError,
                },
            };
        }
        if let Some(actionable) = cause.downcast_ref::<ActionableError>() {
            if actionable.message().to_lowercase().contains("not found") {
                return ExitCode::NotFound;
            }
        }
    }
    ExitCode::GenericError
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("FLOWBOARD_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() {
    init_tracing();

    let exit_code = match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            error_to_exit_code(&e)
        }
    };

    if exit_code != ExitCode::Success {
        std::process::exit(exit_code.code());
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let out = OutputContext::new(cli.quiet, cli.json);
    let command_name = cli.command.name();

    let snapshot_path = cli.command.snapshot().clone();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| default_config_path(&snapshot_path));
    let config = BoardConfig::load(&config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;
    debug!(config = %config_path.display(), "config loaded");

    let ws = load_workspace(&snapshot_path, config)?;

    match cli.command {
        Commands::Status { diagram, .. } => {
            if let Some(diagram_id) = &diagram {
                if ws.bpmn().get_diagram(diagram_id).is_none() {
                    return report(&out, JsonError::diagram_not_found(diagram_id, command_name));
                }
            }
            let response = element_statuses(&ws, diagram.as_deref());

            if out.is_json() {
                out.print_json(&JsonOutput::success(&response, command_name))?;
            } else {
                for view in &response.elements {
                    out.print_data(format_element(view))?;
                }
                out.print_info(format!("{} element(s)", response.count))?;
            }
        }
        Commands::Backlog {
            project,
            assignee,
            status,
            ..
        } => {
            let status = status
                .as_deref()
                .map(str::parse::<IssueStatus>)
                .transpose()?;
            if ws.projects().get(&project).is_none()
                && ws.issues().get_by_project(&project).is_empty()
            {
                return report(&out, JsonError::project_not_found(&project, command_name));
            }

            let backlog: Vec<_> = ws
                .issues()
                .get_backlog(&project)
                .into_iter()
                .filter(|i| assignee.is_none() || i.assignee_id == assignee)
                .filter(|i| status.map_or(true, |s| i.status == s))
                .collect();
            let estimated_hours = queries::total_estimate(backlog.iter().copied());

            if out.is_json() {
                let response = BacklogResponse {
                    project_id: project,
                    count: backlog.len(),
                    issues: backlog.iter().map(|i| IssueSummary::from(*i)).collect(),
                    estimated_hours,
                };
                out.print_json(&JsonOutput::success(response, command_name))?;
            } else {
                for issue in &backlog {
                    out.print_data(format!(
                        "{} | {} | {} | {:?}",
                        issue.id, issue.title, issue.status, issue.priority
                    ))?;
                }
                let columns = queries::board_columns(backlog.iter().copied());
                out.print_info(format!(
                    "{} issue(s): {} to do, {} in progress, {} done, {:.1}h estimated",
                    backlog.len(),
                    columns.to_do.len(),
                    columns.in_progress.len(),
                    columns.done.len(),
                    estimated_hours
                ))?;
            }
        }
        Commands::Links { issue, .. } => {
            if ws.issues().get(&issue).is_none() {
                if out.is_json() {
                    return report(&out, JsonError::issue_not_found(&issue, command_name));
                }
                return Err(errors::issue_not_found(&issue).into());
            }
            let elements = ws.issues().get_linked_elements(&issue);

            if out.is_json() {
                let response = LinksResponse {
                    issue_id: issue,
                    count: elements.len(),
                    elements,
                };
                out.print_json(&JsonOutput::success(response, command_name))?;
            } else {
                for link in &elements {
                    let name = ws
                        .bpmn()
                        .find_element(&link.diagram_id, &link.element_id)
                        .map(|e| e.name.as_str())
                        .unwrap_or("(missing)");
                    out.print_data(format!("{}/{} {}", link.diagram_id, link.element_id, name))?;
                }
                out.print_info(format!("{} linked element(s)", elements.len()))?;
            }
        }
        Commands::Check { .. } => {
            let dangling = ws.dangling_links();

            if out.is_json() {
                let valid = dangling.is_empty();
                out.print_json(&JsonOutput::success(
                    CheckResponse {
                        valid,
                        dangling_links: dangling,
                    },
                    command_name,
                ))?;
                if !valid {
                    return Ok(ExitCode::ValidationFailed);
                }
            } else if dangling.is_empty() {
                out.print_info("No dangling links")?;
            } else {
                for link in &dangling {
                    out.print_data(format!(
                        "{} -> {}/{}",
                        link.issue_id, link.diagram_id, link.element_id
                    ))?;
                }
                eprint!("Error: {}", errors::dangling_links(dangling.len()));
                return Ok(ExitCode::ValidationFailed);
            }
        }
    }

    Ok(ExitCode::Success)
}

fn default_config_path(snapshot: &Path) -> PathBuf {
    snapshot
        .parent()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

fn load_workspace(path: &Path, config: BoardConfig) -> Result<Workspace> {
    if !path.exists() {
        return Err(errors::snapshot_not_found(&path.display().to_string()).into());
    }
    let snapshot = WorkspaceSnapshot::load(path)
        .with_context(|| format!("Failed to load snapshot {}", path.display()))?;
    Ok(Workspace::from_snapshot(
        snapshot,
        Rc::new(UuidGenerator),
        config,
    ))
}

fn element_statuses(ws: &Workspace, diagram: Option<&str>) -> StatusResponse {
    let palette = ws.palette();
    let elements: Vec<ElementStatusView> = ws
        .bpmn()
        .elements()
        .iter()
        .filter(|e| diagram.map_or(true, |d| e.diagram_id == d))
        .map(|e| {
            let linked_issues = ws.bpmn().linked_issue_ids(e).len();
            let status = ws
                .bpmn()
                .get_element_status(&e.element_id)
                .filter(|_| linked_issues > 0);
            ElementStatusView {
                diagram_id: e.diagram_id.clone(),
                element_id: e.element_id.clone(),
                name: e.name.clone(),
                kind: e.kind,
                linked_issues,
                status: status.map(|s| s.status),
                progress: status.map(|s| s.progress),
                colors: status.and_then(|s| palette.colors_for(s.status).cloned()),
            }
        })
        .collect();

    StatusResponse {
        count: elements.len(),
        elements,
    }
}

fn format_element(view: &ElementStatusView) -> String {
    let state = match (view.status, view.progress) {
        (Some(status), Some(progress)) => format!("{} {}%", status, progress),
        _ => "-".to_string(),
    };
    format!(
        "{}/{} | {} | {} | {} issue(s)",
        view.diagram_id, view.element_id, view.name, state, view.linked_issues
    )
}

/// Print a structured error and return its exit code.
fn report(out: &OutputContext, error: JsonError) -> Result<ExitCode> {
    out.print_error(&error)?;
    Ok(error.exit_code())
}
