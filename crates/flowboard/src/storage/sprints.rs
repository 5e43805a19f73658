//! In-memory sprint repository.

use crate::domain::{NewSprint, Sprint, SprintStatus, SprintUpdate};
use crate::ids::IdGenerator;
use chrono::Utc;
use std::rc::Rc;

/// Sprint collection. A project has at most one sprint meant to be active;
/// [`SprintRepository::can_start_sprint`] is the check callers use before
/// activating another.
pub struct SprintRepository {
    sprints: Vec<Sprint>,
    ids: Rc<dyn IdGenerator>,
}

impl SprintRepository {
    pub fn new(ids: Rc<dyn IdGenerator>) -> Self {
        Self {
            sprints: Vec::new(),
            ids,
        }
    }

    pub fn add(&mut self, draft: NewSprint) -> Sprint {
        let now = Utc::now();
        let sprint = Sprint {
            id: self.ids.next_id(),
            name: draft.name,
            description: draft.description,
            start_date: draft.start_date,
            end_date: draft.end_date,
            project_id: draft.project_id,
            issue_ids: Vec::new(),
            status: draft.status,
            created_at: now,
            updated_at: now,
        };
        self.sprints.push(sprint.clone());
        sprint
    }

    /// Store a sprint as-is, replacing one with the same id.
    pub fn restore(&mut self, sprint: Sprint) {
        match self.sprints.iter().position(|s| s.id == sprint.id) {
            Some(idx) => self.sprints[idx] = sprint,
            None => self.sprints.push(sprint),
        }
    }

    pub fn update(&mut self, id: &str, update: SprintUpdate) -> Option<Sprint> {
        let sprint = self.get_mut(id)?;
        if let Some(name) = update.name {
            sprint.name = name;
        }
        if let Some(description) = update.description {
            sprint.description = description;
        }
        if let Some(start_date) = update.start_date {
            sprint.start_date = start_date;
        }
        if let Some(end_date) = update.end_date {
            sprint.end_date = end_date;
        }
        if let Some(status) = update.status {
            sprint.status = status;
        }
        sprint.updated_at = Utc::now();
        Some(sprint.clone())
    }

    pub fn delete(&mut self, id: &str) -> Option<Sprint> {
        let idx = self.sprints.iter().position(|s| s.id == id)?;
        Some(self.sprints.remove(idx))
    }

    pub fn get(&self, id: &str) -> Option<&Sprint> {
        self.sprints.iter().find(|s| s.id == id)
    }

    pub fn list(&self) -> &[Sprint] {
        &self.sprints
    }

    pub fn get_by_project(&self, project_id: &str) -> Vec<&Sprint> {
        self.sprints
            .iter()
            .filter(|s| s.project_id == project_id)
            .collect()
    }

    /// First active sprint of a project.
    pub fn get_active_sprint(&self, project_id: &str) -> Option<&Sprint> {
        self.sprints
            .iter()
            .find(|s| s.project_id == project_id && s.status == SprintStatus::Active)
    }

    /// A new sprint may start only while no other sprint of the project is active.
    pub fn can_start_sprint(&self, project_id: &str) -> bool {
        self.get_active_sprint(project_id).is_none()
    }

    /// Record an issue as part of a sprint. Adding it twice keeps one entry.
    pub fn add_issue(&mut self, sprint_id: &str, issue_id: &str) -> bool {
        let Some(sprint) = self.get_mut(sprint_id) else {
            return false;
        };
        if sprint.issue_ids.iter().any(|id| id == issue_id) {
            return false;
        }
        sprint.issue_ids.push(issue_id.to_string());
        sprint.updated_at = Utc::now();
        true
    }

    pub fn remove_issue(&mut self, sprint_id: &str, issue_id: &str) -> bool {
        let Some(sprint) = self.get_mut(sprint_id) else {
            return false;
        };
        let before = sprint.issue_ids.len();
        sprint.issue_ids.retain(|id| id != issue_id);
        sprint.updated_at = Utc::now();
        sprint.issue_ids.len() != before
    }

    /// Drop an issue from whichever sprints list it.
    pub fn forget_issue(&mut self, issue_id: &str) {
        for sprint in &mut self.sprints {
            sprint.issue_ids.retain(|id| id != issue_id);
        }
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Sprint> {
        self.sprints.iter_mut().find(|s| s.id == id)
    }
}
