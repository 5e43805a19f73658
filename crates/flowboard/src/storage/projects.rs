//! In-memory project repository with a "current project" cursor.

use crate::domain::{NewProject, Project, ProjectUpdate};
use crate::ids::IdGenerator;
use chrono::Utc;
use std::rc::Rc;

pub struct ProjectRepository {
    projects: Vec<Project>,
    current: Option<String>,
    ids: Rc<dyn IdGenerator>,
}

impl ProjectRepository {
    pub fn new(ids: Rc<dyn IdGenerator>) -> Self {
        Self {
            projects: Vec::new(),
            current: None,
            ids,
        }
    }

    pub fn add(&mut self, draft: NewProject) -> Project {
        let now = Utc::now();
        let project = Project {
            id: self.ids.next_id(),
            name: draft.name,
            description: draft.description,
            owner_id: draft.owner_id,
            member_ids: draft.member_ids,
            created_at: now,
            updated_at: now,
        };
        self.projects.push(project.clone());
        project
    }

    /// Store a project as-is, replacing one with the same id.
    pub fn restore(&mut self, project: Project) {
        match self.projects.iter().position(|p| p.id == project.id) {
            Some(idx) => self.projects[idx] = project,
            None => self.projects.push(project),
        }
    }

    pub fn update(&mut self, id: &str, update: ProjectUpdate) -> Option<Project> {
        let project = self.projects.iter_mut().find(|p| p.id == id)?;
        if let Some(name) = update.name {
            project.name = name;
        }
        if let Some(description) = update.description {
            project.description = description;
        }
        if let Some(owner_id) = update.owner_id {
            project.owner_id = owner_id;
        }
        if let Some(member_ids) = update.member_ids {
            project.member_ids = member_ids;
        }
        project.updated_at = Utc::now();
        Some(project.clone())
    }

    /// Remove a project; clears the current-project cursor if it pointed here.
    pub fn delete(&mut self, id: &str) -> Option<Project> {
        let idx = self.projects.iter().position(|p| p.id == id)?;
        if self.current.as_deref() == Some(id) {
            self.current = None;
        }
        Some(self.projects.remove(idx))
    }

    pub fn get(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn list(&self) -> &[Project] {
        &self.projects
    }

    /// Select the current project. Unknown ids clear the selection.
    pub fn set_current(&mut self, id: Option<&str>) {
        self.current = id.filter(|id| self.get(id).is_some()).map(str::to_string);
    }

    pub fn current(&self) -> Option<&Project> {
        self.current.as_deref().and_then(|id| self.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;

    fn repo() -> ProjectRepository {
        ProjectRepository::new(Rc::new(SequentialIds::new("project")))
    }

    #[test]
    fn test_owner_is_a_member() {
        let mut projects = repo();
        let project = projects.add(NewProject::new("Checkout", "alice"));
        assert_eq!(project.member_ids, vec!["alice"]);
    }

    #[test]
    fn test_delete_clears_current() {
        let mut projects = repo();
        let project = projects.add(NewProject::new("Checkout", "alice"));
        projects.set_current(Some(&project.id));
        assert_eq!(projects.current().unwrap().id, project.id);

        projects.delete(&project.id);

        assert!(projects.current().is_none());
    }

    #[test]
    fn test_update_and_unknown_current() {
        let mut projects = repo();
        let project = projects.add(NewProject::new("Checkout", "alice"));

        let updated = projects
            .update(
                &project.id,
                ProjectUpdate {
                    name: Some("Payments".to_string()),
                    ..ProjectUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(updated.name, "Payments");

        projects.set_current(Some("ghost"));
        assert!(projects.current().is_none());
    }
}
