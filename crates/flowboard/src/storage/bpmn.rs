//! In-memory BPMN diagram and element repository.
//!
//! Besides diagrams and elements this repository stores the projected
//! [`ElementStatus`] records, keyed by each element's external `element_id`.
//! Element identity (`id`) and external id (`element_id`) are different keys:
//! links and statuses always use the external one.

use crate::domain::{
    BpmnDiagram, BpmnElement, DiagramUpdate, ElementStatus, ElementUpdate, NewDiagram, NewElement,
};
use crate::ids::IdGenerator;
use crate::storage::links::{Link, LinkTable};
use chrono::Utc;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::debug;

/// What a diagram deletion took with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramRemoval {
    pub diagram: BpmnDiagram,
    pub elements: Vec<BpmnElement>,
    /// External element ids whose status record was dropped
    pub statuses_removed: Vec<String>,
}

/// Diagram, element and element-status collections.
pub struct BpmnRepository {
    diagrams: Vec<BpmnDiagram>,
    elements: Vec<BpmnElement>,
    statuses: BTreeMap<String, ElementStatus>,
    links: LinkTable,
    ids: Rc<dyn IdGenerator>,
}

impl BpmnRepository {
    pub fn new(links: LinkTable, ids: Rc<dyn IdGenerator>) -> Self {
        Self {
            diagrams: Vec::new(),
            elements: Vec::new(),
            statuses: BTreeMap::new(),
            links,
            ids,
        }
    }

    // ------------------------------------------------------------------
    // Diagrams
    // ------------------------------------------------------------------

    pub fn add_diagram(&mut self, draft: NewDiagram) -> BpmnDiagram {
        let now = Utc::now();
        let diagram = BpmnDiagram {
            id: self.ids.next_id(),
            name: draft.name,
            description: draft.description,
            project_id: draft.project_id,
            xml: draft.xml,
            created_at: now,
            updated_at: now,
        };
        debug!(diagram_id = %diagram.id, "diagram added");
        self.diagrams.push(diagram.clone());
        diagram
    }

    /// Store a diagram as-is, replacing one with the same id.
    pub fn restore_diagram(&mut self, diagram: BpmnDiagram) {
        match self.diagrams.iter().position(|d| d.id == diagram.id) {
            Some(idx) => self.diagrams[idx] = diagram,
            None => self.diagrams.push(diagram),
        }
    }

    pub fn update_diagram(&mut self, id: &str, update: DiagramUpdate) -> Option<BpmnDiagram> {
        let diagram = self.diagrams.iter_mut().find(|d| d.id == id)?;
        if let Some(name) = update.name {
            diagram.name = name;
        }
        if let Some(description) = update.description {
            diagram.description = description;
        }
        if let Some(xml) = update.xml {
            diagram.xml = xml;
        }
        diagram.updated_at = Utc::now();
        Some(diagram.clone())
    }

    /// Delete a diagram, its elements, and the status records of those
    /// elements. Links pointing at the diagram are left in place.
    pub fn delete_diagram(&mut self, id: &str) -> Option<DiagramRemoval> {
        let idx = self.diagrams.iter().position(|d| d.id == id)?;
        let diagram = self.diagrams.remove(idx);

        let (elements, kept): (Vec<BpmnElement>, Vec<BpmnElement>) =
            self.elements.drain(..).partition(|e| e.diagram_id == id);
        self.elements = kept;

        let statuses_removed: Vec<String> = elements
            .iter()
            .filter_map(|e| self.statuses.remove(&e.element_id).map(|s| s.element_id))
            .collect();

        debug!(
            diagram_id = %id,
            elements = elements.len(),
            statuses = statuses_removed.len(),
            "diagram deleted"
        );
        Some(DiagramRemoval {
            diagram,
            elements,
            statuses_removed,
        })
    }

    pub fn get_diagram(&self, id: &str) -> Option<&BpmnDiagram> {
        self.diagrams.iter().find(|d| d.id == id)
    }

    pub fn diagrams(&self) -> &[BpmnDiagram] {
        &self.diagrams
    }

    pub fn get_diagrams_by_project(&self, project_id: &str) -> Vec<&BpmnDiagram> {
        self.diagrams
            .iter()
            .filter(|d| d.project_id == project_id)
            .collect()
    }

    // ------------------------------------------------------------------
    // Elements
    // ------------------------------------------------------------------

    /// Store a new element and link the issues it was created with.
    pub fn add_element(&mut self, draft: NewElement) -> BpmnElement {
        let element = BpmnElement {
            id: self.ids.next_id(),
            diagram_id: draft.diagram_id,
            element_id: draft.element_id,
            kind: draft.kind,
            name: draft.name,
        };
        for issue_id in draft.linked_issue_ids {
            self.links
                .insert(Link::new(issue_id, &element.diagram_id, &element.element_id));
        }
        debug!(id = %element.id, element_id = %element.element_id, "element added");
        self.elements.push(element.clone());
        element
    }

    /// Store an element as-is, replacing one with the same id.
    pub fn restore_element(&mut self, element: BpmnElement) {
        match self.elements.iter().position(|e| e.id == element.id) {
            Some(idx) => self.elements[idx] = element,
            None => self.elements.push(element),
        }
    }

    /// Apply a partial update.
    ///
    /// Changing the diagram or external id moves the element's links to the
    /// new key and drops the status stored under the old external id.
    pub fn update_element(&mut self, id: &str, update: ElementUpdate) -> Option<BpmnElement> {
        let element = self.elements.iter_mut().find(|e| e.id == id)?;
        let old_key = (element.diagram_id.clone(), element.element_id.clone());

        if let Some(diagram_id) = update.diagram_id {
            element.diagram_id = diagram_id;
        }
        if let Some(element_id) = update.element_id {
            element.element_id = element_id;
        }
        if let Some(kind) = update.kind {
            element.kind = kind;
        }
        if let Some(name) = update.name {
            element.name = name;
        }

        let updated = element.clone();
        if updated.diagram_id != old_key.0 || updated.element_id != old_key.1 {
            self.links.rekey_element(
                (old_key.0.as_str(), old_key.1.as_str()),
                (updated.diagram_id.as_str(), updated.element_id.as_str()),
            );
            if updated.element_id != old_key.1 {
                self.statuses.remove(&old_key.1);
            }
        }
        Some(updated)
    }

    /// Delete an element and the status stored under its external id.
    pub fn delete_element(&mut self, id: &str) -> Option<BpmnElement> {
        let idx = self.elements.iter().position(|e| e.id == id)?;
        let element = self.elements.remove(idx);
        let had_status = self.statuses.remove(&element.element_id).is_some();
        debug!(id, element_id = %element.element_id, had_status, "element deleted");
        Some(element)
    }

    pub fn get_element(&self, id: &str) -> Option<&BpmnElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Look an element up by its diagram and external id.
    pub fn find_element(&self, diagram_id: &str, element_id: &str) -> Option<&BpmnElement> {
        self.elements
            .iter()
            .find(|e| e.diagram_id == diagram_id && e.element_id == element_id)
    }

    pub fn elements(&self) -> &[BpmnElement] {
        &self.elements
    }

    pub fn get_elements_by_diagram(&self, diagram_id: &str) -> Vec<&BpmnElement> {
        self.elements
            .iter()
            .filter(|e| e.diagram_id == diagram_id)
            .collect()
    }

    /// Ids of issues linked to an element, in link order.
    pub fn linked_issue_ids(&self, element: &BpmnElement) -> Vec<String> {
        self.links
            .issues_for_element(&element.diagram_id, &element.element_id)
    }

    /// Elements of a diagram with at least one linked issue.
    pub fn get_elements_with_linked_issues(&self, diagram_id: &str) -> Vec<&BpmnElement> {
        self.elements
            .iter()
            .filter(|e| e.diagram_id == diagram_id && self.has_links(e))
            .collect()
    }

    /// Elements of every diagram with at least one linked issue.
    pub fn elements_with_links(&self) -> Vec<&BpmnElement> {
        self.elements.iter().filter(|e| self.has_links(e)).collect()
    }

    fn has_links(&self, element: &BpmnElement) -> bool {
        !self
            .links
            .issues_for_element(&element.diagram_id, &element.element_id)
            .is_empty()
    }

    // ------------------------------------------------------------------
    // Links (element side)
    // ------------------------------------------------------------------

    /// Link an issue to every element carrying this external id.
    ///
    /// Writes the same rows as [`IssueRepository::link_to_bpmn`], so calling
    /// both sides for one link is harmless. Returns `true` if any row was added.
    ///
    /// [`IssueRepository::link_to_bpmn`]: crate::storage::IssueRepository::link_to_bpmn
    pub fn link_issue(&mut self, element_id: &str, issue_id: &str) -> bool {
        let mut added = false;
        for element in self.elements.iter().filter(|e| e.element_id == element_id) {
            added |= self
                .links
                .insert(Link::new(issue_id, &element.diagram_id, element_id));
        }
        added
    }

    /// Unlink an issue from every element carrying this external id.
    pub fn unlink_issue(&mut self, element_id: &str, issue_id: &str) -> bool {
        let mut removed = false;
        for element in self.elements.iter().filter(|e| e.element_id == element_id) {
            removed |= self.links.remove(issue_id, &element.diagram_id, element_id);
        }
        removed
    }

    // ------------------------------------------------------------------
    // Element statuses
    // ------------------------------------------------------------------

    pub fn get_element_status(&self, element_id: &str) -> Option<&ElementStatus> {
        self.statuses.get(element_id)
    }

    /// Insert or replace the status for `status.element_id`.
    /// Returns the previous record, if any.
    pub fn set_element_status(&mut self, status: ElementStatus) -> Option<ElementStatus> {
        self.statuses.insert(status.element_id.clone(), status)
    }

    pub fn remove_element_status(&mut self, element_id: &str) -> Option<ElementStatus> {
        self.statuses.remove(element_id)
    }

    /// All status records ordered by external element id.
    pub fn element_statuses(&self) -> Vec<&ElementStatus> {
        self.statuses.values().collect()
    }
}
