//! Issue ↔ element link table.
//!
//! A single set of `(issue_id, diagram_id, element_id)` rows answers both
//! "which elements is this issue attached to" and "which issues are attached
//! to this element". The issue and BPMN repositories hold clones of the same
//! table, so there is no second copy of a link to drift out of sync.

use crate::domain::LinkedElement;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

/// One link row. `element_id` is the element's external (markup) id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    pub issue_id: String,
    pub diagram_id: String,
    pub element_id: String,
}

impl Link {
    pub fn new(
        issue_id: impl Into<String>,
        diagram_id: impl Into<String>,
        element_id: impl Into<String>,
    ) -> Self {
        Self {
            issue_id: issue_id.into(),
            diagram_id: diagram_id.into(),
            element_id: element_id.into(),
        }
    }

    fn targets(&self, diagram_id: &str, element_id: &str) -> bool {
        self.diagram_id == diagram_id && self.element_id == element_id
    }
}

/// Shared, insertion-ordered set of links.
///
/// Uses `Rc<RefCell<>>` for shared interior mutability - clones share the same rows.
#[derive(Debug, Clone, Default)]
pub struct LinkTable {
    rows: Rc<RefCell<Vec<Link>>>,
}

impl LinkTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a link. Returns `false` if the exact row already existed.
    pub fn insert(&self, link: Link) -> bool {
        let mut rows = self.rows.borrow_mut();
        if rows.contains(&link) {
            return false;
        }
        rows.push(link);
        true
    }

    /// Remove one link. Returns `false` if it was not present.
    pub fn remove(&self, issue_id: &str, diagram_id: &str, element_id: &str) -> bool {
        let mut rows = self.rows.borrow_mut();
        let before = rows.len();
        rows.retain(|l| !(l.issue_id == issue_id && l.targets(diagram_id, element_id)));
        rows.len() != before
    }

    /// Remove every link naming an issue. Returns the removed rows.
    pub fn remove_issue(&self, issue_id: &str) -> Vec<Link> {
        let mut rows = self.rows.borrow_mut();
        let (removed, kept): (Vec<Link>, Vec<Link>) =
            rows.drain(..).partition(|l| l.issue_id == issue_id);
        *rows = kept;
        removed
    }

    /// Move every link on one element key to another, dropping rows that
    /// would duplicate an existing link on the target. Returns how many rows moved.
    pub fn rekey_element(
        &self,
        from: (&str, &str),
        to: (&str, &str),
    ) -> usize {
        if from == to {
            return 0;
        }
        let mut rows = self.rows.borrow_mut();
        let moving: Vec<String> = rows
            .iter()
            .filter(|l| l.targets(from.0, from.1))
            .map(|l| l.issue_id.clone())
            .collect();
        rows.retain(|l| !l.targets(from.0, from.1));

        let mut moved = 0;
        for issue_id in moving {
            let link = Link::new(issue_id, to.0, to.1);
            if !rows.contains(&link) {
                rows.push(link);
                moved += 1;
            }
        }
        moved
    }

    pub fn contains(&self, issue_id: &str, diagram_id: &str, element_id: &str) -> bool {
        self.rows
            .borrow()
            .iter()
            .any(|l| l.issue_id == issue_id && l.targets(diagram_id, element_id))
    }

    /// Elements an issue is linked to, in link order.
    pub fn elements_for_issue(&self, issue_id: &str) -> Vec<LinkedElement> {
        self.rows
            .borrow()
            .iter()
            .filter(|l| l.issue_id == issue_id)
            .map(|l| LinkedElement {
                diagram_id: l.diagram_id.clone(),
                element_id: l.element_id.clone(),
            })
            .collect()
    }

    /// Issues linked to one element of one diagram, in link order.
    pub fn issues_for_element(&self, diagram_id: &str, element_id: &str) -> Vec<String> {
        self.rows
            .borrow()
            .iter()
            .filter(|l| l.targets(diagram_id, element_id))
            .map(|l| l.issue_id.clone())
            .collect()
    }

    /// True if the issue has at least one link.
    pub fn issue_has_links(&self, issue_id: &str) -> bool {
        self.rows.borrow().iter().any(|l| l.issue_id == issue_id)
    }

    /// Issues linked to an external element id in any diagram.
    pub fn issues_for_element_id(&self, element_id: &str) -> HashSet<String> {
        self.rows
            .borrow()
            .iter()
            .filter(|l| l.element_id == element_id)
            .map(|l| l.issue_id.clone())
            .collect()
    }

    /// Issues linked to any element of a diagram.
    pub fn issues_for_diagram(&self, diagram_id: &str) -> HashSet<String> {
        self.rows
            .borrow()
            .iter()
            .filter(|l| l.diagram_id == diagram_id)
            .map(|l| l.issue_id.clone())
            .collect()
    }

    /// Snapshot of all rows, in insertion order.
    pub fn all(&self) -> Vec<Link> {
        self.rows.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.rows.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.borrow().is_empty()
    }
}


#[cfg(test)]
#[path = "links_proptests.rs"]
mod proptests;
