//! Property-based tests for link table invariants
//!
//! Random sequences of link/unlink/delete operations must never produce
//! duplicate rows, and the issue-side and element-side views must always
//! describe the same set of links.

use super::*;
use proptest::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone)]
enum Op {
    Insert(usize, usize, usize),
    Remove(usize, usize, usize),
    RemoveIssue(usize),
    Rekey(usize, usize, usize, usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..4usize, 0..2usize, 0..3usize).prop_map(|(i, d, e)| Op::Insert(i, d, e)),
        2 => (0..4usize, 0..2usize, 0..3usize).prop_map(|(i, d, e)| Op::Remove(i, d, e)),
        1 => (0..4usize).prop_map(Op::RemoveIssue),
        1 => (0..2usize, 0..3usize, 0..2usize, 0..3usize)
            .prop_map(|(d1, e1, d2, e2)| Op::Rekey(d1, e1, d2, e2)),
    ]
}

fn issue(i: usize) -> String {
    format!("issue-{}", i)
}

fn diagram(d: usize) -> String {
    format!("diagram-{}", d)
}

fn element(e: usize) -> String {
    format!("Task_{}", e)
}

fn apply(table: &LinkTable, op: &Op) {
    match op {
        Op::Insert(i, d, e) => {
            table.insert(Link::new(issue(*i), diagram(*d), element(*e)));
        }
        Op::Remove(i, d, e) => {
            table.remove(&issue(*i), &diagram(*d), &element(*e));
        }
        Op::RemoveIssue(i) => {
            table.remove_issue(&issue(*i));
        }
        Op::Rekey(d1, e1, d2, e2) => {
            table.rekey_element(
                (diagram(*d1).as_str(), element(*e1).as_str()),
                (diagram(*d2).as_str(), element(*e2).as_str()),
            );
        }
    }
}

proptest! {
    #[test]
    fn prop_rows_stay_unique(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let table = LinkTable::new();
        for op in &ops {
            apply(&table, op);
        }

        let rows = table.all();
        let unique: HashSet<Link> = rows.iter().cloned().collect();
        prop_assert_eq!(unique.len(), rows.len());
    }

    #[test]
    fn prop_directions_agree(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let table = LinkTable::new();
        for op in &ops {
            apply(&table, op);
        }

        let mut from_issues = HashSet::new();
        for i in 0..4 {
            for linked in table.elements_for_issue(&issue(i)) {
                from_issues.insert((issue(i), linked.diagram_id, linked.element_id));
            }
        }

        let mut from_elements = HashSet::new();
        for d in 0..2 {
            for e in 0..3 {
                for issue_id in table.issues_for_element(&diagram(d), &element(e)) {
                    from_elements.insert((issue_id, diagram(d), element(e)));
                }
            }
        }

        prop_assert_eq!(from_issues, from_elements);
    }

    #[test]
    fn prop_removed_issue_has_no_rows(
        ops in prop::collection::vec(op_strategy(), 0..40),
        victim in 0..4usize
    ) {
        let table = LinkTable::new();
        for op in &ops {
            apply(&table, op);
        }
        table.remove_issue(&issue(victim));

        prop_assert!(!table.issue_has_links(&issue(victim)));
        prop_assert!(table.elements_for_issue(&issue(victim)).is_empty());
    }
}
