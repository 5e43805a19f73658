//! Identity generation for stored records.
//!
//! Repositories take an [`IdGenerator`] instead of calling `Uuid::new_v4`
//! directly so tests can use predictable ids.

use std::cell::Cell;
use uuid::Uuid;

/// Produces unique identity tokens.
pub trait IdGenerator {
    /// Return a token never returned before by this generator.
    fn next_id(&self) -> String;
}

/// Random v4 UUIDs. The default for real use.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic `<prefix>-<n>` ids counting up from 1.
///
/// # Examples
///
/// ```
/// use flowboard::ids::{IdGenerator, SequentialIds};
///
/// let ids = SequentialIds::new("issue");
/// assert_eq!(ids.next_id(), "issue-1");
/// assert_eq!(ids.next_id(), "issue-2");
/// ```
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: Cell<u64>,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: Cell::new(1),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.next.get();
        self.next.set(n + 1);
        format!("{}-{}", self.prefix, n)
    }
}
