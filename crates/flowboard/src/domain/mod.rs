//! Core domain types and pure operations for the board.
//!
//! This module provides the domain layer containing:
//! - **types**: Core data structures (Issue, Sprint, Project, BpmnElement, Event, etc.)
//! - **queries**: Pure query operations on issue collections
//!
//! The domain layer holds no state; repositories in [`crate::storage`] own the data.

pub mod queries;
pub mod types;

pub use types::*;
