//! Domain model for projects and the documents that reference them.
//!
//! # Responsibility
//! - Define the records persisted as items in the document store.
//! - Keep serialized field names aligned with the store's JSON items.
//!
//! # Invariants
//! - Every record is identified by a UUID that doubles as its partition key.
//! - `Document::project_id` is a soft reference: checked at write time only.

use std::fmt::{Display, Formatter};
use thiserror::Error;

pub mod document;
pub mod project;

/// Entity families handled by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Project,
    Document,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Project => f.write_str("project"),
            Self::Document => f.write_str("document"),
        }
    }
}

/// Validation failures raised before any store write.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelValidationError {
    #[error("project name must not be empty")]
    EmptyProjectName,
}
