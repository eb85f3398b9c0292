//! Project domain model.
//!
//! # Invariants
//! - `id` is stable and never reused for another project.
//! - `name` is non-empty after trimming.

use super::ModelValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a project; also its partition key in the store.
pub type ProjectId = Uuid;

/// Top-level grouping that documents point at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Generated when the payload omits it.
    #[serde(default = "Uuid::new_v4")]
    pub id: ProjectId,
    pub name: String,
}

impl Project {
    /// Creates a project with a generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    /// Creates a project with a caller-provided id.
    pub fn with_id(id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Checks field constraints enforced on every write.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.name.trim().is_empty() {
            return Err(ModelValidationError::EmptyProjectName);
        }
        Ok(())
    }
}
