//! Document domain model.
//!
//! # Invariants
//! - `project_id` resolved to an existing project when the document was last
//!   written. Nothing re-checks it afterwards, so it may dangle.
//! - `title` and `content` are free-form.

use super::project::ProjectId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a document; also its partition key in the store.
pub type DocumentId = Uuid;

/// Text document owned by a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default = "Uuid::new_v4")]
    pub id: DocumentId,
    pub project_id: ProjectId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl Document {
    /// Creates a document with a generated id.
    pub fn new(
        project_id: ProjectId,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), project_id, title, content)
    }

    /// Creates a document with a caller-provided id.
    pub fn with_id(
        id: DocumentId,
        project_id: ProjectId,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id,
            project_id,
            title: title.into(),
            content: content.into(),
        }
    }
}
