//! Core use-case services.
//!
//! # Responsibility
//! - Expose the operations the HTTP layer dispatches to.
//! - Apply the referential-integrity gate before document writes.
//! - Keep transport layers decoupled from storage details.

use crate::integrity::IntegrityError;
use crate::model::project::ProjectId;
use crate::model::{EntityKind, ModelValidationError};
use crate::repo::RepoError;
use thiserror::Error;
use uuid::Uuid;

pub mod document_service;
pub mod generation_service;
pub mod project_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Outcome classes surfaced to callers of the services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Payload violates a field constraint.
    #[error(transparent)]
    Validation(#[from] ModelValidationError),
    /// Update target does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: Uuid },
    /// Document write refused because its project does not resolve.
    #[error("document rejected: project {project_id} does not exist")]
    IntegrityRejected { project_id: ProjectId },
    /// Store or persistence failure.
    #[error(transparent)]
    Repo(RepoError),
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { kind, id } => Self::NotFound { kind, id },
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<IntegrityError> for ServiceError {
    fn from(value: IntegrityError) -> Self {
        match value {
            IntegrityError::MissingProject(project_id) => Self::IntegrityRejected { project_id },
            IntegrityError::Lookup(err) => err.into(),
        }
    }
}
