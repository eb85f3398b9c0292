//! Referential integrity between documents and projects.
//!
//! # Responsibility
//! - Decide whether a document write may proceed: its `project_id` must
//!   resolve to a stored project at the moment of the write.
//! - Hand the document repository a [`ProjectReference`] token proving the
//!   check ran, so writes cannot skip it.
//!
//! # Invariants
//! - The check is a point read issued before the document write; nothing is
//!   written when it fails.
//! - Check and write are separate store calls. A project deleted between
//!   them leaves a dangling reference; that window is accepted.
//! - References are validated at write time and never maintained afterwards.

use crate::model::project::ProjectId;
use crate::repo::project_repo::ProjectRepository;
use crate::repo::RepoError;
use crate::store::ETag;
use log::{error, warn};
use thiserror::Error;

/// Why a document write was refused.
#[derive(Debug, Error)]
pub enum IntegrityError {
    /// The referenced project does not exist.
    #[error("project {0} does not exist")]
    MissingProject(ProjectId),
    /// The existence check itself failed.
    #[error(transparent)]
    Lookup(#[from] RepoError),
}

/// Precondition token for a document write against one project.
///
/// Records the project version the check observed. The version is logged
/// with the write; it is not enforced by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectReference {
    project_id: ProjectId,
    etag: ETag,
}

impl ProjectReference {
    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Version of the project when the check ran.
    pub fn etag(&self) -> &ETag {
        &self.etag
    }
}

/// Returns whether `project_id` currently resolves to a stored project.
pub async fn project_exists<P>(projects: &P, project_id: ProjectId) -> Result<bool, RepoError>
where
    P: ProjectRepository + ?Sized,
{
    Ok(projects.fetch_project(project_id).await?.is_some())
}

/// Resolves `project_id` or refuses the write that depends on it.
pub async fn require_project<P>(
    projects: &P,
    project_id: ProjectId,
) -> Result<ProjectReference, IntegrityError>
where
    P: ProjectRepository + ?Sized,
{
    match projects.fetch_project(project_id).await {
        Ok(Some(project)) => Ok(ProjectReference {
            project_id: project.value.id,
            etag: project.etag,
        }),
        Ok(None) => {
            warn!(
                "event=integrity_check module=integrity status=rejected project_id={}",
                project_id
            );
            Err(IntegrityError::MissingProject(project_id))
        }
        Err(err) => {
            error!(
                "event=integrity_check module=integrity status=error project_id={} error={}",
                project_id, err
            );
            Err(err.into())
        }
    }
}

#[cfg(test)]
pub(crate) fn reference_for_tests(project_id: ProjectId) -> ProjectReference {
    ProjectReference {
        project_id,
        etag: ETag::new("\"test\""),
    }
}
