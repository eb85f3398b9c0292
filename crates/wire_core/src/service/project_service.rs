//! Project use-case service.
//!
//! # Invariants
//! - Deleting a project never cascades to its documents.

use super::ServiceResult;
use crate::model::project::{Project, ProjectId};
use crate::repo::project_repo::ProjectRepository;

/// Use-case service wrapper for project CRUD.
pub struct ProjectService<P: ProjectRepository> {
    projects: P,
}

impl<P: ProjectRepository> ProjectService<P> {
    pub fn new(projects: P) -> Self {
        Self { projects }
    }

    pub async fn list_projects(&self) -> ServiceResult<Vec<Project>> {
        Ok(self.projects.list_projects().await?)
    }

    /// Returns `Ok(None)` when the project does not exist.
    pub async fn get_project(&self, id: ProjectId) -> ServiceResult<Option<Project>> {
        Ok(self.projects.get_project(id).await?)
    }

    /// Creates a project; a nil id is replaced by a generated one.
    pub async fn create_project(&self, project: &Project) -> ServiceResult<Project> {
        Ok(self.projects.create_project(project).await?)
    }

    /// Replaces the project under `id`, ignoring any id inside `project`.
    ///
    /// Returns `ServiceError::NotFound` when `id` is not stored.
    pub async fn update_project(&self, id: ProjectId, project: &Project) -> ServiceResult<Project> {
        Ok(self.projects.update_project(id, project).await?)
    }

    /// Returns `Ok(false)` when the project was already absent.
    pub async fn delete_project(&self, id: ProjectId) -> ServiceResult<bool> {
        Ok(self.projects.remove_project(id).await?)
    }
}
