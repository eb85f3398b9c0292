//! Project repository contract and item-store implementation.
//!
//! # Invariants
//! - `get` treats a missing item as `Ok(None)`, never as an error.
//! - `update` lets the store reject unknown ids (`RepoError::NotFound`).
//! - Removing a project leaves its documents untouched.

use super::{EntityContainer, RepoResult, Versioned};
use crate::model::project::{Project, ProjectId};
use crate::model::EntityKind;
use crate::store::ItemContainer;
use async_trait::async_trait;

/// Repository interface for project CRUD.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Point read that also reports the version the project was read at.
    async fn fetch_project(&self, id: ProjectId) -> RepoResult<Option<Versioned<Project>>>;

    async fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        Ok(self.fetch_project(id).await?.map(|versioned| versioned.value))
    }

    async fn list_projects(&self) -> RepoResult<Vec<Project>>;

    /// Persists a new project and returns the stored value.
    async fn create_project(&self, project: &Project) -> RepoResult<Project>;

    /// Replaces the project under `id`; `project.id` is ignored.
    async fn update_project(&self, id: ProjectId, project: &Project) -> RepoResult<Project>;

    /// Returns `Ok(false)` when nothing was stored under `id`.
    async fn remove_project(&self, id: ProjectId) -> RepoResult<bool>;
}

/// Project repository backed by one item container.
#[derive(Clone)]
pub struct StoreProjectRepository<C> {
    items: EntityContainer<C>,
}

impl<C: ItemContainer> StoreProjectRepository<C> {
    pub fn new(container: C) -> Self {
        Self {
            items: EntityContainer::new(container),
        }
    }
}

#[async_trait]
impl<C: ItemContainer> ProjectRepository for StoreProjectRepository<C> {
    async fn fetch_project(&self, id: ProjectId) -> RepoResult<Option<Versioned<Project>>> {
        self.items.read(id).await
    }

    async fn list_projects(&self) -> RepoResult<Vec<Project>> {
        self.items.scan(None).await
    }

    async fn create_project(&self, project: &Project) -> RepoResult<Project> {
        self.items.insert(project).await
    }

    async fn update_project(&self, id: ProjectId, project: &Project) -> RepoResult<Project> {
        self.items.replace(id, project).await
    }

    async fn remove_project(&self, id: ProjectId) -> RepoResult<bool> {
        self.items.delete(EntityKind::Project, id).await
    }
}
