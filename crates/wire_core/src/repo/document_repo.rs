//! Document repository contract and item-store implementation.
//!
//! # Invariants
//! - Creates and updates require a [`ProjectReference`] for the document's
//!   own `project_id`; the repository never looks projects up itself.
//! - Listing by project does not check that the project exists.

use super::{EntityContainer, RepoError, RepoResult};
use crate::integrity::ProjectReference;
use crate::model::document::{Document, DocumentId};
use crate::model::project::ProjectId;
use crate::model::EntityKind;
use crate::store::{ItemContainer, ItemFilter};
use async_trait::async_trait;
use log::debug;

const PROJECT_ID_FIELD: &str = "projectId";

/// Repository interface for document CRUD.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn get_document(&self, id: DocumentId) -> RepoResult<Option<Document>>;

    async fn list_documents(&self) -> RepoResult<Vec<Document>>;

    /// Documents whose `project_id` equals `project_id`, filtered by the store.
    async fn list_documents_by_project(&self, project_id: ProjectId)
        -> RepoResult<Vec<Document>>;

    /// Persists a new document checked against `project`.
    async fn create_document(
        &self,
        document: &Document,
        project: &ProjectReference,
    ) -> RepoResult<Document>;

    /// Replaces the document under `id`; `document.id` is ignored.
    async fn update_document(
        &self,
        id: DocumentId,
        document: &Document,
        project: &ProjectReference,
    ) -> RepoResult<Document>;

    /// Returns `Ok(false)` when nothing was stored under `id`.
    async fn remove_document(&self, id: DocumentId) -> RepoResult<bool>;
}

/// Document repository backed by one item container.
#[derive(Clone)]
pub struct StoreDocumentRepository<C> {
    items: EntityContainer<C>,
}

impl<C: ItemContainer> StoreDocumentRepository<C> {
    pub fn new(container: C) -> Self {
        Self {
            items: EntityContainer::new(container),
        }
    }
}

#[async_trait]
impl<C: ItemContainer> DocumentRepository for StoreDocumentRepository<C> {
    async fn get_document(&self, id: DocumentId) -> RepoResult<Option<Document>> {
        Ok(self
            .items
            .read::<Document>(id)
            .await?
            .map(|versioned| versioned.value))
    }

    async fn list_documents(&self) -> RepoResult<Vec<Document>> {
        self.items.scan(None).await
    }

    async fn list_documents_by_project(
        &self,
        project_id: ProjectId,
    ) -> RepoResult<Vec<Document>> {
        let filter = ItemFilter::field_equals(PROJECT_ID_FIELD, project_id.to_string());
        self.items.scan(Some(&filter)).await
    }

    async fn create_document(
        &self,
        document: &Document,
        project: &ProjectReference,
    ) -> RepoResult<Document> {
        ensure_checked(document, project)?;
        self.items.insert(document).await
    }

    async fn update_document(
        &self,
        id: DocumentId,
        document: &Document,
        project: &ProjectReference,
    ) -> RepoResult<Document> {
        ensure_checked(document, project)?;
        self.items.replace(id, document).await
    }

    async fn remove_document(&self, id: DocumentId) -> RepoResult<bool> {
        self.items.delete(EntityKind::Document, id).await
    }
}

fn ensure_checked(document: &Document, project: &ProjectReference) -> RepoResult<()> {
    if document.project_id != project.project_id() {
        return Err(RepoError::ReferenceMismatch {
            expected: project.project_id(),
            actual: document.project_id,
        });
    }
    debug!(
        "event=document_write_checked module=repo status=ok id={} project_id={} project_etag={}",
        document.id,
        project.project_id(),
        project.etag()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{DocumentRepository, StoreDocumentRepository};
    use crate::integrity::reference_for_tests;
    use crate::model::document::Document;
    use crate::repo::RepoError;
    use crate::store::SqliteItemStore;
    use uuid::Uuid;

    #[tokio::test]
    async fn write_checked_against_other_project_is_refused() {
        let store = SqliteItemStore::open_in_memory().unwrap();
        let repo = StoreDocumentRepository::new(store.container("documents"));

        let document = Document::new(Uuid::new_v4(), "title", "body");
        let reference = reference_for_tests(Uuid::new_v4());

        let err = repo
            .create_document(&document, &reference)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::ReferenceMismatch { .. }));
        assert!(repo.get_document(document.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_assigns_id_when_nil() {
        let store = SqliteItemStore::open_in_memory().unwrap();
        let repo = StoreDocumentRepository::new(store.container("documents"));

        let project_id = Uuid::new_v4();
        let document = Document::with_id(Uuid::nil(), project_id, "title", "body");
        let created = repo
            .create_document(&document, &reference_for_tests(project_id))
            .await
            .unwrap();

        assert!(!created.id.is_nil());
        let loaded = repo.get_document(created.id).await.unwrap().unwrap();
        assert_eq!(loaded, created);
    }
}
