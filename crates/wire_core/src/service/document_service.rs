//! Document use-case service.
//!
//! # Responsibility
//! - Gate every document create/update on the referenced project existing.
//! - Report documents whose project no longer resolves.
//!
//! # Invariants
//! - A refused write never reaches the document container.
//! - `update_document` checks the payload's (possibly new) `project_id`.

use super::ServiceResult;
use crate::integrity::{project_exists, require_project};
use crate::model::document::{Document, DocumentId};
use crate::model::project::ProjectId;
use crate::repo::document_repo::DocumentRepository;
use crate::repo::project_repo::ProjectRepository;
use log::info;
use std::collections::HashMap;

/// Document service over a document repository and the project lookup it
/// depends on.
pub struct DocumentService<D: DocumentRepository, P: ProjectRepository> {
    documents: D,
    projects: P,
}

impl<D: DocumentRepository, P: ProjectRepository> DocumentService<D, P> {
    pub fn new(documents: D, projects: P) -> Self {
        Self {
            documents,
            projects,
        }
    }

    pub async fn list_documents(&self) -> ServiceResult<Vec<Document>> {
        Ok(self.documents.list_documents().await?)
    }

    /// Returns `Ok(None)` when the document does not exist.
    pub async fn get_document(&self, id: DocumentId) -> ServiceResult<Option<Document>> {
        Ok(self.documents.get_document(id).await?)
    }

    /// Empty when the project has no documents or does not exist.
    pub async fn list_documents_by_project(
        &self,
        project_id: ProjectId,
    ) -> ServiceResult<Vec<Document>> {
        Ok(self.documents.list_documents_by_project(project_id).await?)
    }

    /// Creates a document once its project resolves.
    ///
    /// Returns `ServiceError::IntegrityRejected` when it does not.
    pub async fn create_document(&self, document: &Document) -> ServiceResult<Document> {
        let reference = require_project(&self.projects, document.project_id).await?;
        Ok(self.documents.create_document(document, &reference).await?)
    }

    /// Replaces the document under `id` once the payload's project resolves.
    ///
    /// The integrity check runs before the target lookup, so a missing
    /// project is reported even when `id` is unknown too.
    pub async fn update_document(
        &self,
        id: DocumentId,
        document: &Document,
    ) -> ServiceResult<Document> {
        let reference = require_project(&self.projects, document.project_id).await?;
        Ok(self
            .documents
            .update_document(id, document, &reference)
            .await?)
    }

    /// Returns `Ok(false)` when the document was already absent.
    pub async fn delete_document(&self, id: DocumentId) -> ServiceResult<bool> {
        Ok(self.documents.remove_document(id).await?)
    }

    /// Lists documents whose `project_id` no longer resolves.
    ///
    /// Read-only report; each distinct project is looked up once.
    pub async fn find_dangling_documents(&self) -> ServiceResult<Vec<Document>> {
        let documents = self.documents.list_documents().await?;
        let mut resolved: HashMap<ProjectId, bool> = HashMap::new();
        let mut dangling = Vec::new();

        for document in documents {
            let exists = match resolved.get(&document.project_id) {
                Some(exists) => *exists,
                None => {
                    let exists = project_exists(&self.projects, document.project_id).await?;
                    resolved.insert(document.project_id, exists);
                    exists
                }
            };
            if !exists {
                dangling.push(document);
            }
        }

        info!(
            "event=dangling_report module=service status=ok checked_projects={} dangling={}",
            resolved.len(),
            dangling.len()
        );
        Ok(dangling)
    }
}
