//! Repository layer: typed adapters over item containers.
//!
//! # Responsibility
//! - Map projects/documents to and from schemaless store items.
//! - Classify store outcomes into typed results: a missing item is `Ok(None)`
//!   or `Ok(false)`, a failing store is `Err`.
//!
//! # Invariants
//! - Write paths validate entities before any store call.
//! - The partition key of every entity is its own id.
//! - Updates take the target id from the caller, never from the payload.

use crate::model::document::Document;
use crate::model::project::Project;
use crate::model::{EntityKind, ModelValidationError};
use crate::store::{
    ETag, ItemContainer, ItemFilter, PartitionKey, ResponseStatus, StoreError, StoredItem,
};
use log::{debug, error, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

pub mod document_repo;
pub mod project_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for project/document persistence.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Validation(#[from] ModelValidationError),
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: Uuid },
    #[error("invalid persisted {kind} data: {message}")]
    InvalidData { kind: EntityKind, message: String },
    #[error("document references project {actual} but was checked against project {expected}")]
    ReferenceMismatch { expected: Uuid, actual: Uuid },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Entity paired with the store version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub value: T,
    pub etag: ETag,
}

/// Records persisted one-per-partition in an item container.
pub(crate) trait StoredEntity: Serialize + DeserializeOwned + Clone + Send + Sync {
    const KIND: EntityKind;

    fn id(&self) -> Uuid;

    fn set_id(&mut self, id: Uuid);

    fn validate(&self) -> Result<(), ModelValidationError> {
        Ok(())
    }
}

impl StoredEntity for Project {
    const KIND: EntityKind = EntityKind::Project;

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn validate(&self) -> Result<(), ModelValidationError> {
        Project::validate(self)
    }
}

impl StoredEntity for Document {
    const KIND: EntityKind = EntityKind::Document;

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
}

/// Shared item plumbing behind the typed repositories.
#[derive(Clone)]
pub(crate) struct EntityContainer<C> {
    container: C,
}

impl<C: ItemContainer> EntityContainer<C> {
    pub(crate) fn new(container: C) -> Self {
        Self { container }
    }

    pub(crate) async fn read<T: StoredEntity>(&self, id: Uuid) -> RepoResult<Option<Versioned<T>>> {
        match self
            .container
            .read_item(&id.to_string(), &PartitionKey::from(id))
            .await
        {
            Ok(item) => Ok(Some(decode(item)?)),
            Err(err) if err.is_not_found() => {
                debug!(
                    "event={}_get module=repo status=not_found id={}",
                    T::KIND,
                    id
                );
                Ok(None)
            }
            Err(err) => {
                error!(
                    "event={}_get module=repo status=error id={} error={}",
                    T::KIND,
                    id,
                    err
                );
                Err(err.into())
            }
        }
    }

    pub(crate) async fn scan<T: StoredEntity>(
        &self,
        filter: Option<&ItemFilter>,
    ) -> RepoResult<Vec<T>> {
        let items = match self.container.query_items(filter).await {
            Ok(items) => items,
            Err(err) => {
                error!(
                    "event={}_list module=repo status=error container={} filtered={} error={}",
                    T::KIND,
                    self.container.name(),
                    filter.is_some(),
                    err
                );
                return Err(err.into());
            }
        };

        items
            .into_iter()
            .map(|item| decode::<T>(item).map(|versioned| versioned.value))
            .collect()
    }

    /// Persists a new entity, generating an id when the given one is nil.
    pub(crate) async fn insert<T: StoredEntity>(&self, entity: &T) -> RepoResult<T> {
        entity.validate()?;

        let mut record = entity.clone();
        if record.id().is_nil() {
            record.set_id(Uuid::new_v4());
        }
        let body = encode(&record)?;

        match self.container.create_item(&body).await {
            Ok(item) => {
                let stored: Versioned<T> = decode(item)?;
                info!(
                    "event={}_create module=repo status=ok id={}",
                    T::KIND,
                    stored.value.id()
                );
                Ok(stored.value)
            }
            Err(err) => {
                error!(
                    "event={}_create module=repo status=error id={} error={}",
                    T::KIND,
                    record.id(),
                    err
                );
                Err(err.into())
            }
        }
    }

    /// Fully replaces the entity stored under `id`.
    pub(crate) async fn replace<T: StoredEntity>(&self, id: Uuid, entity: &T) -> RepoResult<T> {
        entity.validate()?;

        let mut record = entity.clone();
        record.set_id(id);
        let body = encode(&record)?;

        match self
            .container
            .replace_item(&id.to_string(), &PartitionKey::from(id), &body)
            .await
        {
            Ok(item) => {
                let stored: Versioned<T> = decode(item)?;
                info!("event={}_update module=repo status=ok id={}", T::KIND, id);
                Ok(stored.value)
            }
            Err(err) if err.is_not_found() => {
                warn!(
                    "event={}_update module=repo status=not_found id={}",
                    T::KIND,
                    id
                );
                Err(RepoError::NotFound { kind: T::KIND, id })
            }
            Err(err) => {
                error!(
                    "event={}_update module=repo status=error id={} error={}",
                    T::KIND,
                    id,
                    err
                );
                Err(err.into())
            }
        }
    }

    /// Returns `Ok(true)` only when the store reports removed content.
    pub(crate) async fn delete(&self, kind: EntityKind, id: Uuid) -> RepoResult<bool> {
        match self
            .container
            .delete_item(&id.to_string(), &PartitionKey::from(id))
            .await
        {
            Ok(ResponseStatus::NoContent) => {
                info!("event={kind}_delete module=repo status=ok id={id}");
                Ok(true)
            }
            Ok(status) => {
                warn!(
                    "event={kind}_delete module=repo status=unexpected_response id={id} response={status:?}"
                );
                Ok(false)
            }
            Err(err) if err.is_not_found() => {
                debug!("event={kind}_delete module=repo status=not_found id={id}");
                Ok(false)
            }
            Err(err) => {
                error!("event={kind}_delete module=repo status=error id={id} error={err}");
                Err(err.into())
            }
        }
    }
}

fn encode<T: StoredEntity>(entity: &T) -> RepoResult<serde_json::Value> {
    serde_json::to_value(entity).map_err(|err| RepoError::Store(StoreError::Serialization(err)))
}

fn decode<T: StoredEntity>(item: StoredItem) -> RepoResult<Versioned<T>> {
    let value = serde_json::from_value(item.body).map_err(|err| {
        error!(
            "event={}_decode module=repo status=error error={}",
            T::KIND,
            err
        );
        RepoError::InvalidData {
            kind: T::KIND,
            message: err.to_string(),
        }
    })?;
    Ok(Versioned {
        value,
        etag: item.etag,
    })
}
