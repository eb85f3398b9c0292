//! Core persistence and service layer for Wire.
//! Projects and documents live in a schemaless item store; documents may
//! only be written against a project that exists at write time.

pub mod config;
pub mod db;
pub mod generation;
pub mod integrity;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{ConfigError, GenerationSettings, LoggingSettings, Settings, StoreSettings};
pub use generation::{
    AzureOpenAiClient, ChatCompletionClient, ChatMessage, ChatRole, GenerationError,
};
pub use integrity::{project_exists, require_project, IntegrityError, ProjectReference};
pub use logging::{
    default_log_level, init_logging, init_logging_from, logging_status, LoggingError,
};
pub use model::document::{Document, DocumentId};
pub use model::project::{Project, ProjectId};
pub use model::{EntityKind, ModelValidationError};
pub use repo::document_repo::{DocumentRepository, StoreDocumentRepository};
pub use repo::project_repo::{ProjectRepository, StoreProjectRepository};
pub use repo::{RepoError, RepoResult, Versioned};
pub use service::document_service::DocumentService;
pub use service::generation_service::TextGenerationService;
pub use service::project_service::ProjectService;
pub use service::{ServiceError, ServiceResult};
pub use store::{
    ETag, FilterValue, ItemContainer, ItemFilter, PartitionKey, ResponseStatus, SqliteContainer,
    SqliteItemStore, StoreError, StoreResult, StoredItem,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
