//! Schemaless item store contracts.
//!
//! # Responsibility
//! - Describe the remote document store the repositories talk to: named
//!   containers of JSON items addressed by id and partition key.
//! - Classify store failures so adapters can tell "not found" apart from
//!   real failures.
//!
//! # Invariants
//! - Every item is a JSON object with a non-empty string `id`.
//! - The partition key of an item is its own `id`.
//! - Every successful write produces a new `ETag`.

use crate::db::DbError;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::fmt::{Display, Formatter};
use thiserror::Error;

mod sqlite;

pub use sqlite::{SqliteContainer, SqliteItemStore};

static FIELD_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid field name regex"));

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure classes surfaced by item containers.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("item `{id}` not found in container `{container}`")]
    NotFound { container: String, id: String },
    #[error("item `{id}` already exists in container `{container}`")]
    Conflict { container: String, id: String },
    #[error("invalid item: {0}")]
    InvalidItem(String),
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error("item serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Returns whether this error only reports a missing item.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Key the store uses to locate an item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartitionKey(String);

impl PartitionKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PartitionKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<uuid::Uuid> for PartitionKey {
    fn from(value: uuid::Uuid) -> Self {
        Self::new(value.to_string())
    }
}

impl Display for PartitionKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque version marker issued on every write.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ETag(String);

impl ETag {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub(crate) fn generate() -> Self {
        Self(format!("\"{}\"", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ETag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Item body as persisted, plus its current version.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredItem {
    pub body: Value,
    pub etag: ETag,
}

/// Status reported by mutating calls that return no body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Ok,
    NoContent,
}

/// Scalar accepted by [`ItemFilter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Bool(bool),
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Server-side predicate for `query_items`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemFilter {
    /// Top-level field equals the given scalar.
    FieldEquals { field: String, value: FilterValue },
}

impl ItemFilter {
    pub fn field_equals(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::FieldEquals {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Rejects field names that are not plain identifiers.
    pub fn validate(&self) -> StoreResult<()> {
        match self {
            Self::FieldEquals { field, .. } if !FIELD_NAME_RE.is_match(field) => Err(
                StoreError::InvalidQuery(format!("unsupported field name `{field}`")),
            ),
            Self::FieldEquals { .. } => Ok(()),
        }
    }
}

/// One named collection of items in the document store.
///
/// Implementations are shared handles; every call is one round trip with no
/// in-process state kept between calls.
#[async_trait]
pub trait ItemContainer: Send + Sync {
    /// Container name, used for diagnostics.
    fn name(&self) -> &str;

    /// Inserts a new item. Fails with `Conflict` when the id is taken.
    async fn create_item(&self, item: &Value) -> StoreResult<StoredItem>;

    /// Point read. Fails with `NotFound` when absent.
    async fn read_item(&self, id: &str, partition_key: &PartitionKey) -> StoreResult<StoredItem>;

    /// Replaces the whole item. Fails with `NotFound` when absent.
    async fn replace_item(
        &self,
        id: &str,
        partition_key: &PartitionKey,
        item: &Value,
    ) -> StoreResult<StoredItem>;

    /// Removes an item. Fails with `NotFound` when absent.
    async fn delete_item(&self, id: &str, partition_key: &PartitionKey)
        -> StoreResult<ResponseStatus>;

    /// Scans the container, optionally filtered server-side.
    async fn query_items(&self, filter: Option<&ItemFilter>) -> StoreResult<Vec<StoredItem>>;
}

/// Extracts the `id` of an item body.
pub(crate) fn item_id(item: &Value) -> StoreResult<&str> {
    let object = item
        .as_object()
        .ok_or_else(|| StoreError::InvalidItem("item must be a JSON object".to_string()))?;
    match object.get("id").and_then(Value::as_str) {
        Some(id) if !id.trim().is_empty() => Ok(id),
        Some(_) => Err(StoreError::InvalidItem("item `id` must not be empty".to_string())),
        None => Err(StoreError::InvalidItem(
            "item must carry a string `id`".to_string(),
        )),
    }
}
