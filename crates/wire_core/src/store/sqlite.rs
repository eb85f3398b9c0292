//! SQLite-backed item store.
//!
//! # Responsibility
//! - Persist schemaless JSON items per named container in one `items` table.
//! - Evaluate `ItemFilter` server-side with JSON1 `json_extract`.
//!
//! # Invariants
//! - All containers of one store share a single connection.
//! - SQLite calls run on the blocking pool, never on a runtime worker.
//! - The connection lock is only taken inside those blocking tasks.

use super::{
    item_id, ETag, FilterValue, ItemContainer, ItemFilter, PartitionKey, ResponseStatus,
    StoreError, StoreResult, StoredItem,
};
use crate::db::{open_db, open_db_in_memory};
use async_trait::async_trait;
use log::debug;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::task;

/// Handle to one SQLite database holding every container.
#[derive(Clone)]
pub struct SqliteItemStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteItemStore {
    /// Opens (or creates) a database file and applies pending migrations.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::wrap(open_db(path)?))
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::wrap(open_db_in_memory()?))
    }

    /// Returns a handle to the named container. Containers need no setup.
    pub fn container(&self, name: &str) -> SqliteContainer {
        SqliteContainer {
            conn: Arc::clone(&self.conn),
            name: Arc::from(name),
        }
    }

    fn wrap(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }
}

/// Named container inside a [`SqliteItemStore`].
#[derive(Clone)]
pub struct SqliteContainer {
    conn: Arc<Mutex<Connection>>,
    name: Arc<str>,
}

impl SqliteContainer {
    /// Runs `op` on the blocking pool with the shared connection locked.
    async fn with_conn<T, F>(&self, op: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection, &str) -> StoreResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let name = Arc::clone(&self.name);
        task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|_| {
                StoreError::Unavailable(format!("connection lock poisoned for container `{name}`"))
            })?;
            op(&*conn, &*name)
        })
        .await
        .map_err(|err| StoreError::Unavailable(format!("store task aborted: {err}")))?
    }

    fn not_found(&self, id: &str) -> StoreError {
        StoreError::NotFound {
            container: self.name.to_string(),
            id: id.to_string(),
        }
    }
}

#[async_trait]
impl ItemContainer for SqliteContainer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn create_item(&self, item: &Value) -> StoreResult<StoredItem> {
        let id = item_id(item)?.to_string();
        let body = serde_json::to_string(item)?;
        let etag = ETag::generate();

        let changed = {
            let id = id.clone();
            let etag = etag.clone();
            self.with_conn(move |conn, container| {
                Ok(conn.execute(
                    "INSERT INTO items (container, partition_key, id, body, etag)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT (container, partition_key, id) DO NOTHING;",
                    params![container, id, id, body, etag.as_str()],
                )?)
            })
            .await?
        };

        if changed == 0 {
            return Err(StoreError::Conflict {
                container: self.name.to_string(),
                id,
            });
        }

        debug!(
            "event=item_create module=store status=ok container={} id={}",
            self.name, id
        );
        Ok(StoredItem {
            body: item.clone(),
            etag,
        })
    }

    async fn read_item(&self, id: &str, partition_key: &PartitionKey) -> StoreResult<StoredItem> {
        let key = partition_key.clone();
        let target = id.to_string();
        let row = self
            .with_conn(move |conn, container| {
                Ok(conn
                    .query_row(
                        "SELECT body, etag
                         FROM items
                         WHERE container = ?1 AND partition_key = ?2 AND id = ?3;",
                        params![container, key.as_str(), target],
                        |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
                    )
                    .optional()?)
            })
            .await?;

        match row {
            Some((body, etag)) => decode_row(&body, etag),
            None => Err(self.not_found(id)),
        }
    }

    async fn replace_item(
        &self,
        id: &str,
        partition_key: &PartitionKey,
        item: &Value,
    ) -> StoreResult<StoredItem> {
        let body_id = item_id(item)?;
        if body_id != id {
            return Err(StoreError::InvalidItem(format!(
                "item id `{body_id}` does not match target id `{id}`"
            )));
        }
        let body = serde_json::to_string(item)?;
        let etag = ETag::generate();

        let changed = {
            let key = partition_key.clone();
            let target = id.to_string();
            let etag = etag.clone();
            self.with_conn(move |conn, container| {
                Ok(conn.execute(
                    "UPDATE items
                     SET
                        body = ?4,
                        etag = ?5,
                        updated_at = (strftime('%s', 'now') * 1000)
                     WHERE container = ?1 AND partition_key = ?2 AND id = ?3;",
                    params![container, key.as_str(), target, body, etag.as_str()],
                )?)
            })
            .await?
        };

        if changed == 0 {
            return Err(self.not_found(id));
        }

        debug!(
            "event=item_replace module=store status=ok container={} id={}",
            self.name, id
        );
        Ok(StoredItem {
            body: item.clone(),
            etag,
        })
    }

    async fn delete_item(
        &self,
        id: &str,
        partition_key: &PartitionKey,
    ) -> StoreResult<ResponseStatus> {
        let key = partition_key.clone();
        let target = id.to_string();
        let changed = self
            .with_conn(move |conn, container| {
                Ok(conn.execute(
                    "DELETE FROM items
                     WHERE container = ?1 AND partition_key = ?2 AND id = ?3;",
                    params![container, key.as_str(), target],
                )?)
            })
            .await?;

        if changed == 0 {
            return Err(self.not_found(id));
        }

        debug!(
            "event=item_delete module=store status=ok container={} id={}",
            self.name, id
        );
        Ok(ResponseStatus::NoContent)
    }

    async fn query_items(&self, filter: Option<&ItemFilter>) -> StoreResult<Vec<StoredItem>> {
        let mut sql = String::from("SELECT body, etag FROM items WHERE container = ?1");
        let mut bind_values = vec![SqlValue::Text(self.name.to_string())];

        if let Some(filter) = filter {
            filter.validate()?;
            let ItemFilter::FieldEquals { field, value } = filter;
            // Field names are identifier-checked above, so inlining keeps the
            // expression index on `$.projectId` usable.
            sql.push_str(&format!(" AND json_extract(body, '$.{field}') = ?2"));
            bind_values.push(filter_value_to_sql(value));
        }

        sql.push_str(" ORDER BY created_at ASC, rowid ASC;");

        let rows = self
            .with_conn(move |conn, _container| {
                let mut stmt = conn.prepare(&sql)?;
                let mut rows = stmt.query(params_from_iter(bind_values))?;
                let mut raw = Vec::new();
                while let Some(row) = rows.next()? {
                    raw.push((row.get::<_, String>(0)?, row.get::<_, String>(1)?));
                }
                Ok(raw)
            })
            .await?;

        rows.into_iter()
            .map(|(body, etag)| decode_row(&body, etag))
            .collect()
    }
}

fn decode_row(body: &str, etag: String) -> StoreResult<StoredItem> {
    Ok(StoredItem {
        body: serde_json::from_str(body)?,
        etag: ETag::new(etag),
    })
}

fn filter_value_to_sql(value: &FilterValue) -> SqlValue {
    match value {
        FilterValue::Text(text) => SqlValue::Text(text.clone()),
        FilterValue::Integer(number) => SqlValue::Integer(*number),
        // json_extract yields 0/1 for JSON booleans.
        FilterValue::Bool(flag) => SqlValue::Integer(i64::from(*flag)),
    }
}
