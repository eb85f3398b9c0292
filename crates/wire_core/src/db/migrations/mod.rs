//! Schema history for the item store.
//!
//! # Responsibility
//! - List the `items` table schema steps in the order they were introduced.
//! - Bring an opened database up to the newest step in one transaction.
//!
//! # Invariants
//! - Step versions strictly increase and are never renumbered.
//! - The newest applied step is recorded in `PRAGMA user_version`.
//! - A database written by a newer binary is refused, not downgraded.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "items",
        sql: include_str!("0001_items.sql"),
    },
    SchemaStep {
        version: 2,
        name: "items_project_index",
        sql: include_str!("0002_items_project_index.sql"),
    },
];

/// Newest schema version this binary can read and write.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Applies every step newer than the database's recorded version.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let recorded: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let latest = latest_version();

    if recorded > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: recorded,
            latest_supported: latest,
        });
    }

    let pending: Vec<&SchemaStep> = SCHEMA_STEPS
        .iter()
        .filter(|step| step.version > recorded)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in &pending {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
    }
    tx.commit()?;

    for step in pending {
        info!(
            "event=db_migrate module=db status=ok version={} name={}",
            step.version, step.name
        );
    }
    Ok(())
}
