//! Connection setup and schema bootstrap.

use std::path::Path;

use rusqlite::{Connection, Row};
use uuid::Uuid;

use crate::error::Result;

/// Open (or create) the engine database at the given path and ensure the
/// schema exists.
pub fn open(db_path: &Path) -> Result<Connection> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(db_path)?;
    init_schema(&conn)?;
    Ok(conn)
}

/// Open an in-memory database with the schema applied. Used by tests and
/// ephemeral callers.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA foreign_keys = ON;

        -- Vocabulary items, one row per (tenant, term/definition pair).
        -- Retirement is a soft delete: deleted_at is stamped and the row kept.
        CREATE TABLE IF NOT EXISTS items (
            id TEXT PRIMARY KEY,
            tenant_id TEXT NOT NULL,
            term TEXT NOT NULL,
            definition TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            deleted_at TEXT
        );

        -- Scheduling state, exactly one live row per (tenant, item).
        CREATE TABLE IF NOT EXISTS progress (
            id TEXT PRIMARY KEY,
            tenant_id TEXT NOT NULL,
            item_id TEXT NOT NULL,
            level INTEGER NOT NULL,
            next_due_at TEXT NOT NULL,
            last_reviewed_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (tenant_id, item_id)
        );

        -- Term uniqueness holds per tenant among non-retired items only
        CREATE UNIQUE INDEX IF NOT EXISTS idx_items_tenant_term
            ON items(tenant_id, term) WHERE deleted_at IS NULL;
        CREATE INDEX IF NOT EXISTS idx_items_tenant ON items(tenant_id);
        CREATE INDEX IF NOT EXISTS idx_progress_tenant_due
            ON progress(tenant_id, next_due_at);
        "#,
    )?;
    Ok(())
}

/// Read a TEXT column holding a UUID. IDs are stored as strings for easy
/// inspection with the sqlite3 shell.
pub(crate) fn uuid_column(row: &Row, idx: usize) -> rusqlite::Result<Uuid> {
    let s: String = row.get(idx)?;
    Uuid::parse_str(&s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
