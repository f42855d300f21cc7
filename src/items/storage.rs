//! Item store: tenant-scoped reads and writes over the `items` table.
//!
//! Retirement is a soft delete. Every read in this module filters
//! `deleted_at IS NULL`, so a retired item is invisible to all callers
//! without each call site having to remember the filter.
//!
//! Functions take a plain [`Connection`] reference; a `rusqlite`
//! `Transaction` derefs to one, so the engine composes these inside a
//! single atomic unit of work.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::uuid_column;
use crate::error::Result;

use super::models::Item;

fn row_to_item(row: &Row) -> rusqlite::Result<Item> {
    Ok(Item {
        id: uuid_column(row, 0)?,
        tenant_id: uuid_column(row, 1)?,
        term: row.get(2)?,
        definition: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

/// Insert a new item row.
pub fn insert(conn: &Connection, item: &Item) -> Result<()> {
    conn.execute(
        "INSERT INTO items (id, tenant_id, term, definition, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            item.id.to_string(),
            item.tenant_id.to_string(),
            item.term,
            item.definition,
            item.created_at,
            item.updated_at,
        ],
    )?;
    Ok(())
}

/// Point lookup of a live (non-retired) item.
pub fn get(conn: &Connection, tenant_id: Uuid, item_id: Uuid) -> Result<Option<Item>> {
    let mut stmt = conn.prepare(
        "SELECT id, tenant_id, term, definition, created_at, updated_at
         FROM items
         WHERE tenant_id = ?1 AND id = ?2 AND deleted_at IS NULL",
    )?;

    let mut rows = stmt.query_map(
        params![tenant_id.to_string(), item_id.to_string()],
        row_to_item,
    )?;

    match rows.next() {
        Some(item) => Ok(Some(item?)),
        None => Ok(None),
    }
}

/// List a tenant's live items, newest first.
pub fn list(conn: &Connection, tenant_id: Uuid) -> Result<Vec<Item>> {
    let mut stmt = conn.prepare(
        "SELECT id, tenant_id, term, definition, created_at, updated_at
         FROM items
         WHERE tenant_id = ?1 AND deleted_at IS NULL
         ORDER BY created_at DESC, id ASC",
    )?;

    let items = stmt
        .query_map(params![tenant_id.to_string()], row_to_item)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(items)
}

/// Check whether a tenant already uses this term on a live item, optionally
/// excluding one item (the row being edited).
pub fn term_exists(
    conn: &Connection,
    tenant_id: Uuid,
    term: &str,
    exclude: Option<Uuid>,
) -> Result<bool> {
    let count: i64 = match exclude {
        Some(item_id) => conn.query_row(
            "SELECT COUNT(*) FROM items
             WHERE tenant_id = ?1 AND term = ?2 AND deleted_at IS NULL AND id != ?3",
            params![tenant_id.to_string(), term, item_id.to_string()],
            |row| row.get(0),
        )?,
        None => conn.query_row(
            "SELECT COUNT(*) FROM items
             WHERE tenant_id = ?1 AND term = ?2 AND deleted_at IS NULL",
            params![tenant_id.to_string(), term],
            |row| row.get(0),
        )?,
    };

    Ok(count > 0)
}

/// Persist edited term/definition. Returns false if the item is missing or
/// retired.
pub fn update(conn: &Connection, item: &Item) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE items SET term = ?1, definition = ?2, updated_at = ?3
         WHERE tenant_id = ?4 AND id = ?5 AND deleted_at IS NULL",
        params![
            item.term,
            item.definition,
            item.updated_at,
            item.tenant_id.to_string(),
            item.id.to_string(),
        ],
    )?;

    Ok(changed > 0)
}

/// Soft-delete an item by stamping `deleted_at`. Returns false if the item
/// is missing or already retired.
pub fn retire(
    conn: &Connection,
    tenant_id: Uuid,
    item_id: Uuid,
    now: DateTime<Utc>,
) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE items SET deleted_at = ?1, updated_at = ?1
         WHERE tenant_id = ?2 AND id = ?3 AND deleted_at IS NULL",
        params![now, tenant_id.to_string(), item_id.to_string()],
    )?;

    Ok(changed > 0)
}
