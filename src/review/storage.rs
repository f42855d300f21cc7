//! Progress store: scheduling rows and the due-set range query.
//!
//! A progress row is only meaningful while its owning item is live, so the
//! joined reads here treat rows whose item is retired as non-existent. A
//! row whose item is missing outright should never happen (items and
//! progress are created in one transaction); the due-set query skips and
//! logs such rows rather than failing.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::uuid_column;
use crate::error::Result;

use super::algorithm::Level;
use super::models::{DueItem, Progress, ReviewStats};

fn row_to_progress(row: &Row) -> rusqlite::Result<(Progress, i64)> {
    let rank: i64 = row.get(3)?;
    let progress = Progress {
        id: uuid_column(row, 0)?,
        tenant_id: uuid_column(row, 1)?,
        item_id: uuid_column(row, 2)?,
        // Silent here; the caller decides how to treat an out-of-range rank
        level: Level::checked_from_rank(rank).unwrap_or(Level::One),
        next_due_at: row.get(4)?,
        last_reviewed_at: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    };
    Ok((progress, rank))
}

/// Insert a fresh progress row.
pub fn insert(conn: &Connection, progress: &Progress) -> Result<()> {
    conn.execute(
        "INSERT INTO progress
             (id, tenant_id, item_id, level, next_due_at, last_reviewed_at,
              created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            progress.id.to_string(),
            progress.tenant_id.to_string(),
            progress.item_id.to_string(),
            progress.level.rank(),
            progress.next_due_at,
            progress.last_reviewed_at,
            progress.created_at,
            progress.updated_at,
        ],
    )?;
    Ok(())
}

/// Look up the progress row for (tenant, item), joined against its item so
/// that retired or missing items yield `None`. Returns the raw persisted
/// level rank alongside the row: an out-of-range rank must reschedule at
/// the shortest interval, so the engine needs to see it undisguised.
pub fn get_live(
    conn: &Connection,
    tenant_id: Uuid,
    item_id: Uuid,
) -> Result<Option<(Progress, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.tenant_id, p.item_id, p.level, p.next_due_at,
                p.last_reviewed_at, p.created_at, p.updated_at
         FROM progress p
         JOIN items i ON i.id = p.item_id AND i.tenant_id = p.tenant_id
         WHERE p.tenant_id = ?1 AND p.item_id = ?2 AND i.deleted_at IS NULL",
    )?;

    let mut rows = stmt.query_map(
        params![tenant_id.to_string(), item_id.to_string()],
        row_to_progress,
    )?;

    match rows.next() {
        Some(progress) => Ok(Some(progress?)),
        None => Ok(None),
    }
}

/// Persist the state produced by one recorded outcome.
pub fn update(conn: &Connection, progress: &Progress) -> Result<()> {
    conn.execute(
        "UPDATE progress
         SET level = ?1, next_due_at = ?2, last_reviewed_at = ?3, updated_at = ?4
         WHERE tenant_id = ?5 AND item_id = ?6",
        params![
            progress.level.rank(),
            progress.next_due_at,
            progress.last_reviewed_at,
            progress.updated_at,
            progress.tenant_id.to_string(),
            progress.item_id.to_string(),
        ],
    )?;
    Ok(())
}

/// The due set: every progress row with `next_due_at <= as_of` whose item is
/// live, oldest due first, less-mastered first on ties, capped at `limit`.
///
/// Read-only; the same call repeated with the same `as_of` and no writes in
/// between returns the same ordered rows.
pub fn due_set(
    conn: &Connection,
    tenant_id: Uuid,
    as_of: DateTime<Utc>,
    limit: usize,
) -> Result<Vec<DueItem>> {
    // Orphaned progress rows (missing item) are scanned separately below,
    // so they never consume a slot of the cap: the limit applies to live
    // rows only.
    let mut stmt = conn.prepare(
        "SELECT p.item_id, i.term, i.definition, p.level
         FROM progress p
         JOIN items i ON i.id = p.item_id AND i.tenant_id = p.tenant_id
         WHERE p.tenant_id = ?1 AND p.next_due_at <= ?2 AND i.deleted_at IS NULL
         ORDER BY p.next_due_at ASC, p.level ASC, p.item_id ASC
         LIMIT ?3",
    )?;

    let due = stmt
        .query_map(params![tenant_id.to_string(), as_of, limit as i64], |row| {
            Ok(DueItem {
                item_id: uuid_column(row, 0)?,
                term: row.get(1)?,
                definition: row.get(2)?,
                level: Level::from_rank(row.get(3)?),
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    // A due progress row without an item signals a failed bootstrap
    // upstream; log it, but never fail the query over it.
    let mut orphan_stmt = conn.prepare(
        "SELECT p.item_id
         FROM progress p
         LEFT JOIN items i ON i.id = p.item_id AND i.tenant_id = p.tenant_id
         WHERE p.tenant_id = ?1 AND p.next_due_at <= ?2 AND i.id IS NULL",
    )?;

    let orphans = orphan_stmt
        .query_map(params![tenant_id.to_string(), as_of], |row| {
            uuid_column(row, 0)
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    for item_id in orphans {
        log::warn!(
            "Skipping orphaned progress row for missing item {} (tenant {})",
            item_id,
            tenant_id
        );
    }

    Ok(due)
}

/// Per-level and due counts over a tenant's live items.
pub fn stats(conn: &Connection, tenant_id: Uuid, as_of: DateTime<Utc>) -> Result<ReviewStats> {
    let mut stmt = conn.prepare(
        "SELECT p.level, COUNT(*),
                SUM(CASE WHEN p.next_due_at <= ?2 THEN 1 ELSE 0 END)
         FROM progress p
         JOIN items i ON i.id = p.item_id AND i.tenant_id = p.tenant_id
         WHERE p.tenant_id = ?1 AND i.deleted_at IS NULL
         GROUP BY p.level",
    )?;

    let rows = stmt
        .query_map(
            params![tenant_id.to_string(), as_of],
            |row| -> rusqlite::Result<(i64, usize, usize)> {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            },
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut out = ReviewStats::default();
    for (rank, count, due) in rows {
        out.total_items += count;
        out.due_items += due;
        match Level::from_rank(rank) {
            Level::One => out.level_one += count,
            Level::Two => out.level_two += count,
            Level::Three => out.level_three += count,
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::items::{self, Item};

    fn seed_item(conn: &Connection, tenant: Uuid, term: &str, now: DateTime<Utc>) -> Item {
        let item = Item::new_at(tenant, term.to_string(), format!("def of {}", term), now);
        items::storage::insert(conn, &item).unwrap();
        let progress = Progress::seed(tenant, item.id, now);
        insert(conn, &progress).unwrap();
        item
    }

    #[test]
    fn test_get_live_requires_live_item() {
        let conn = open_in_memory().unwrap();
        let tenant = Uuid::new_v4();
        let now = Utc::now();
        let item = seed_item(&conn, tenant, "gato", now);

        assert!(get_live(&conn, tenant, item.id).unwrap().is_some());

        items::storage::retire(&conn, tenant, item.id, now).unwrap();
        assert!(get_live(&conn, tenant, item.id).unwrap().is_none());
    }

    #[test]
    fn test_due_set_order_and_cap() {
        let conn = open_in_memory().unwrap();
        let tenant = Uuid::new_v4();
        let now = Utc::now();

        // Three items due at staggered times, one far in the future
        for (i, term) in ["a", "b", "c"].iter().enumerate() {
            let item = Item::new_at(tenant, term.to_string(), "x".to_string(), now);
            items::storage::insert(&conn, &item).unwrap();
            let mut progress = Progress::seed(tenant, item.id, now);
            progress.next_due_at = now - chrono::Duration::hours(3 - i as i64);
            insert(&conn, &progress).unwrap();
        }
        seed_item(&conn, tenant, "later", now); // due tomorrow

        let due = due_set(&conn, tenant, now, 20).unwrap();
        let terms: Vec<&str> = due.iter().map(|d| d.term.as_str()).collect();
        assert_eq!(terms, vec!["a", "b", "c"]);

        let capped = due_set(&conn, tenant, now, 2).unwrap();
        assert_eq!(capped.len(), 2);
        assert_eq!(capped[0].term, "a");
    }

    #[test]
    fn test_due_set_ties_break_toward_lower_level() {
        let conn = open_in_memory().unwrap();
        let tenant = Uuid::new_v4();
        let now = Utc::now();
        let due_at = now - chrono::Duration::hours(1);

        let advanced = Item::new_at(tenant, "advanced".to_string(), "x".to_string(), now);
        items::storage::insert(&conn, &advanced).unwrap();
        let mut p = Progress::seed(tenant, advanced.id, now);
        p.level = Level::Three;
        p.next_due_at = due_at;
        insert(&conn, &p).unwrap();

        let fresh = Item::new_at(tenant, "fresh".to_string(), "x".to_string(), now);
        items::storage::insert(&conn, &fresh).unwrap();
        let mut p = Progress::seed(tenant, fresh.id, now);
        p.next_due_at = due_at;
        insert(&conn, &p).unwrap();

        let due = due_set(&conn, tenant, now, 20).unwrap();
        assert_eq!(due[0].term, "fresh");
        assert_eq!(due[1].term, "advanced");
    }

    #[test]
    fn test_due_set_skips_orphaned_progress() {
        let conn = open_in_memory().unwrap();
        let tenant = Uuid::new_v4();
        let now = Utc::now();
        seed_item(&conn, tenant, "gato", now);

        // Progress row pointing at an item that was never created
        let mut orphan = Progress::seed(tenant, Uuid::new_v4(), now);
        orphan.next_due_at = now - chrono::Duration::days(1);
        insert(&conn, &orphan).unwrap();

        let due = due_set(&conn, tenant, now + chrono::Duration::days(2), 20).unwrap();
        let terms: Vec<&str> = due.iter().map(|d| d.term.as_str()).collect();
        assert_eq!(terms, vec!["gato"]);
    }

    #[test]
    fn test_orphaned_progress_does_not_consume_cap_slots() {
        let conn = open_in_memory().unwrap();
        let tenant = Uuid::new_v4();
        let now = Utc::now();

        // Orphan due earlier than every live row
        let mut orphan = Progress::seed(tenant, Uuid::new_v4(), now);
        orphan.next_due_at = now - chrono::Duration::days(5);
        insert(&conn, &orphan).unwrap();

        seed_item(&conn, tenant, "a", now);
        seed_item(&conn, tenant, "b", now + chrono::Duration::hours(1));

        // Both live rows fit the cap of 2; the orphan takes no slot
        let due = due_set(&conn, tenant, now + chrono::Duration::days(2), 2).unwrap();
        assert_eq!(due.len(), 2);
        let terms: Vec<&str> = due.iter().map(|d| d.term.as_str()).collect();
        assert_eq!(terms, vec!["a", "b"]);
    }

    #[test]
    fn test_stats_counts_levels_and_due() {
        let conn = open_in_memory().unwrap();
        let tenant = Uuid::new_v4();
        let now = Utc::now();

        let a = seed_item(&conn, tenant, "a", now);
        seed_item(&conn, tenant, "b", now);
        let (mut p, _) = get_live(&conn, tenant, a.id).unwrap().unwrap();
        p.level = Level::Three;
        p.next_due_at = now - chrono::Duration::hours(1);
        update(&conn, &p).unwrap();

        let stats = stats(&conn, tenant, now).unwrap();
        assert_eq!(stats.total_items, 2);
        assert_eq!(stats.level_one, 1);
        assert_eq!(stats.level_three, 1);
        assert_eq!(stats.due_items, 1);
    }
}
