//! The scheduling engine: the crate's public boundary.
//!
//! Each operation runs in a single `rusqlite` transaction; an error at any
//! point rolls the whole unit of work back. The engine holds no state of
//! its own besides the connection and its configuration, so callers that
//! need cross-thread sharing wrap it in `Arc<Mutex<_>>`.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::db;
use crate::error::{EngineError, Result};
use crate::items::{self, Item, ItemUpdate};

use super::algorithm;
use super::models::{DueItem, Progress, ReviewStats};
use super::storage;

/// Spaced-repetition engine over a SQLite store.
pub struct ReviewEngine {
    conn: Connection,
    config: EngineConfig,
}

impl ReviewEngine {
    /// Wrap an already-opened connection. The schema must have been applied
    /// (see [`db::open`]).
    pub fn new(conn: Connection, config: EngineConfig) -> Self {
        Self { conn, config }
    }

    /// Open (or create) the database at `db_path` and build an engine on it.
    pub fn open(db_path: &Path, config: EngineConfig) -> Result<Self> {
        Ok(Self::new(db::open(db_path)?, config))
    }

    /// Engine over an in-memory database. Used by tests and ephemeral callers.
    pub fn open_in_memory(config: EngineConfig) -> Result<Self> {
        Ok(Self::new(db::open_in_memory()?, config))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ==================== Item Operations ====================

    /// Create a vocabulary item together with its initial Level One
    /// progress row (due one day out), in one transaction. The item and its
    /// progress never exist without each other.
    pub fn create_item(&mut self, tenant_id: Uuid, term: &str, definition: &str) -> Result<Item> {
        self.create_item_at(tenant_id, term, definition, Utc::now())
    }

    pub fn create_item_at(
        &mut self,
        tenant_id: Uuid,
        term: &str,
        definition: &str,
        now: DateTime<Utc>,
    ) -> Result<Item> {
        let term = non_empty(term, "term")?;
        let definition = non_empty(definition, "definition")?;

        let tx = self.conn.transaction()?;

        if items::storage::term_exists(&tx, tenant_id, term, None)? {
            return Err(EngineError::Conflict(term.to_string()));
        }

        let item = Item::new_at(tenant_id, term.to_string(), definition.to_string(), now);
        items::storage::insert(&tx, &item)?;

        let progress = Progress::seed(tenant_id, item.id, now);
        storage::insert(&tx, &progress)?;

        tx.commit()?;
        Ok(item)
    }

    /// Point lookup of a live item.
    pub fn get_item(&self, tenant_id: Uuid, item_id: Uuid) -> Result<Item> {
        items::storage::get(&self.conn, tenant_id, item_id)?
            .ok_or(EngineError::NotFound(item_id))
    }

    /// List a tenant's live items, newest first.
    pub fn list_items(&self, tenant_id: Uuid) -> Result<Vec<Item>> {
        items::storage::list(&self.conn, tenant_id)
    }

    /// Edit term and/or definition. A term change re-checks per-tenant
    /// uniqueness inside the same transaction as the write.
    pub fn update_item(
        &mut self,
        tenant_id: Uuid,
        item_id: Uuid,
        update: ItemUpdate,
    ) -> Result<Item> {
        self.update_item_at(tenant_id, item_id, update, Utc::now())
    }

    pub fn update_item_at(
        &mut self,
        tenant_id: Uuid,
        item_id: Uuid,
        update: ItemUpdate,
        now: DateTime<Utc>,
    ) -> Result<Item> {
        let new_term = match update.term.as_deref() {
            Some(term) => Some(non_empty(term, "term")?.to_string()),
            None => None,
        };
        let new_definition = match update.definition.as_deref() {
            Some(definition) => Some(non_empty(definition, "definition")?.to_string()),
            None => None,
        };

        let tx = self.conn.transaction()?;

        let mut item = items::storage::get(&tx, tenant_id, item_id)?
            .ok_or(EngineError::NotFound(item_id))?;

        if let Some(term) = new_term {
            if term != item.term
                && items::storage::term_exists(&tx, tenant_id, &term, Some(item_id))?
            {
                return Err(EngineError::Conflict(term));
            }
            item.term = term;
        }
        if let Some(definition) = new_definition {
            item.definition = definition;
        }
        item.updated_at = now;

        if !items::storage::update(&tx, &item)? {
            // Retired between the read and the write
            return Err(EngineError::NotFound(item_id));
        }

        tx.commit()?;
        Ok(item)
    }

    /// Retire an item (soft delete). Its progress row stays in place but is
    /// invisible to every read from here on.
    pub fn delete_item(&mut self, tenant_id: Uuid, item_id: Uuid) -> Result<()> {
        self.delete_item_at(tenant_id, item_id, Utc::now())
    }

    pub fn delete_item_at(
        &mut self,
        tenant_id: Uuid,
        item_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let tx = self.conn.transaction()?;

        if !items::storage::retire(&tx, tenant_id, item_id, now)? {
            return Err(EngineError::NotFound(item_id));
        }

        tx.commit()?;
        Ok(())
    }

    // ==================== Review Operations ====================

    /// The due set as of `as_of`: oldest due first, less-mastered first on
    /// ties, capped at the configured review limit. Read-only.
    pub fn due_items(&self, tenant_id: Uuid, as_of: DateTime<Utc>) -> Result<Vec<DueItem>> {
        storage::due_set(&self.conn, tenant_id, as_of, self.config.review_limit)
    }

    /// Record one review outcome and reschedule the item. Returns the
    /// updated progress.
    ///
    /// Progress rows are created eagerly with their item, so a missing row
    /// means the item is gone or retired: `NotFound`, nothing created.
    pub fn record_outcome(
        &mut self,
        tenant_id: Uuid,
        item_id: Uuid,
        correct: bool,
    ) -> Result<Progress> {
        self.record_outcome_at(tenant_id, item_id, correct, Utc::now())
    }

    pub fn record_outcome_at(
        &mut self,
        tenant_id: Uuid,
        item_id: Uuid,
        correct: bool,
        now: DateTime<Utc>,
    ) -> Result<Progress> {
        let tx = self.conn.transaction()?;

        let (mut progress, rank) = storage::get_live(&tx, tenant_id, item_id)?
            .ok_or(EngineError::NotFound(item_id))?;

        // The raw rank drives the transition: a corrupted level must land
        // at (One, 1 day) even on a correct answer
        let transition = algorithm::next_from_rank(rank, correct);
        progress.level = transition.level;
        progress.next_due_at = transition.due_at(now);
        progress.last_reviewed_at = Some(now);
        progress.updated_at = now;

        storage::update(&tx, &progress)?;

        tx.commit()?;
        Ok(progress)
    }

    /// Aggregate counts for a tenant's collection. Read-only.
    pub fn review_stats(&self, tenant_id: Uuid, as_of: DateTime<Utc>) -> Result<ReviewStats> {
        storage::stats(&self.conn, tenant_id, as_of)
    }
}

fn non_empty<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(trimmed)
}
