//! Data models for the scheduling state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::algorithm::{self, Level};

/// Scheduling state of one item for its owning tenant.
///
/// Logically keyed by the unique (tenant_id, item_id) pair; `id` exists so
/// rows have a stable identity of their own.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub item_id: Uuid,
    pub level: Level,
    pub next_due_at: DateTime<Utc>,
    /// Set only after at least one outcome has been recorded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Progress {
    /// Fresh Level One state for a newly created item, due one day out.
    pub fn seed(tenant_id: Uuid, item_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            item_id,
            level: Level::One,
            next_due_at: algorithm::initial_due(now),
            last_reviewed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the item is due at the given instant
    pub fn is_due(&self, as_of: DateTime<Utc>) -> bool {
        self.next_due_at <= as_of
    }
}

/// One row of the due set, ready for a review prompt
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueItem {
    pub item_id: Uuid,
    pub term: String,
    pub definition: String,
    pub level: Level,
}

/// Aggregate counts for a tenant's collection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub total_items: usize,
    pub level_one: usize,
    pub level_two: usize,
    pub level_three: usize,
    pub due_items: usize,
}
