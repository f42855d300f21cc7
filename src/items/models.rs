//! Data models for vocabulary items

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A vocabulary entry owned by exactly one tenant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub term: String,
    pub definition: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    pub fn new(tenant_id: Uuid, term: String, definition: String) -> Self {
        let now = Utc::now();
        Self::new_at(tenant_id, term, definition, now)
    }

    pub fn new_at(
        tenant_id: Uuid,
        term: String,
        definition: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            term,
            definition,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for an item; `None` fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemUpdate {
    pub term: Option<String>,
    pub definition: Option<String>,
}
