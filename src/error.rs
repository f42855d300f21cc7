//! Error taxonomy for the scheduling engine.
//!
//! The four variants are the stable surface a transport layer maps onto
//! status codes; anything unexpected from the store folds into `Store`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum EngineError {
    /// The item (or its progress) does not exist for this tenant, or has
    /// been retired.
    #[error("Item not found: {0}")]
    NotFound(Uuid),

    /// Another non-retired item of the same tenant already uses this term.
    #[error("Duplicate term for tenant: {0}")]
    Conflict(String),

    /// A required field was empty or otherwise unusable.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// SQLite failure (connection, statement, or transaction).
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// Could not determine a platform data directory for the default DB path.
    #[error("Cannot determine data directory")]
    DataDirNotFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
