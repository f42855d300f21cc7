//! lexis — multi-tenant spaced-repetition scheduling engine for vocabulary
//! learning.
//!
//! Vocabulary items and their scheduling state live in a SQLite store;
//! [`ReviewEngine`] is the boundary a transport layer talks to. Every
//! mutating operation runs in a single transaction, and an item and its
//! progress row are created, updated, and retired together.

pub mod config;
pub mod db;
pub mod error;
pub mod items;
pub mod review;

pub use config::{default_db_path, EngineConfig};
pub use error::{EngineError, Result};
pub use items::{Item, ItemUpdate};
pub use review::{DueItem, Level, Progress, ReviewEngine, ReviewStats};
