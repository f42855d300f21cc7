//! Vocabulary item store
//!
//! Items are tenant-owned term/definition pairs. Deletion is a soft delete;
//! the storage layer guarantees retired rows are invisible to every read.

pub mod models;
pub mod storage;

pub use models::{Item, ItemUpdate};
