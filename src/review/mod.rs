//! Spaced repetition scheduling
//!
//! This module provides:
//! - The three-level state machine and transition function
//! - Progress tracking per (tenant, item)
//! - The due-set query and review statistics
//! - [`ReviewEngine`], the transactional public boundary

pub mod algorithm;
pub mod engine;
pub mod models;
pub mod storage;

pub use algorithm::{Level, Transition};
pub use engine::ReviewEngine;
pub use models::{DueItem, Progress, ReviewStats};
