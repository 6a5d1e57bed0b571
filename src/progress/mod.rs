//! Per-user progress for lingocards
//!
//! This module provides:
//! - Progress models (judged words, settings, session tokens)
//! - The `ProgressStore` contract
//! - JSON-file, cached and SQLite backends

pub mod cached;
pub mod json_store;
pub mod models;
pub mod sqlite_store;
pub mod store;

pub use cached::CachedStore;
pub use json_store::JsonFileStore;
pub use models::*;
pub use sqlite_store::SqliteStore;
pub use store::{ProgressStore, StorageError};
