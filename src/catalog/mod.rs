//! Word catalog for lingocards
//!
//! This module provides:
//! - Word, language and level models
//! - Loading the catalog from JSON (or the built-in seed list)
//! - Migration from the legacy single-language flashcard format

pub mod loader;
pub mod models;

pub use loader::{Catalog, CatalogError};
pub use models::*;
