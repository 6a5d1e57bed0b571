//! The progress store contract shared by every backend

use thiserror::Error;

use super::models::{ProgressMap, ProgressState, UserId};
use crate::catalog::WordKey;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Durable mapping from user to progress.
///
/// `update_user` is the only read-modify-write entry point and must be atomic
/// with respect to every other call on the same store.
pub trait ProgressStore: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &str;

    /// Read every user's progress. Missing storage is an empty map.
    fn load(&self) -> Result<ProgressMap>;

    /// Replace the stored mapping.
    fn save(&self, progress: &ProgressMap) -> Result<()>;

    fn load_user(&self, user: &UserId) -> Result<Option<ProgressState>> {
        Ok(self.load()?.remove(user))
    }

    /// Apply `apply` to the user's state (created if absent) and persist it.
    fn update_user(
        &self,
        user: &UserId,
        apply: &mut dyn FnMut(&mut ProgressState),
    ) -> Result<ProgressState>;

    /// Delete a user's record. Returns false if there was none.
    fn remove_user(&self, user: &UserId) -> Result<bool>;

    fn record(&self, user: &UserId, word: &WordKey, known: bool) -> Result<()> {
        self.update_user(user, &mut |state| state.record(word.clone(), known))?;
        Ok(())
    }
}
