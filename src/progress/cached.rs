//! In-process cache in front of a progress store
//!
//! Reads are served from memory until the entry is older than the refresh
//! interval. Writes go to the backing store synchronously and then drop the
//! cached map, so the next read in this process sees exactly what was
//! persisted. Changes made by another process only become visible once the
//! interval has elapsed.

use std::sync::RwLock;
use std::time::{Duration, Instant};

use super::models::{ProgressMap, ProgressState, UserId};
use super::store::{ProgressStore, Result, StorageError};

/// Default refresh interval (10 seconds)
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

struct CachedEntry {
    progress: ProgressMap,
    loaded_at: Instant,
}

impl CachedEntry {
    fn is_stale(&self, refresh_interval: Option<Duration>) -> bool {
        refresh_interval.map_or(false, |interval| self.loaded_at.elapsed() >= interval)
    }
}

pub struct CachedStore<S> {
    inner: S,
    entry: RwLock<Option<CachedEntry>>,
    /// `None` keeps the cache until the next write
    refresh_interval: Option<Duration>,
}

impl<S: ProgressStore> CachedStore<S> {
    pub fn new(inner: S) -> Self {
        Self::with_refresh_interval(inner, Some(DEFAULT_REFRESH_INTERVAL))
    }

    pub fn with_refresh_interval(inner: S, refresh_interval: Option<Duration>) -> Self {
        Self {
            inner,
            entry: RwLock::new(None),
            refresh_interval,
        }
    }

    /// Drop the cached map; the next read goes to the backing store
    pub fn invalidate(&self) {
        if let Ok(mut entry) = self.entry.write() {
            *entry = None;
        }
    }

    fn cached(&self) -> Result<Option<ProgressMap>> {
        let entry = self.entry.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(entry
            .as_ref()
            .filter(|e| !e.is_stale(self.refresh_interval))
            .map(|e| e.progress.clone()))
    }
}

impl<S: ProgressStore> ProgressStore for CachedStore<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn load(&self) -> Result<ProgressMap> {
        if let Some(progress) = self.cached()? {
            return Ok(progress);
        }

        let mut entry = self.entry.write().map_err(|_| StorageError::LockPoisoned)?;
        // Another reader may have refreshed while we waited for the lock
        if let Some(current) = entry.as_ref().filter(|e| !e.is_stale(self.refresh_interval)) {
            return Ok(current.progress.clone());
        }

        log::debug!("Refreshing progress cache from {} store", self.inner.name());
        let progress = self.inner.load()?;
        *entry = Some(CachedEntry {
            progress: progress.clone(),
            loaded_at: Instant::now(),
        });
        Ok(progress)
    }

    fn save(&self, progress: &ProgressMap) -> Result<()> {
        let result = self.inner.save(progress);
        self.invalidate();
        result
    }

    fn update_user(
        &self,
        user: &UserId,
        apply: &mut dyn FnMut(&mut ProgressState),
    ) -> Result<ProgressState> {
        // The backing store reads fresh data, never the cached copy
        let result = self.inner.update_user(user, apply);
        self.invalidate();
        result
    }

    fn remove_user(&self, user: &UserId) -> Result<bool> {
        let result = self.inner.remove_user(user);
        self.invalidate();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Language, WordKey};
    use crate::progress::JsonFileStore;
    use tempfile::TempDir;

    fn word(english: &str) -> WordKey {
        WordKey::new(english, Language::French, 1)
    }

    fn cached_store(
        temp: &TempDir,
        interval: Option<Duration>,
    ) -> CachedStore<JsonFileStore> {
        CachedStore::with_refresh_interval(
            JsonFileStore::new(temp.path().join("progress.json")),
            interval,
        )
    }

    #[test]
    fn test_reads_within_interval_are_stale() {
        let temp = TempDir::new().unwrap();
        let cached = cached_store(&temp, Some(Duration::from_secs(3600)));
        assert!(cached.load().unwrap().is_empty());

        // Another process writes to the same file
        let other = JsonFileStore::new(temp.path().join("progress.json"));
        other.record(&UserId::new(), &word("apple"), true).unwrap();

        assert!(cached.load().unwrap().is_empty());

        cached.invalidate();
        assert_eq!(cached.load().unwrap().len(), 1);
    }

    #[test]
    fn test_refresh_after_interval() {
        let temp = TempDir::new().unwrap();
        let cached = cached_store(&temp, Some(Duration::from_millis(20)));
        assert!(cached.load().unwrap().is_empty());

        let other = JsonFileStore::new(temp.path().join("progress.json"));
        other.record(&UserId::new(), &word("apple"), true).unwrap();

        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(cached.load().unwrap().len(), 1);
    }

    #[test]
    fn test_own_writes_are_visible_immediately() {
        let temp = TempDir::new().unwrap();
        let cached = cached_store(&temp, Some(Duration::from_secs(3600)));
        let user = UserId::new();

        assert!(cached.load_user(&user).unwrap().is_none());
        cached.record(&user, &word("apple"), true).unwrap();

        let state = cached.load_user(&user).unwrap().unwrap();
        assert!(state.is_known(&word("apple")));
    }

    #[test]
    fn test_write_does_not_clobber_external_changes() {
        let temp = TempDir::new().unwrap();
        let cached = cached_store(&temp, None);
        let alice = UserId::new();
        let bob = UserId::new();

        assert!(cached.load().unwrap().is_empty());

        let other = JsonFileStore::new(temp.path().join("progress.json"));
        other.record(&alice, &word("apple"), true).unwrap();

        // Update goes through the backing store, not the stale cached map
        cached.record(&bob, &word("car"), false).unwrap();

        let progress = cached.load().unwrap();
        assert!(progress[&alice].is_known(&word("apple")));
        assert!(progress[&bob].unknown.contains(&word("car")));
    }

    #[test]
    fn test_concurrent_judgments_same_user() {
        let temp = TempDir::new().unwrap();
        let cached = cached_store(&temp, Some(DEFAULT_REFRESH_INTERVAL));
        let user = UserId::new();

        std::thread::scope(|scope| {
            scope.spawn(|| cached.record(&user, &word("apple"), true).unwrap());
            scope.spawn(|| cached.record(&user, &word("house"), false).unwrap());
        });

        let persisted = cached.inner.load_user(&user).unwrap().unwrap();
        assert!(persisted.is_known(&word("apple")));
        assert!(persisted.unknown.contains(&word("house")));
    }
}
