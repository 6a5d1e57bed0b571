//! Progress stored as a single JSON document
//!
//! ```json
//! {
//!   "<user-id>": { "known": [...], "unknown": [...], "settings": {...}, ... }
//! }
//! ```
//!
//! The whole file is read and rewritten on every change. Processes sharing the
//! file do not coordinate; the last `save` wins. A malformed file reads as
//! empty, and the first write renames it to `<name>.corrupt-<timestamp>`
//! before writing the new document.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;

use super::models::{ProgressMap, ProgressState, UserId};
use super::store::{ProgressStore, Result, StorageError};

pub struct JsonFileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse the file; `None` if it exists but is not valid progress JSON
    fn parse(&self) -> Result<Option<ProgressMap>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Some(ProgressMap::new())),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(Some(ProgressMap::new()));
        }

        match serde_json::from_str(&content) {
            Ok(progress) => Ok(Some(progress)),
            Err(e) => {
                log::warn!(
                    "Malformed progress file {:?}, treating as empty: {}",
                    self.path,
                    e
                );
                Ok(None)
            }
        }
    }

    fn read(&self) -> Result<ProgressMap> {
        Ok(self.parse()?.unwrap_or_default())
    }

    /// Read before a write; a malformed file is moved aside so it is not overwritten
    fn read_for_write(&self) -> Result<ProgressMap> {
        match self.parse()? {
            Some(progress) => Ok(progress),
            None => {
                self.quarantine()?;
                Ok(ProgressMap::new())
            }
        }
    }

    fn quarantine(&self) -> Result<PathBuf> {
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%.3fZ");
        let mut name = self.path.clone().into_os_string();
        name.push(format!(".corrupt-{}", stamp));
        let backup = PathBuf::from(name);

        fs::rename(&self.path, &backup)?;
        log::warn!("Moved malformed progress file {:?} to {:?}", self.path, backup);
        Ok(backup)
    }

    /// Atomic write (write to .tmp then rename)
    fn write(&self, progress: &ProgressMap) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp_path = self.path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(progress)?;
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl ProgressStore for JsonFileStore {
    fn name(&self) -> &str {
        "json"
    }

    fn load(&self) -> Result<ProgressMap> {
        self.read()
    }

    fn save(&self, progress: &ProgressMap) -> Result<()> {
        let _guard = self.write_lock.lock().map_err(|_| StorageError::LockPoisoned)?;
        self.read_for_write()?;
        self.write(progress)
    }

    fn update_user(
        &self,
        user: &UserId,
        apply: &mut dyn FnMut(&mut ProgressState),
    ) -> Result<ProgressState> {
        let _guard = self.write_lock.lock().map_err(|_| StorageError::LockPoisoned)?;

        let mut progress = self.read_for_write()?;
        let state = progress.entry(*user).or_insert_with(ProgressState::new);
        apply(state);
        let updated = state.clone();

        self.write(&progress)?;
        Ok(updated)
    }

    fn remove_user(&self, user: &UserId) -> Result<bool> {
        let _guard = self.write_lock.lock().map_err(|_| StorageError::LockPoisoned)?;

        let mut progress = self.read_for_write()?;
        if progress.remove(user).is_none() {
            return Ok(false);
        }
        self.write(&progress)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Language, WordKey};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn create_test_store() -> (JsonFileStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("progress.json"));
        (store, temp_dir)
    }

    fn word(english: &str) -> WordKey {
        WordKey::new(english, Language::French, 1)
    }

    #[test]
    fn test_missing_file_is_empty() {
        let (store, _temp) = create_test_store();
        assert!(store.load().unwrap().is_empty());
        assert!(store.load_user(&UserId::new()).unwrap().is_none());
    }

    #[test]
    fn test_malformed_file_is_empty() {
        let (store, _temp) = create_test_store();
        fs::write(store.path(), "{ not json").unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_file_is_kept_aside_on_write() {
        let (store, temp) = create_test_store();
        let original = "{\"x\": ";
        fs::write(store.path(), original).unwrap();

        let user = UserId::new();
        store.record(&user, &word("apple"), true).unwrap();

        let backups: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .map_or(false, |n| n.starts_with("progress.json.corrupt-"))
            })
            .collect();
        assert_eq!(backups.len(), 1);
        assert_eq!(fs::read_to_string(&backups[0]).unwrap(), original);

        let progress = store.load().unwrap();
        assert_eq!(progress.len(), 1);
        assert!(progress[&user].is_known(&word("apple")));
    }

    #[test]
    fn test_unreadable_path_is_an_error() {
        let temp = TempDir::new().unwrap();
        // A directory where the file should be
        let store = JsonFileStore::new(temp.path().to_path_buf());
        assert!(matches!(store.load(), Err(StorageError::Io(_))));
    }

    #[test]
    fn test_record_and_load_user() {
        let (store, _temp) = create_test_store();
        let user = UserId::new();

        store.record(&user, &word("apple"), true).unwrap();
        store.record(&user, &word("car"), false).unwrap();

        let state = store.load_user(&user).unwrap().unwrap();
        assert!(state.is_known(&word("apple")));
        assert!(state.unknown.contains(&word("car")));
    }

    #[test]
    fn test_save_load_roundtrip_is_byte_stable() {
        let (store, _temp) = create_test_store();
        for english in ["apple", "house", "car"] {
            store.record(&UserId::new(), &word(english), true).unwrap();
        }
        let before = fs::read(store.path()).unwrap();

        let progress = store.load().unwrap();
        store.save(&progress).unwrap();

        let after = fs::read(store.path()).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_remove_user() {
        let (store, _temp) = create_test_store();
        let user = UserId::new();
        store.record(&user, &word("apple"), true).unwrap();

        assert!(store.remove_user(&user).unwrap());
        assert!(!store.remove_user(&user).unwrap());
        assert!(store.load_user(&user).unwrap().is_none());
    }

    #[test]
    fn test_concurrent_users_do_not_lose_updates() {
        let (store, _temp) = create_test_store();
        let store = Arc::new(store);
        let users: Vec<UserId> = (0..8).map(|_| UserId::new()).collect();

        std::thread::scope(|scope| {
            for user in &users {
                let store = Arc::clone(&store);
                scope.spawn(move || {
                    for english in ["apple", "house", "car", "happy"] {
                        store.record(user, &word(english), true).unwrap();
                    }
                });
            }
        });

        let progress = store.load().unwrap();
        assert_eq!(progress.len(), users.len());
        for user in &users {
            assert_eq!(progress[user].known.len(), 4);
        }
    }
}
