//! Flashcard service: the operations a front end calls per request
//!
//! Every operation on a user runs under that user's lock, so a judgment can
//! never interleave with the select-then-reset sequence of `get_next_word`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Catalog, CatalogError, DeckFilter, Language, ParseError, WordKey};
use crate::progress::{parse_judgment, ProgressStore, Settings, StorageError, UserId};
use crate::selector;
use crate::summary::{ProgressSummary, WordList};

#[derive(Error, Debug)]
pub enum FlashcardError {
    #[error("No progress found for user {0}")]
    UserNotFound(UserId),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Storage unavailable: {0}")]
    Storage(#[from] StorageError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

impl From<ParseError> for FlashcardError {
    fn from(err: ParseError) -> Self {
        Self::Validation(err.0)
    }
}

pub type Result<T> = std::result::Result<T, FlashcardError>;

/// The flashcard handed to the front end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordView {
    /// Word key in `language:level:english` form, posted back with the judgment
    pub id: String,
    pub english: String,
    pub translation: String,
    pub language: Language,
    pub level: u8,
    /// The user had learned the whole deck and it was reshuffled
    pub deck_reset: bool,
}

/// Unbounded map of per-user locks; entries nobody holds are pruned as it grows
struct UserLocks {
    locks: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

const PRUNE_THRESHOLD: usize = 1024;

impl UserLocks {
    fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn for_user(&self, user: &UserId) -> Result<Arc<Mutex<()>>> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?;
        if locks.len() >= PRUNE_THRESHOLD {
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        }
        Ok(Arc::clone(locks.entry(*user).or_default()))
    }
}

pub struct Flashcards {
    catalog: Arc<Catalog>,
    store: Box<dyn ProgressStore>,
    locks: UserLocks,
}

impl Flashcards {
    pub fn new(catalog: Arc<Catalog>, store: Box<dyn ProgressStore>) -> Self {
        log::info!(
            "Flashcard service ready: {} words, {} store",
            catalog.len(),
            store.name()
        );
        Self {
            catalog,
            store,
            locks: UserLocks::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Create a new anonymous user with default settings
    pub fn start_session(&self) -> Result<UserId> {
        let user = UserId::new();
        self.store.update_user(&user, &mut |_| {})?;
        log::info!("Started session {}", user);
        Ok(user)
    }

    /// Settings must select at least one catalog word
    fn check_settings(&self, settings: &Settings) -> Result<()> {
        if !self.catalog.is_empty() && self.catalog.filtered(&settings.filter()).next().is_none() {
            return Err(FlashcardError::Validation(format!(
                "No {} words at level {}",
                settings.target_language, settings.level
            )));
        }
        Ok(())
    }

    /// Create a new anonymous user with chosen settings
    pub fn start_session_with(&self, settings: Settings) -> Result<UserId> {
        self.check_settings(&settings)?;
        let user = UserId::new();
        self.store
            .update_user(&user, &mut |state| state.settings = Some(settings))?;
        log::info!(
            "Started session {} ({} level {})",
            user,
            settings.target_language,
            settings.level
        );
        Ok(user)
    }

    /// Pick the next flashcard for a user.
    ///
    /// `filter` defaults to the user's settings. An unknown user gets a fresh
    /// record. Returns `None` only when the catalog is empty.
    pub fn get_next_word(
        &self,
        user: &UserId,
        filter: Option<DeckFilter>,
    ) -> Result<Option<WordView>> {
        let lock = self.locks.for_user(user)?;
        let _guard = lock.lock().map_err(|_| StorageError::LockPoisoned)?;

        let stored = self.store.load_user(user)?;
        let is_new = stored.is_none();
        let mut state = stored.unwrap_or_default();
        let filter = filter.unwrap_or_else(|| state.effective_settings().filter());

        let selection =
            selector::next_word(&self.catalog, &mut state, &filter, &mut rand::thread_rng());

        let deck_reset = selection.as_ref().map_or(false, |s| s.deck_reset);
        if deck_reset {
            log::info!("Deck reset for {} (cycle {})", user, state.resets);
            self.store.update_user(user, &mut |stored| stored.clear_known())?;
        } else if is_new {
            self.store.update_user(user, &mut |_| {})?;
        }

        Ok(selection.map(|s| WordView {
            id: s.word.key().to_string(),
            english: s.word.english,
            translation: s.word.translation,
            language: s.word.language,
            level: s.word.level,
            deck_reset: s.deck_reset,
        }))
    }

    /// Record a known/unknown judgment; the word must be in the catalog
    pub fn record_judgment(&self, user: &UserId, word: &WordKey, known: bool) -> Result<()> {
        if !self.catalog.contains(word) {
            return Err(FlashcardError::Validation(format!(
                "Unknown word: {}",
                word
            )));
        }

        let lock = self.locks.for_user(user)?;
        let _guard = lock.lock().map_err(|_| StorageError::LockPoisoned)?;
        self.store.record(user, word, known)?;
        log::debug!("{} judged {} as {}", user, word, if known { "known" } else { "unknown" });
        Ok(())
    }

    /// Record a judgment from raw form fields
    pub fn record_form(
        &self,
        user: &UserId,
        word_id: Option<&str>,
        action: Option<&str>,
    ) -> Result<()> {
        let word_id = word_id
            .ok_or_else(|| FlashcardError::Validation("Missing word id".to_string()))?;
        let action =
            action.ok_or_else(|| FlashcardError::Validation("Missing action".to_string()))?;

        let word: WordKey = word_id.parse()?;
        let known = parse_judgment(action)?;
        self.record_judgment(user, &word, known)
    }

    pub fn get_progress_summary(&self, user: &UserId) -> Result<ProgressSummary> {
        let state = self
            .store
            .load_user(user)?
            .ok_or(FlashcardError::UserNotFound(*user))?;
        Ok(ProgressSummary::from_state(&state))
    }

    pub fn get_word_list(&self, user: &UserId) -> Result<WordList> {
        let state = self
            .store
            .load_user(user)?
            .ok_or(FlashcardError::UserNotFound(*user))?;
        Ok(WordList::from_state(&self.catalog, &state))
    }

    /// Forget all of a user's judgments; settings are kept
    pub fn reset_progress(&self, user: &UserId) -> Result<()> {
        let lock = self.locks.for_user(user)?;
        let _guard = lock.lock().map_err(|_| StorageError::LockPoisoned)?;

        if self.store.load_user(user)?.is_none() {
            return Err(FlashcardError::UserNotFound(*user));
        }
        self.store.update_user(user, &mut |state| state.clear())?;
        log::info!("Reset progress for {}", user);
        Ok(())
    }

    pub fn update_settings(&self, user: &UserId, settings: Settings) -> Result<()> {
        self.check_settings(&settings)?;
        let lock = self.locks.for_user(user)?;
        let _guard = lock.lock().map_err(|_| StorageError::LockPoisoned)?;
        self.store
            .update_user(user, &mut |state| {
                state.settings = Some(settings);
                state.touch();
            })?;
        Ok(())
    }

    /// The user's settings, or the defaults if none were chosen
    pub fn settings(&self, user: &UserId) -> Result<Settings> {
        Ok(self
            .store
            .load_user(user)?
            .map(|state| state.effective_settings())
            .unwrap_or_default())
    }
}
