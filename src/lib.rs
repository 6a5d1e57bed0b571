//! Core of the lingocards vocabulary trainer.
//!
//! A user is shown an English word, judges it known or unknown, and the
//! judgment is persisted. The crate picks the next flashcard (uniformly at
//! random among words not yet known, reshuffling when the deck is exhausted)
//! and derives progress counts and word lists.

pub mod catalog;
pub mod config;
pub mod progress;
pub mod selector;
pub mod service;
pub mod summary;

pub use catalog::{Catalog, DeckFilter, Language, Word, WordKey};
pub use config::Config;
pub use progress::{ProgressState, ProgressStore, Settings, UserId};
pub use service::{FlashcardError, Flashcards, WordView};
pub use summary::{ProgressSummary, WordList, WordPair};
