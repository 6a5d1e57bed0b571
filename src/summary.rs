//! Progress aggregation for the progress and word-list views

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, WordKey};
use crate::progress::ProgressState;

/// Known/unknown counts for one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub known: usize,
    pub unknown: usize,
    pub total: usize,
    pub known_percent: f64,
    pub unknown_percent: f64,
}

impl ProgressSummary {
    pub fn from_state(state: &ProgressState) -> Self {
        Self::from_counts(state.known.len(), state.unknown.len())
    }

    pub fn from_counts(known: usize, unknown: usize) -> Self {
        let total = known + unknown;
        // A zero total counts as one
        let divisor = total.max(1) as f64;
        Self {
            known,
            unknown,
            total,
            known_percent: known as f64 * 100.0 / divisor,
            unknown_percent: unknown as f64 * 100.0 / divisor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPair {
    pub english: String,
    pub translation: String,
}

/// The user's judged words joined with their translations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordList {
    pub known_words: Vec<WordPair>,
    pub unknown_words: Vec<WordPair>,
}

impl WordList {
    pub fn from_state(catalog: &Catalog, state: &ProgressState) -> Self {
        Self {
            known_words: join(catalog, state.known.iter()),
            unknown_words: join(catalog, state.unknown.iter()),
        }
    }
}

fn join<'a>(catalog: &Catalog, keys: impl Iterator<Item = &'a WordKey>) -> Vec<WordPair> {
    keys.filter_map(|key| match catalog.get(key) {
        Some(word) => Some(WordPair {
            english: word.english.clone(),
            translation: word.translation.clone(),
        }),
        None => {
            log::debug!("Skipping {}: not in catalog", key);
            None
        }
    })
    .collect()
}
