//! Next-word selection
//!
//! Candidates are the catalog entries accepted by the deck filter that the user
//! has not marked known. When none are left the deck is exhausted: the known
//! set is cleared and candidates are recomputed against the full catalog. A
//! filter that matches no catalog entry at all is treated as no filter, so a
//! non-empty catalog always yields a word and a missing level never counts as
//! an exhausted deck.
//!
//! Selection is uniform random; there is no weighting by recency or difficulty.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::catalog::{Catalog, DeckFilter, Word};
use crate::progress::ProgressState;

/// Result of picking the next flashcard
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub word: Word,
    /// The deck was exhausted and the known set cleared before picking
    pub deck_reset: bool,
}

/// Words the user still has to learn under `filter`
pub fn remaining<'a>(
    catalog: &'a Catalog,
    state: &ProgressState,
    filter: &DeckFilter,
) -> Vec<&'a Word> {
    catalog
        .words()
        .iter()
        .filter(|w| filter.accepts(w) && !state.is_known(&w.key()))
        .collect()
}

/// Pick the next word, resetting the user's known set if the deck is exhausted.
///
/// Returns `None` only for an empty catalog, in which case `state` is untouched.
pub fn next_word<R: Rng + ?Sized>(
    catalog: &Catalog,
    state: &mut ProgressState,
    filter: &DeckFilter,
    rng: &mut R,
) -> Option<Selection> {
    if catalog.is_empty() {
        log::warn!("No words available: catalog is empty");
        return None;
    }

    let filter = if catalog.filtered(filter).next().is_some() {
        *filter
    } else {
        log::debug!("Filter {:?} matches no catalog entry, using full catalog", filter);
        DeckFilter::any()
    };

    let mut candidates = remaining(catalog, state, &filter);
    let mut deck_reset = false;

    if candidates.is_empty() {
        log::info!(
            "Deck exhausted ({} known), clearing known words",
            state.known.len()
        );
        state.clear_known();
        deck_reset = true;
        candidates = remaining(catalog, state, &filter);
    }

    candidates.choose(rng).map(|word| Selection {
        word: (*word).clone(),
        deck_reset,
    })
}
