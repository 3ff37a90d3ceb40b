//! Search filtering and card hover state

use super::App;
use crate::types::{Catalog, GameEntry};
use tracing::debug;

/// `term_lower` must already be lowercased.
pub(crate) fn matches_search(entry: &GameEntry, term_lower: &str) -> bool {
    term_lower.is_empty()
        || entry.name.to_lowercase().contains(term_lower)
        || entry.author.to_lowercase().contains(term_lower)
}

/// Indices of the entries whose name or author contains `term`, ignoring
/// case, in catalog order. An empty term keeps everything.
pub(crate) fn filter_catalog(catalog: &Catalog, term: &str) -> Vec<usize> {
    let term_lower = term.to_lowercase();
    catalog
        .entries()
        .iter()
        .enumerate()
        .filter(|(_, entry)| matches_search(entry, &term_lower))
        .map(|(i, _)| i)
        .collect()
}

/// Next hovered card after observing whether the pointer is inside `card`.
pub(crate) fn hover_transition(current: Option<usize>, card: usize, pointer_inside: bool) -> Option<usize> {
    if pointer_inside {
        Some(card)
    } else if current == Some(card) {
        None
    } else {
        current
    }
}

impl App {
    /// Rebuild the visible card list from the in-memory catalog.
    pub fn apply_search(&mut self) {
        self.visible_indices = filter_catalog(&self.catalog, &self.search_query);
        // Cards are rebuilt from scratch, nothing carries over
        self.hovered_card = None;
        debug!(
            query = %self.search_query,
            shown = self.visible_indices.len(),
            total = self.catalog.len(),
            "Search applied"
        );
    }
}
