//! Pattern matching against the tail of history.
//!
//! Catalog order is priority order: when several patterns match the same
//! trailing slice, the one declared first wins.

use tracing::debug;

use crate::history::HistoryStore;
use crate::storage::Catalog;
use crate::types::{Pattern, Symbol};

/// First catalog pattern whose sequence equals the trailing slice of
/// `tail` with the same length.
pub fn find_match<'a>(tail: &[Symbol], catalog: &'a Catalog) -> Option<&'a Pattern> {
    catalog.patterns().iter().find(|p| {
        p.len() <= tail.len() && tail[tail.len() - p.len()..] == p.sequence[..]
    })
}

/// Run the matcher against history, inspecting only as much of the tail as
/// the longest catalog pattern needs.
pub fn match_history<'a>(history: &HistoryStore, catalog: &'a Catalog) -> Option<&'a Pattern> {
    if catalog.is_empty() || history.is_empty() {
        return None;
    }
    let tail = history.tail_symbols(catalog.max_len());
    let found = find_match(&tail, catalog);
    match found {
        Some(p) => debug!(pattern_id = %p.id, "Pattern matched"),
        None => debug!(inspected = tail.len(), "No pattern matched"),
    }
    found
}
