//! Snapshot store: latest known record per token for each source.
//!
//! Pure data holder with partial-update semantics. Malformed updates are
//! rejected here so no consumer ever sees a non-finite always-present field.

use crate::domain::{SnapshotUpdate, TokenSnapshot};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Which source an update came from, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Primary,
    Comparison,
}

impl Source {
    fn as_str(&self) -> &'static str {
        match self {
            Source::Primary => "primary",
            Source::Comparison => "comparison",
        }
    }
}

/// Latest snapshot per token per source, plus the dirty set for the next
/// reconcile pass.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    primary: HashMap<String, TokenSnapshot>,
    comparison: HashMap<String, TokenSnapshot>,
    dirty: HashSet<String>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a primary-market update. Returns false when the update is
    /// malformed; the stored snapshot is untouched in that case.
    pub fn apply_primary(&mut self, symbol: &str, update: &SnapshotUpdate) -> bool {
        self.apply(Source::Primary, symbol, update)
    }

    /// Apply a comparison-market update. Only the price is consumed
    /// downstream, but the full partial-merge rule applies.
    pub fn apply_comparison(&mut self, symbol: &str, update: &SnapshotUpdate) -> bool {
        self.apply(Source::Comparison, symbol, update)
    }

    fn apply(&mut self, source: Source, symbol: &str, update: &SnapshotUpdate) -> bool {
        if !update.is_valid() {
            warn!(
                "Rejecting malformed {} update for {}: non-finite required field",
                source.as_str(),
                symbol
            );
            return false;
        }

        let map = match source {
            Source::Primary => &mut self.primary,
            Source::Comparison => &mut self.comparison,
        };
        map.entry(symbol.to_string())
            .and_modify(|snap| snap.merge(update))
            .or_insert_with(|| TokenSnapshot::from_update(update));

        self.dirty.insert(symbol.to_string());
        true
    }

    /// Replace the entire comparison snapshot set (initial burst from the
    /// compare market). Invalid entries are dropped. Callers must follow
    /// with a full rebuild: every premium is stale after this.
    pub fn replace_comparison<I>(&mut self, snapshots: I)
    where
        I: IntoIterator<Item = (String, SnapshotUpdate)>,
    {
        self.comparison.clear();
        for (symbol, update) in snapshots {
            if !update.is_valid() {
                warn!(
                    "Dropping malformed comparison snapshot for {} in burst",
                    symbol
                );
                continue;
            }
            self.comparison
                .insert(symbol, TokenSnapshot::from_update(&update));
        }
        self.dirty.clear();
    }

    /// Latest primary snapshot for a token.
    pub fn primary(&self, symbol: &str) -> Option<&TokenSnapshot> {
        self.primary.get(symbol)
    }

    /// Latest comparison price for a token.
    pub fn comparison_price(&self, symbol: &str) -> Option<f64> {
        self.comparison.get(symbol).map(|snap| snap.price)
    }

    /// Symbols with at least one primary snapshot this session.
    pub fn primary_symbols(&self) -> impl Iterator<Item = &String> {
        self.primary.keys()
    }

    /// Drain the dirty set accumulated since the last pass.
    pub fn take_dirty(&mut self) -> Vec<String> {
        self.dirty.drain().collect()
    }

    pub fn has_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Wipe everything. Used on session reset.
    pub fn clear(&mut self) {
        self.primary.clear();
        self.comparison.clear();
        self.dirty.clear();
    }

    pub fn primary_len(&self) -> usize {
        self.primary.len()
    }

    pub fn comparison_len(&self) -> usize {
        self.comparison.len()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_token_created_on_first_write() {
        let mut store = SnapshotStore::new();
        assert!(store.apply_primary("BTC", &SnapshotUpdate::quote(100.0, 0.01)));
        assert_eq!(store.primary("BTC").unwrap().price, 100.0);
        assert_eq!(store.primary_len(), 1);
    }

    #[test]
    fn test_write_marks_token_dirty() {
        let mut store = SnapshotStore::new();
        store.apply_primary("BTC", &SnapshotUpdate::quote(100.0, 0.01));
        store.apply_comparison("ETH", &SnapshotUpdate::quote(50.0, 0.0));

        let mut dirty = store.take_dirty();
        dirty.sort();
        assert_eq!(dirty, vec!["BTC".to_string(), "ETH".to_string()]);
        assert!(!store.has_dirty());
    }

    #[test]
    fn test_partial_update_law() {
        let mut store = SnapshotStore::new();
        let mut first = SnapshotUpdate::quote(100.0, 0.01);
        first.highest_price = Some(150.0);
        store.apply_primary("BTC", &first);

        // Update that omits highest_price must not change the stored value
        store.apply_primary("BTC", &SnapshotUpdate::quote(101.0, 0.02));

        let snap = store.primary("BTC").unwrap();
        assert_eq!(snap.price, 101.0);
        assert_eq!(snap.highest_price, Some(150.0));
    }

    #[test]
    fn test_malformed_update_rejected() {
        let mut store = SnapshotStore::new();
        store.apply_primary("BTC", &SnapshotUpdate::quote(100.0, 0.01));
        store.take_dirty();

        assert!(!store.apply_primary("BTC", &SnapshotUpdate::quote(f64::NAN, 0.01)));
        assert_eq!(store.primary("BTC").unwrap().price, 100.0);
        assert!(!store.has_dirty());
    }

    #[test]
    fn test_replace_comparison_wholesale() {
        let mut store = SnapshotStore::new();
        store.apply_comparison("BTC", &SnapshotUpdate::quote(80.0, 0.0));

        store.replace_comparison(vec![
            ("ETH".to_string(), SnapshotUpdate::quote(40.0, 0.0)),
            ("XRP".to_string(), SnapshotUpdate::quote(f64::NAN, 0.0)),
        ]);

        assert_eq!(store.comparison_price("BTC"), None);
        assert_eq!(store.comparison_price("ETH"), Some(40.0));
        // Malformed burst entry dropped
        assert_eq!(store.comparison_price("XRP"), None);
        assert_eq!(store.comparison_len(), 1);
    }

    #[test]
    fn test_clear_wipes_all_state() {
        let mut store = SnapshotStore::new();
        store.apply_primary("BTC", &SnapshotUpdate::quote(100.0, 0.01));
        store.apply_comparison("BTC", &SnapshotUpdate::quote(80.0, 0.0));

        store.clear();
        assert_eq!(store.primary_len(), 0);
        assert_eq!(store.comparison_len(), 0);
        assert!(!store.has_dirty());
    }
}
