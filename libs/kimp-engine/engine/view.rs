//! Immutable board view published to readers.

use crate::domain::{MarketPair, RowState, SessionEpoch, SortConfig};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A consistent snapshot of the board after one committed reconciliation
/// pass: rows, display order, and change flags all belong to the same pass
/// and the same session. Readers clone this cheaply (everything heavy is
/// behind an `Arc`) instead of touching live mutable state.
#[derive(Debug, Clone)]
pub struct BoardView {
    pub pair: Option<MarketPair>,
    pub epoch: SessionEpoch,
    pub sort: SortConfig,
    pub rows: Arc<HashMap<String, RowState>>,
    pub order: Arc<Vec<String>>,
    pub flags: Arc<HashSet<String>>,
}

impl BoardView {
    /// The pre-session view: no pair, nothing to show.
    pub fn empty() -> Self {
        Self {
            pair: None,
            epoch: 0,
            sort: SortConfig::default(),
            rows: Arc::new(HashMap::new()),
            order: Arc::new(Vec::new()),
            flags: Arc::new(HashSet::new()),
        }
    }

    pub fn row(&self, symbol: &str) -> Option<&RowState> {
        self.rows.get(symbol)
    }

    /// Rows in display order (tokens without a row yet are skipped).
    pub fn ordered_rows(&self) -> impl Iterator<Item = &RowState> {
        self.order.iter().filter_map(|symbol| self.rows.get(symbol))
    }

    pub fn is_flagged(&self, symbol: &str) -> bool {
        self.flags.contains(symbol)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Default for BoardView {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SnapshotUpdate, TokenSnapshot};

    #[test]
    fn test_empty_view() {
        let view = BoardView::empty();
        assert!(view.is_empty());
        assert!(view.pair.is_none());
        assert_eq!(view.ordered_rows().count(), 0);
    }

    #[test]
    fn test_ordered_rows_skips_missing() {
        let snap = TokenSnapshot::from_update(&SnapshotUpdate::quote(100.0, 0.0));
        let mut rows = HashMap::new();
        rows.insert(
            "BTC".to_string(),
            RowState::from_snapshots("BTC", &snap, None),
        );

        let view = BoardView {
            rows: Arc::new(rows),
            order: Arc::new(vec!["ETH".to_string(), "BTC".to_string()]),
            ..BoardView::empty()
        };

        let ordered: Vec<&str> = view.ordered_rows().map(|r| r.symbol.as_str()).collect();
        assert_eq!(ordered, vec!["BTC"]);
    }
}
