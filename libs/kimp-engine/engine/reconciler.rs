//! Reconciler: merges both snapshot sources into the authoritative row map.

use super::store::SnapshotStore;
use crate::domain::RowState;
use std::collections::HashMap;

/// Owns the authoritative token -> RowState mapping for the active session.
///
/// Rows exist exactly for the tokens that have received at least one primary
/// snapshot this session; a comparison-only token has no row until its
/// primary side shows up.
#[derive(Debug, Default)]
pub struct Reconciler {
    rows: HashMap<String, RowState>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild rows for the given dirty tokens from the store.
    /// Returns how many rows were written.
    pub fn reconcile(&mut self, store: &SnapshotStore, dirty: &[String]) -> usize {
        let mut written = 0;
        for symbol in dirty {
            if self.reconcile_one(store, symbol) {
                written += 1;
            }
        }
        written
    }

    /// Full rebuild: recompute every row, including premiums whose primary
    /// price did not change. Required on session start and after a wholesale
    /// comparison-snapshot replacement.
    pub fn rebuild_all(&mut self, store: &SnapshotStore) -> usize {
        let symbols: Vec<String> = store.primary_symbols().cloned().collect();
        self.rows.clear();
        let mut written = 0;
        for symbol in &symbols {
            if self.reconcile_one(store, symbol) {
                written += 1;
            }
        }
        written
    }

    fn reconcile_one(&mut self, store: &SnapshotStore, symbol: &str) -> bool {
        let Some(primary) = store.primary(symbol) else {
            // No primary snapshot yet: the token gets no row
            return false;
        };
        let row = RowState::from_snapshots(symbol, primary, store.comparison_price(symbol));
        self.rows.insert(symbol.to_string(), row);
        true
    }

    pub fn rows(&self) -> &HashMap<String, RowState> {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Wipe the row map. Used on session reset.
    pub fn clear(&mut self) {
        self.rows.clear();
    }
}

// =============================================================================
// Tests
// =============================================================================
