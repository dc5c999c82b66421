//! Ranker: stable partial sort of the visible tokens.
//!
//! Only tokens that are both filtered-in and present in the row map are
//! sorted; everything else keeps its prior relative order at the tail, so
//! hidden tokens are never lost and never reshuffle.

use crate::domain::{RowState, SortConfig, SortDirection};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Compute a new token order.
///
/// Guards: an empty filtered set or an empty row map returns the previous
/// order unchanged (data has not repopulated yet, e.g. right after a market
/// switch). The output is always a permutation of `previous`.
pub fn rank(
    rows: &HashMap<String, RowState>,
    sort: SortConfig,
    filtered: &HashSet<String>,
    previous: &[String],
) -> Vec<String> {
    if filtered.is_empty() || rows.is_empty() {
        return previous.to_vec();
    }

    // Seed from the previous order so the stable sort preserves prior
    // relative order on ties
    let mut head: Vec<String> = previous
        .iter()
        .filter(|s| filtered.contains(s.as_str()) && rows.contains_key(s.as_str()))
        .cloned()
        .collect();

    head.sort_by(|a, b| compare_rows(&rows[a], &rows[b], sort));

    let sorted: HashSet<&str> = head.iter().map(String::as_str).collect();
    let tail: Vec<String> = previous
        .iter()
        .filter(|s| !sorted.contains(s.as_str()))
        .cloned()
        .collect();

    let mut order = head;
    order.extend(tail);
    order
}

/// Compare two rows under the active sort.
///
/// Absent values (no premium, missing extremes, non-finite corruption) rank
/// below every defined value for both directions: the direction flip applies
/// only when both sides are defined.
fn compare_rows(a: &RowState, b: &RowState, sort: SortConfig) -> Ordering {
    match (a.sort_value(sort.key), b.sort_value(sort.key)) {
        (Some(x), Some(y)) => {
            let ord = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            match sort.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SnapshotUpdate, SortKey, TokenSnapshot};

    fn row(symbol: &str, price: f64, comparison: Option<f64>) -> RowState {
        let snap = TokenSnapshot::from_update(&SnapshotUpdate::quote(price, 0.0));
        RowState::from_snapshots(symbol, &snap, comparison)
    }

    fn rows_of(rows: Vec<RowState>) -> HashMap<String, RowState> {
        rows.into_iter().map(|r| (r.symbol.clone(), r)).collect()
    }

    fn filtered_of(symbols: &[&str]) -> HashSet<String> {
        symbols.iter().map(|s| s.to_string()).collect()
    }

    fn order_of(symbols: &[&str]) -> Vec<String> {
        symbols.iter().map(|s| s.to_string()).collect()
    }

    const PRICE_ASC: SortConfig = SortConfig {
        key: SortKey::Price,
        direction: SortDirection::Asc,
    };
    const PRICE_DESC: SortConfig = SortConfig {
        key: SortKey::Price,
        direction: SortDirection::Desc,
    };

    #[test]
    fn test_empty_filtered_set_returns_previous_order() {
        let rows = rows_of(vec![row("BTC", 100.0, None)]);
        let previous = order_of(&["ETH", "BTC"]);
        let order = rank(&rows, PRICE_ASC, &HashSet::new(), &previous);
        assert_eq!(order, previous);
    }

    #[test]
    fn test_empty_rows_returns_previous_order() {
        let previous = order_of(&["ETH", "BTC"]);
        let order = rank(&HashMap::new(), PRICE_ASC, &filtered_of(&["BTC"]), &previous);
        assert_eq!(order, previous);
    }

    #[test]
    fn test_sorts_visible_by_key() {
        let rows = rows_of(vec![
            row("BTC", 100.0, None),
            row("ETH", 50.0, None),
            row("XRP", 2.0, None),
        ]);
        let filtered = filtered_of(&["BTC", "ETH", "XRP"]);
        let previous = order_of(&["BTC", "ETH", "XRP"]);

        let asc = rank(&rows, PRICE_ASC, &filtered, &previous);
        assert_eq!(asc, order_of(&["XRP", "ETH", "BTC"]));

        let desc = rank(&rows, PRICE_DESC, &filtered, &previous);
        assert_eq!(desc, order_of(&["BTC", "ETH", "XRP"]));
    }

    #[test]
    fn test_hidden_tokens_keep_prior_relative_order_at_tail() {
        let rows = rows_of(vec![
            row("BTC", 100.0, None),
            row("ETH", 50.0, None),
            row("XRP", 2.0, None),
        ]);
        // Only BTC visible; ETH and XRP must stay in their prior order behind it
        let order = rank(
            &rows,
            PRICE_ASC,
            &filtered_of(&["BTC"]),
            &order_of(&["ETH", "BTC", "XRP"]),
        );
        assert_eq!(order, order_of(&["BTC", "ETH", "XRP"]));
    }

    #[test]
    fn test_absent_premium_sorts_to_bottom_both_directions() {
        let rows = rows_of(vec![
            row("BTC", 100.0, Some(80.0)),  // premium 0.25
            row("ETH", 50.0, None),         // premium absent
            row("XRP", 2.0, Some(2.0)),     // premium 0.0
        ]);
        let filtered = filtered_of(&["BTC", "ETH", "XRP"]);
        let previous = order_of(&["BTC", "ETH", "XRP"]);
        let by_premium = |direction| SortConfig {
            key: SortKey::Premium,
            direction,
        };

        let asc = rank(&rows, by_premium(SortDirection::Asc), &filtered, &previous);
        assert_eq!(asc, order_of(&["XRP", "BTC", "ETH"]));

        let desc = rank(&rows, by_premium(SortDirection::Desc), &filtered, &previous);
        assert_eq!(desc, order_of(&["BTC", "XRP", "ETH"]));
    }

    #[test]
    fn test_ties_preserve_prior_relative_order() {
        let rows = rows_of(vec![
            row("BTC", 100.0, None),
            row("ETH", 100.0, None),
            row("XRP", 100.0, None),
        ]);
        let filtered = filtered_of(&["BTC", "ETH", "XRP"]);
        let previous = order_of(&["XRP", "BTC", "ETH"]);

        let order = rank(&rows, PRICE_ASC, &filtered, &previous);
        assert_eq!(order, previous);
    }

    #[test]
    fn test_output_is_permutation_of_previous() {
        let rows = rows_of(vec![row("BTC", 100.0, None), row("ETH", 50.0, None)]);
        let previous = order_of(&["DOGE", "BTC", "SOL", "ETH"]);
        let order = rank(&rows, PRICE_ASC, &filtered_of(&["BTC", "ETH"]), &previous);

        let mut got = order.clone();
        let mut want = previous.clone();
        got.sort();
        want.sort();
        assert_eq!(got, want);
        assert_eq!(order, order_of(&["ETH", "BTC", "DOGE", "SOL"]));
    }

    #[test]
    fn test_idempotent_for_identical_inputs() {
        let rows = rows_of(vec![
            row("BTC", 100.0, Some(80.0)),
            row("ETH", 50.0, None),
        ]);
        let filtered = filtered_of(&["BTC", "ETH"]);
        let previous = order_of(&["ETH", "BTC"]);

        let first = rank(&rows, PRICE_DESC, &filtered, &previous);
        let second = rank(&rows, PRICE_DESC, &filtered, &first);
        assert_eq!(first, second);
    }

    #[test]
    fn test_filtered_token_without_row_stays_in_tail() {
        // SOL is filtered-in but has no row yet: it cannot be sorted, and it
        // must not be lost either
        let rows = rows_of(vec![row("BTC", 100.0, None)]);
        let order = rank(
            &rows,
            PRICE_ASC,
            &filtered_of(&["BTC", "SOL"]),
            &order_of(&["SOL", "BTC"]),
        );
        assert_eq!(order, order_of(&["BTC", "SOL"]));
    }
}
