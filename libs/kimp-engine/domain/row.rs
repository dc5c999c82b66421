//! Unified per-token row: primary snapshot fields plus comparison-derived ones.

use super::snapshot::{ChangeDirection, TokenSnapshot};
use super::sort::SortKey;
use serde::{Deserialize, Serialize};

// =============================================================================
// Premium
// =============================================================================

/// Compute the cross-market premium ("kimp") as a fraction.
///
/// Defined only when the comparison price is present, finite, and non-zero.
/// A comparison price of exactly 0 is treated as "no data" — the premium is
/// `None`, never 0, infinity, or NaN.
pub fn premium(primary_price: f64, comparison_price: Option<f64>) -> Option<f64> {
    let comparison = comparison_price.filter(|p| p.is_finite() && *p != 0.0)?;
    if !primary_price.is_finite() {
        return None;
    }
    Some(primary_price / comparison - 1.0)
}

// =============================================================================
// RowState
// =============================================================================

/// Authoritative display row for one token.
///
/// Carries the latest primary-market snapshot verbatim, plus the latest
/// comparison-market price and the derived premium. `comparison_price` and
/// `premium` are `None` together when the comparison side has no usable data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowState {
    pub symbol: String,
    pub price: f64,
    pub change_rate: f64,
    pub change_direction: Option<ChangeDirection>,
    pub opening_price: Option<f64>,
    pub highest_price: Option<f64>,
    pub lowest_price: Option<f64>,
    pub accumulated_trade_value: Option<f64>,
    pub trade_volume: Option<f64>,
    pub comparison_price: Option<f64>,
    pub premium: Option<f64>,
}

impl RowState {
    /// Build a row from the latest primary snapshot and comparison price.
    pub fn from_snapshots(
        symbol: &str,
        primary: &TokenSnapshot,
        comparison_price: Option<f64>,
    ) -> Self {
        let premium = premium(primary.price, comparison_price);
        // Keep the pair consistent: an unusable comparison price is absent
        let comparison_price = if premium.is_some() { comparison_price } else { None };

        Self {
            symbol: symbol.to_string(),
            price: primary.price,
            change_rate: primary.change_rate,
            change_direction: primary.change_direction,
            opening_price: primary.opening_price,
            highest_price: primary.highest_price,
            lowest_price: primary.lowest_price,
            accumulated_trade_value: primary.accumulated_trade_value,
            trade_volume: primary.trade_volume,
            comparison_price,
            premium,
        }
    }

    /// Value used for ordering under the given sort key.
    ///
    /// Returns `None` for absent or non-finite values; callers rank `None`
    /// below every defined value regardless of sort direction.
    pub fn sort_value(&self, key: SortKey) -> Option<f64> {
        let value = match key {
            SortKey::Price => Some(self.price),
            SortKey::Premium => self.premium,
            SortKey::ChangeRate => Some(self.change_rate),
            SortKey::HighestPrice => self.highest_price,
            SortKey::LowestPrice => self.lowest_price,
            SortKey::AccumulatedValue => self.accumulated_trade_value,
        };
        value.filter(|v| v.is_finite())
    }
}

// =============================================================================
// Tests
// =============================================================================
