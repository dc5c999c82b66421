//! Feed snapshot types.
//!
//! Upstream feeds deliver partial per-token updates with inconsistent shapes
//! (numbers sometimes arrive as strings, sometimes wrapped in one-element
//! arrays). Everything is normalized into [`SnapshotUpdate`] at this boundary
//! so downstream components only ever see one canonical partial-record type.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// ChangeDirection
// =============================================================================

/// Direction of the last price move, as reported by the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeDirection {
    Rise,
    Fall,
    Flat,
}

impl ChangeDirection {
    /// Parse the feed's direction markers (several upstream spellings).
    pub fn from_feed_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "RISE" | "UP" => Some(ChangeDirection::Rise),
            "FALL" | "DOWN" => Some(ChangeDirection::Fall),
            "EVEN" | "FLAT" => Some(ChangeDirection::Flat),
            _ => None,
        }
    }
}

// =============================================================================
// SnapshotUpdate - One partial update from a feed
// =============================================================================

/// A single partial update for one token from one source.
///
/// `price` and `change_rate` are always present in a valid update and always
/// overwrite the stored value. Every other field is optional: when absent it
/// must not clobber a previously known value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapshotUpdate {
    pub price: f64,
    pub change_rate: f64,
    #[serde(default)]
    pub change_direction: Option<ChangeDirection>,
    #[serde(default)]
    pub opening_price: Option<f64>,
    /// 52-period high.
    #[serde(default)]
    pub highest_price: Option<f64>,
    /// 52-period low.
    #[serde(default)]
    pub lowest_price: Option<f64>,
    #[serde(default)]
    pub accumulated_trade_value: Option<f64>,
    #[serde(default)]
    pub trade_volume: Option<f64>,
}

impl SnapshotUpdate {
    /// Minimal price-only update (the common ticker tick).
    pub fn quote(price: f64, change_rate: f64) -> Self {
        Self {
            price,
            change_rate,
            change_direction: None,
            opening_price: None,
            highest_price: None,
            lowest_price: None,
            accumulated_trade_value: None,
            trade_volume: None,
        }
    }

    /// A valid update carries finite always-present fields.
    pub fn is_valid(&self) -> bool {
        self.price.is_finite() && self.change_rate.is_finite()
    }

    /// Normalize a raw feed payload into a canonical update.
    ///
    /// Coerces numeric strings and unwraps single-element arrays; returns
    /// `None` when the always-present fields are missing or non-numeric.
    pub fn from_feed_json(raw: &Value) -> Option<Self> {
        let price = coerce_number(raw.get("price")?)?;
        let change_rate = coerce_number(raw.get("change_rate")?)?;

        let change_direction = raw
            .get("change_direction")
            .and_then(|v| v.as_str())
            .and_then(ChangeDirection::from_feed_str);

        Some(Self {
            price,
            change_rate,
            change_direction,
            opening_price: raw.get("opening_price").and_then(coerce_number),
            highest_price: raw.get("highest_price").and_then(coerce_number),
            lowest_price: raw.get("lowest_price").and_then(coerce_number),
            accumulated_trade_value: raw.get("accumulated_trade_value").and_then(coerce_number),
            trade_volume: raw.get("trade_volume").and_then(coerce_number),
        })
    }
}

/// Coerce a JSON value into a number, accepting numbers, numeric strings,
/// and single-element arrays of either.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Array(items) if items.len() == 1 => coerce_number(&items[0]),
        _ => None,
    }
}

// =============================================================================
// TokenSnapshot - Latest merged state per token per source
// =============================================================================

/// Latest known state for one token from one source, after partial merges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenSnapshot {
    pub price: f64,
    pub change_rate: f64,
    pub change_direction: Option<ChangeDirection>,
    pub opening_price: Option<f64>,
    pub highest_price: Option<f64>,
    pub lowest_price: Option<f64>,
    pub accumulated_trade_value: Option<f64>,
    pub trade_volume: Option<f64>,
}

impl TokenSnapshot {
    /// Seed a snapshot from the first update for a token.
    pub fn from_update(update: &SnapshotUpdate) -> Self {
        Self {
            price: update.price,
            change_rate: update.change_rate,
            change_direction: update.change_direction,
            opening_price: update.opening_price,
            highest_price: update.highest_price,
            lowest_price: update.lowest_price,
            accumulated_trade_value: update.accumulated_trade_value,
            trade_volume: update.trade_volume,
        }
    }

    /// Apply a partial update: always-present fields overwrite, optional
    /// fields only overwrite when the update actually carries them.
    pub fn merge(&mut self, update: &SnapshotUpdate) {
        self.price = update.price;
        self.change_rate = update.change_rate;
        if update.change_direction.is_some() {
            self.change_direction = update.change_direction;
        }
        if update.opening_price.is_some() {
            self.opening_price = update.opening_price;
        }
        if update.highest_price.is_some() {
            self.highest_price = update.highest_price;
        }
        if update.lowest_price.is_some() {
            self.lowest_price = update.lowest_price;
        }
        if update.accumulated_trade_value.is_some() {
            self.accumulated_trade_value = update.accumulated_trade_value;
        }
        if update.trade_volume.is_some() {
            self.trade_volume = update.trade_volume;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
