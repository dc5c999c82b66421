//! Sort configuration for the board.

use serde::{Deserialize, Serialize};

/// Column the board is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Price,
    Premium,
    ChangeRate,
    HighestPrice,
    LowestPrice,
    AccumulatedValue,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Price => "price",
            SortKey::Premium => "premium",
            SortKey::ChangeRate => "change_rate",
            SortKey::HighestPrice => "highest_price",
            SortKey::LowestPrice => "lowest_price",
            SortKey::AccumulatedValue => "accumulated_value",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// The single active sort. Defaults to accumulated trade value, descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            key: SortKey::AccumulatedValue,
            direction: SortDirection::Desc,
        }
    }
}
