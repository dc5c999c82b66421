//! Market pair identity: the scope of one board session.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Monotonic counter bumped on every pair switch. In-flight async work
/// captures the epoch at dispatch and is discarded if it no longer matches.
pub type SessionEpoch = u64;

/// The ordered (main, compare) market pair. The main market is the canonical
/// price source; the compare market only feeds the premium.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarketPair {
    pub main: String,
    pub compare: String,
}

impl MarketPair {
    pub fn new(main: impl Into<String>, compare: impl Into<String>) -> Self {
        Self {
            main: main.into(),
            compare: compare.into(),
        }
    }
}

impl fmt::Display for MarketPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.main, self.compare)
    }
}
