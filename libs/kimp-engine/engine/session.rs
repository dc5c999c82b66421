//! Session controller: owns the active market pair and the session epoch.

use crate::domain::{MarketPair, SessionEpoch};
use tracing::info;

/// Tracks which (main, compare) pair is active.
///
/// The controller decides *when* a reset is due; the worker that owns the
/// mutable state performs the wipe in the same synchronous step, so readers
/// never observe a mix of old- and new-session state. The epoch is handed to
/// in-flight async work (detail fetches) so completions from a dead session
/// can be recognized and discarded.
#[derive(Debug, Default)]
pub struct SessionController {
    pair: Option<MarketPair>,
    epoch: SessionEpoch,
}

impl SessionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activate a pair. Returns true when the pair actually changed, meaning
    /// the caller must wipe all session state before processing anything else.
    pub fn set_active_pair(&mut self, pair: MarketPair) -> bool {
        if self.pair.as_ref() == Some(&pair) {
            return false;
        }
        self.epoch += 1;
        info!("Session switched to {} (epoch {})", pair, self.epoch);
        self.pair = Some(pair);
        true
    }

    pub fn pair(&self) -> Option<&MarketPair> {
        self.pair.as_ref()
    }

    pub fn epoch(&self) -> SessionEpoch {
        self.epoch
    }

    /// A session is active once the first pair has been set.
    pub fn is_active(&self) -> bool {
        self.pair.is_some()
    }
}

// =============================================================================
// Tests
// =============================================================================
