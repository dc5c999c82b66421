//! Change signaler: transient per-token "price just moved" pulses.
//!
//! Flags are derived by diffing the previous committed row map against the
//! current one on the primary price only. Each pulse expires a fixed delay
//! after it was set; a rapid run of updates produces repeated pulses, not a
//! held level. The deadline map is owned here and cleared wholesale on
//! session reset, which cancels every pending expiry at once.

use crate::domain::RowState;
use std::collections::{HashMap, HashSet};
use tokio::time::{Duration, Instant};

/// Default pulse window.
pub const DEFAULT_FLAG_TTL: Duration = Duration::from_millis(200);

#[derive(Debug)]
pub struct ChangeSignaler {
    ttl: Duration,
    /// token -> expiry deadline of its most recent pulse
    deadlines: HashMap<String, Instant>,
}

impl ChangeSignaler {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            deadlines: HashMap::new(),
        }
    }

    /// Diff two committed row maps and pulse every token whose primary price
    /// changed. Tokens present in only one map are ignored: appearing or
    /// disappearing is not a price move. Returns the number of pulses set.
    ///
    /// Callers must only pass maps captured within the same session; the
    /// worker guarantees this by clearing its previous-map reference on reset.
    pub fn observe(
        &mut self,
        previous: &HashMap<String, RowState>,
        current: &HashMap<String, RowState>,
        now: Instant,
    ) -> usize {
        let mut pulses = 0;
        for (symbol, row) in current {
            if let Some(prev) = previous.get(symbol) {
                if prev.price != row.price {
                    self.deadlines.insert(symbol.clone(), now + self.ttl);
                    pulses += 1;
                }
            }
        }
        pulses
    }

    /// Drop every pulse whose deadline has passed. Returns true when at
    /// least one flag was cleared (the view needs republishing), plus the
    /// earliest surviving deadline from the same pass so callers can re-arm
    /// their timer without rescanning.
    pub fn expire(&mut self, now: Instant) -> (bool, Option<Instant>) {
        let before = self.deadlines.len();
        let mut next: Option<Instant> = None;
        self.deadlines.retain(|_, deadline| {
            if *deadline > now {
                next = Some(next.map_or(*deadline, |n| n.min(*deadline)));
                true
            } else {
                false
            }
        });
        (self.deadlines.len() != before, next)
    }

    /// Earliest pending deadline, for the worker's timer arm.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    /// Currently raised flags.
    pub fn flags(&self) -> HashSet<String> {
        self.deadlines.keys().cloned().collect()
    }

    pub fn is_flagged(&self, symbol: &str) -> bool {
        self.deadlines.contains_key(symbol)
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    /// Cancel every pending pulse. Used on session reset so no timer from
    /// the old session fires into the new one.
    pub fn clear(&mut self) {
        self.deadlines.clear();
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SnapshotUpdate, TokenSnapshot};

    fn row(symbol: &str, price: f64) -> (String, RowState) {
        let snap = TokenSnapshot::from_update(&SnapshotUpdate::quote(price, 0.0));
        (
            symbol.to_string(),
            RowState::from_snapshots(symbol, &snap, None),
        )
    }

    fn rows(entries: Vec<(String, RowState)>) -> HashMap<String, RowState> {
        entries.into_iter().collect()
    }

    #[test]
    fn test_pulse_on_price_delta() {
        let mut signaler = ChangeSignaler::new(DEFAULT_FLAG_TTL);
        let now = Instant::now();

        let previous = rows(vec![row("BTC", 100.0), row("ETH", 50.0)]);
        let current = rows(vec![row("BTC", 101.0), row("ETH", 50.0)]);

        assert_eq!(signaler.observe(&previous, &current, now), 1);
        assert!(signaler.is_flagged("BTC"));
        assert!(!signaler.is_flagged("ETH"));
    }

    #[test]
    fn test_new_token_does_not_pulse() {
        let mut signaler = ChangeSignaler::new(DEFAULT_FLAG_TTL);
        let previous = rows(vec![]);
        let current = rows(vec![row("BTC", 100.0)]);

        assert_eq!(signaler.observe(&previous, &current, Instant::now()), 0);
        assert!(signaler.is_empty());
    }

    #[test]
    fn test_flags_expire_after_window() {
        let mut signaler = ChangeSignaler::new(Duration::from_millis(200));
        let now = Instant::now();

        let previous = rows(vec![row("BTC", 100.0)]);
        let current = rows(vec![row("BTC", 101.0)]);
        signaler.observe(&previous, &current, now);

        // Not expired inside the window, even with no further updates
        assert!(!signaler.expire(now + Duration::from_millis(100)).0);
        assert!(signaler.is_flagged("BTC"));

        assert!(signaler.expire(now + Duration::from_millis(201)).0);
        assert!(signaler.is_empty());
    }

    #[test]
    fn test_repeated_deltas_repulse() {
        let mut signaler = ChangeSignaler::new(Duration::from_millis(200));
        let now = Instant::now();

        let a = rows(vec![row("BTC", 100.0)]);
        let b = rows(vec![row("BTC", 101.0)]);
        signaler.observe(&a, &b, now);

        // A second delta re-arms the pulse with a fresh window
        let c = rows(vec![row("BTC", 102.0)]);
        signaler.observe(&b, &c, now + Duration::from_millis(150));

        assert!(!signaler.expire(now + Duration::from_millis(201)).0);
        assert!(signaler.is_flagged("BTC"));
        assert!(signaler.expire(now + Duration::from_millis(351)).0);
    }

    #[test]
    fn test_expire_reports_earliest_surviving_deadline() {
        let mut signaler = ChangeSignaler::new(Duration::from_millis(200));
        let now = Instant::now();

        let a = rows(vec![row("BTC", 100.0), row("ETH", 50.0)]);
        let b = rows(vec![row("BTC", 101.0), row("ETH", 50.0)]);
        signaler.observe(&a, &b, now);
        let c = rows(vec![row("BTC", 101.0), row("ETH", 51.0)]);
        signaler.observe(&b, &c, now + Duration::from_millis(100));

        // BTC's pulse lapses; ETH's deadline comes back from the same pass
        let (cleared, next) = signaler.expire(now + Duration::from_millis(201));
        assert!(cleared);
        assert_eq!(next, Some(now + Duration::from_millis(300)));

        let (cleared, next) = signaler.expire(now + Duration::from_millis(301));
        assert!(cleared);
        assert_eq!(next, None);
    }

    #[test]
    fn test_next_deadline_is_earliest() {
        let mut signaler = ChangeSignaler::new(Duration::from_millis(200));
        let now = Instant::now();

        let a = rows(vec![row("BTC", 100.0), row("ETH", 50.0)]);
        let b = rows(vec![row("BTC", 101.0), row("ETH", 50.0)]);
        signaler.observe(&a, &b, now);

        let c = rows(vec![row("BTC", 101.0), row("ETH", 51.0)]);
        signaler.observe(&b, &c, now + Duration::from_millis(50));

        assert_eq!(signaler.next_deadline(), Some(now + Duration::from_millis(200)));
    }

    #[test]
    fn test_clear_cancels_all_pulses() {
        let mut signaler = ChangeSignaler::new(DEFAULT_FLAG_TTL);
        let previous = rows(vec![row("BTC", 100.0)]);
        let current = rows(vec![row("BTC", 101.0)]);
        signaler.observe(&previous, &current, Instant::now());

        signaler.clear();
        assert!(signaler.is_empty());
        assert_eq!(signaler.next_deadline(), None);
    }
}
