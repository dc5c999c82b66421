//! Single-writer reconciliation worker.
//!
//! Exactly one task owns all mutable board state. The three producers
//! (primary feed, comparison feed, user sort/filter input) send commands
//! into one channel, which serializes them into the
//! apply -> reconcile -> re-rank -> signal stream the board requires.
//! Readers never touch live state: every committed pass publishes an
//! immutable [`BoardView`] through a watch channel.

use super::ranker;
use super::reconciler::Reconciler;
use super::session::SessionController;
use super::signaler::ChangeSignaler;
use super::store::SnapshotStore;
use super::view::BoardView;
use crate::domain::{MarketPair, RowState, SnapshotUpdate, SortConfig};
use crate::infrastructure::detail::DetailCache;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn};

// =============================================================================
// Commands
// =============================================================================

/// Inputs serialized into the reconciliation worker.
#[derive(Debug)]
pub enum BoardCommand {
    /// One partial update from the main market.
    PrimaryUpdate {
        symbol: String,
        update: SnapshotUpdate,
    },
    /// One partial update from the compare market.
    ComparisonUpdate {
        symbol: String,
        update: SnapshotUpdate,
    },
    /// Wholesale replacement of the comparison snapshot set (the compare
    /// market's initial burst). Forces a full premium rebuild.
    ComparisonBurst {
        snapshots: Vec<(String, SnapshotUpdate)>,
    },
    /// The token universe from the main market's initial burst.
    SetUniverse { symbols: Vec<String> },
    /// The externally supplied visible-token subset.
    SetFilter { symbols: HashSet<String> },
    /// A user sort request.
    SetSort { config: SortConfig },
    /// Switch the active market pair; a differing pair wipes all state.
    SetPair { pair: MarketPair },
}

// =============================================================================
// Handle
// =============================================================================

/// Cloneable producer-side handle to the worker.
#[derive(Debug, Clone)]
pub struct BoardHandle {
    tx: mpsc::UnboundedSender<BoardCommand>,
    view_rx: watch::Receiver<BoardView>,
}

impl BoardHandle {
    pub fn apply_primary(&self, symbol: impl Into<String>, update: SnapshotUpdate) {
        self.send(BoardCommand::PrimaryUpdate {
            symbol: symbol.into(),
            update,
        });
    }

    pub fn apply_comparison(&self, symbol: impl Into<String>, update: SnapshotUpdate) {
        self.send(BoardCommand::ComparisonUpdate {
            symbol: symbol.into(),
            update,
        });
    }

    pub fn comparison_burst(&self, snapshots: Vec<(String, SnapshotUpdate)>) {
        self.send(BoardCommand::ComparisonBurst { snapshots });
    }

    pub fn set_universe(&self, symbols: Vec<String>) {
        self.send(BoardCommand::SetUniverse { symbols });
    }

    pub fn set_filter(&self, symbols: HashSet<String>) {
        self.send(BoardCommand::SetFilter { symbols });
    }

    pub fn set_sort(&self, config: SortConfig) {
        self.send(BoardCommand::SetSort { config });
    }

    pub fn set_pair(&self, pair: MarketPair) {
        self.send(BoardCommand::SetPair { pair });
    }

    /// Latest committed view.
    pub fn view(&self) -> BoardView {
        self.view_rx.borrow().clone()
    }

    /// Subscribe to committed views.
    pub fn subscribe(&self) -> watch::Receiver<BoardView> {
        self.view_rx.clone()
    }

    fn send(&self, command: BoardCommand) {
        if self.tx.send(command).is_err() {
            warn!("Board worker is gone, dropping command");
        }
    }
}

// =============================================================================
// Worker
// =============================================================================

pub struct BoardWorker {
    store: SnapshotStore,
    reconciler: Reconciler,
    signaler: ChangeSignaler,
    session: SessionController,
    sort: SortConfig,
    universe: Vec<String>,
    filtered: HashSet<String>,
    order: Vec<String>,
    /// Rows as of the last committed pass, for the signaler's diff. Reset to
    /// empty on session switch so no diff ever crosses a session boundary.
    published_rows: Arc<HashMap<String, RowState>>,
    detail: Option<Arc<DetailCache>>,
    rx: mpsc::UnboundedReceiver<BoardCommand>,
    view_tx: watch::Sender<BoardView>,
}

impl BoardWorker {
    /// Spawn the worker task and return the producer handle.
    ///
    /// `detail` is the session-scoped detail cache to invalidate on pair
    /// switches; pass `None` when no detail service is wired up.
    pub fn spawn(flag_ttl: Duration, detail: Option<Arc<DetailCache>>) -> BoardHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(BoardView::empty());

        let worker = BoardWorker {
            store: SnapshotStore::new(),
            reconciler: Reconciler::new(),
            signaler: ChangeSignaler::new(flag_ttl),
            session: SessionController::new(),
            sort: SortConfig::default(),
            universe: Vec::new(),
            filtered: HashSet::new(),
            order: Vec::new(),
            published_rows: Arc::new(HashMap::new()),
            detail,
            rx,
            view_tx,
        };
        tokio::spawn(worker.run());

        BoardHandle { tx, view_rx }
    }

    async fn run(mut self) {
        info!("Board worker started");
        let mut next_deadline = self.signaler.next_deadline();
        loop {
            let expiry = async move {
                match next_deadline {
                    Some(deadline) => tokio::time::sleep_until(deadline).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                command = self.rx.recv() => {
                    match command {
                        Some(command) => {
                            self.handle_command(command);
                            next_deadline = self.signaler.next_deadline();
                        }
                        None => {
                            info!("Board command channel closed, worker stopping");
                            break;
                        }
                    }
                }
                _ = expiry => {
                    let (cleared, next) = self.signaler.expire(Instant::now());
                    next_deadline = next;
                    if cleared {
                        self.publish();
                    }
                }
            }
        }
    }

    fn handle_command(&mut self, command: BoardCommand) {
        match command {
            BoardCommand::SetPair { pair } => {
                if self.session.set_active_pair(pair) {
                    self.reset_session();
                    self.publish();
                }
            }
            BoardCommand::PrimaryUpdate { symbol, update } => {
                if !self.session.is_active() {
                    debug!("Dropping primary update for {} before first session", symbol);
                    return;
                }
                if self.store.apply_primary(&symbol, &update) {
                    self.reconcile_pass(false);
                }
            }
            BoardCommand::ComparisonUpdate { symbol, update } => {
                if !self.session.is_active() {
                    debug!(
                        "Dropping comparison update for {} before first session",
                        symbol
                    );
                    return;
                }
                if self.store.apply_comparison(&symbol, &update) {
                    self.reconcile_pass(false);
                }
            }
            BoardCommand::ComparisonBurst { snapshots } => {
                if !self.session.is_active() {
                    debug!("Dropping comparison burst before first session");
                    return;
                }
                self.store.replace_comparison(snapshots);
                self.reconcile_pass(true);
            }
            BoardCommand::SetUniverse { symbols } => {
                if !self.session.is_active() {
                    debug!("Dropping universe before first session");
                    return;
                }
                self.apply_universe(symbols);
                self.rerank();
                self.publish();
            }
            BoardCommand::SetFilter { symbols } => {
                if !self.session.is_active() {
                    debug!("Dropping filter before first session");
                    return;
                }
                self.filtered = symbols;
                self.rerank();
                self.publish();
            }
            BoardCommand::SetSort { config } => {
                if !self.session.is_active() {
                    debug!("Dropping sort request before first session");
                    return;
                }
                self.sort = config;
                self.rerank();
                self.publish();
            }
        }
    }

    /// One apply -> reconcile -> signal -> re-rank -> commit step.
    fn reconcile_pass(&mut self, full: bool) {
        if full {
            self.reconciler.rebuild_all(&self.store);
        } else {
            let dirty = self.store.take_dirty();
            if dirty.is_empty() {
                return;
            }
            self.reconciler.reconcile(&self.store, &dirty);
        }

        let previous = Arc::clone(&self.published_rows);
        self.signaler
            .observe(&previous, self.reconciler.rows(), Instant::now());

        self.rerank();
        self.publish();
    }

    fn rerank(&mut self) {
        self.order = ranker::rank(self.reconciler.rows(), self.sort, &self.filtered, &self.order);
    }

    /// Atomically publish the post-pass state. Readers observe either the
    /// previous view or this one, never a mix.
    fn publish(&mut self) {
        let rows = Arc::new(self.reconciler.rows().clone());
        self.published_rows = Arc::clone(&rows);

        self.view_tx.send_replace(BoardView {
            pair: self.session.pair().cloned(),
            epoch: self.session.epoch(),
            sort: self.sort,
            rows,
            order: Arc::new(self.order.clone()),
            flags: Arc::new(self.signaler.flags()),
        });
    }

    /// Wipe every piece of session state in one synchronous step. The next
    /// publish exposes only the fresh, empty session.
    fn reset_session(&mut self) {
        self.store.clear();
        self.reconciler.clear();
        self.signaler.clear();
        self.universe.clear();
        self.filtered.clear();
        self.order.clear();
        self.sort = SortConfig::default();
        self.published_rows = Arc::new(HashMap::new());
        if let Some(detail) = &self.detail {
            detail.reset(self.session.epoch());
        }
    }

    /// Reconcile the order list with a new universe: known tokens keep their
    /// relative order, new tokens append, removed tokens drop out.
    fn apply_universe(&mut self, symbols: Vec<String>) {
        let mut unique = Vec::with_capacity(symbols.len());
        let mut seen = HashSet::new();
        for symbol in symbols {
            if seen.insert(symbol.clone()) {
                unique.push(symbol);
            }
        }

        self.order.retain(|s| seen.contains(s));
        let present: HashSet<&String> = self.order.iter().collect();
        let missing: Vec<String> = unique
            .iter()
            .filter(|s| !present.contains(s))
            .cloned()
            .collect();
        self.order.extend(missing);
        self.universe = unique;
    }
}
