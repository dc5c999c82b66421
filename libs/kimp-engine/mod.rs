//! Cross-market premium board engine.
//!
//! Ingests live price updates for many tokens from two market sources,
//! merges them into a unified per-token view with a derived cross-market
//! premium ("kimp"), keeps a stable sortable display order, and raises
//! transient change flags. All state is in-memory and scoped to the active
//! (main, compare) market pair; switching the pair wipes everything.
//!
//! ## Architecture
//!
//! - **domain**: pure data model (snapshots, rows, sort, market pair)
//! - **engine**: the single-writer reconciliation worker and its components
//! - **infrastructure**: detail cache, configuration, logging

pub mod domain;
pub mod engine;
pub mod infrastructure;

pub use domain::{
    ChangeDirection, MarketPair, RowState, SessionEpoch, SnapshotUpdate, SortConfig,
    SortDirection, SortKey, TokenSnapshot,
};
pub use engine::{BoardHandle, BoardView, BoardWorker, DEFAULT_FLAG_TTL};
pub use infrastructure::{
    init_tracing, BoardConfig, DetailCache, DetailError, DetailFetcher, HttpDetailFetcher,
    TokenDetail,
};
