//! Kimp Board - Main Library
//!
//! Thin top-level crate that re-exports the engine for the binaries.
//!
//! - **kimp_engine**: reconciliation, ranking, and signaling core

pub use kimp_engine;
