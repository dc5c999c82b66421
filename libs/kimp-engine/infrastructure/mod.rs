//! Infrastructure: external-facing plumbing around the engine.

pub mod config;
pub mod detail;
pub mod logging;

pub use config::{BoardConfig, ConfigError, DetailConfig, EngineConfig, MarketsConfig};
pub use detail::{DetailCache, DetailError, DetailFetcher, HttpDetailFetcher, TokenDetail};
pub use logging::init_tracing;
