//! Per-token detail cache: on-demand extended metadata.
//!
//! At most one fetch is in flight per token; a second request for the same
//! token awaits the first instead of issuing a duplicate call, while distinct
//! tokens fetch concurrently. Results are cached for the session lifetime.
//! Completions are epoch-checked: a fetch that finishes after the owning
//! session was replaced is discarded, never written into the new session.

use crate::domain::SessionEpoch;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, warn};

// =============================================================================
// TokenDetail
// =============================================================================

/// Extended metadata for one token from the external metadata service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenDetail {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub launch_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub max_supply: Option<f64>,
    #[serde(default)]
    pub circulating_supply: Option<f64>,
    #[serde(default)]
    pub website: Option<String>,
}

// =============================================================================
// Fetcher trait
// =============================================================================

#[derive(Debug, Error)]
pub enum DetailError {
    #[error("Detail request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Detail service returned status {0}")]
    Status(u16),
}

/// Seam for the external metadata service. Expected to be idempotent and
/// safely retryable; any non-success result is treated as "no data", never
/// as fatal.
#[async_trait]
pub trait DetailFetcher: Send + Sync {
    async fn fetch_detail(&self, symbol: &str) -> Result<TokenDetail, DetailError>;
}

/// HTTP fetcher against the metadata service.
pub struct HttpDetailFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDetailFetcher {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DetailError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl DetailFetcher for HttpDetailFetcher {
    async fn fetch_detail(&self, symbol: &str) -> Result<TokenDetail, DetailError> {
        let url = format!("{}/tokens/{}", self.base_url.trim_end_matches('/'), symbol);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(DetailError::Status(response.status().as_u16()));
        }
        Ok(response.json().await?)
    }
}

// =============================================================================
// DetailCache
// =============================================================================

enum DetailSlot {
    Ready(Arc<TokenDetail>),
    /// Waiters watch for the result; the sender side lives in the fetch task.
    Pending(watch::Receiver<Option<Arc<TokenDetail>>>),
}

/// Session-scoped, request-deduplicating cache in front of a [`DetailFetcher`].
pub struct DetailCache {
    fetcher: Arc<dyn DetailFetcher>,
    epoch: AtomicU64,
    slots: Mutex<HashMap<String, DetailSlot>>,
}

impl DetailCache {
    pub fn new(fetcher: Arc<dyn DetailFetcher>) -> Arc<Self> {
        Arc::new(Self {
            fetcher,
            epoch: AtomicU64::new(0),
            slots: Mutex::new(HashMap::new()),
        })
    }

    /// Get the detail for a token, fetching it at most once per session.
    ///
    /// Returns `None` when the fetch fails (retryable on the next call) or
    /// when the session changed while the fetch was in flight.
    pub async fn get(self: &Arc<Self>, symbol: &str) -> Option<Arc<TokenDetail>> {
        let mut rx = {
            let mut slots = self.slots.lock();
            match slots.get(symbol) {
                Some(DetailSlot::Ready(detail)) => return Some(Arc::clone(detail)),
                Some(DetailSlot::Pending(rx)) => rx.clone(),
                None => {
                    let (tx, rx) = watch::channel(None);
                    slots.insert(symbol.to_string(), DetailSlot::Pending(rx.clone()));

                    let cache = Arc::clone(self);
                    let symbol = symbol.to_string();
                    let epoch = self.epoch.load(Ordering::Acquire);
                    tokio::spawn(async move {
                        let result = cache.fetcher.fetch_detail(&symbol).await;
                        cache.complete(&symbol, epoch, result, tx);
                    });
                    rx
                }
            }
        };

        // Await the in-flight fetch; a dropped sender means no data
        loop {
            if let Some(detail) = rx.borrow().clone() {
                return Some(detail);
            }
            if rx.changed().await.is_err() {
                return None;
            }
        }
    }

    /// Cached detail without triggering a fetch.
    pub fn peek(&self, symbol: &str) -> Option<Arc<TokenDetail>> {
        match self.slots.lock().get(symbol) {
            Some(DetailSlot::Ready(detail)) => Some(Arc::clone(detail)),
            _ => None,
        }
    }

    /// Invalidate everything for a new session. In-flight fetches from the
    /// old epoch will be discarded on completion.
    pub fn reset(&self, epoch: SessionEpoch) {
        let mut slots = self.slots.lock();
        self.epoch.store(epoch, Ordering::Release);
        slots.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }

    fn complete(
        &self,
        symbol: &str,
        epoch: SessionEpoch,
        result: Result<TokenDetail, DetailError>,
        tx: watch::Sender<Option<Arc<TokenDetail>>>,
    ) {
        let mut slots = self.slots.lock();

        // The owning session is gone: drop the result on the floor. The tx
        // drop wakes old waiters with "no data"; the new session's slots are
        // untouched.
        if self.epoch.load(Ordering::Acquire) != epoch {
            debug!("Discarding stale detail result for {} (old session)", symbol);
            return;
        }

        match result {
            Ok(detail) => {
                let detail = Arc::new(detail);
                slots.insert(symbol.to_string(), DetailSlot::Ready(Arc::clone(&detail)));
                let _ = tx.send(Some(detail));
            }
            Err(e) => {
                warn!("Detail fetch for {} failed: {}", symbol, e);
                // Not cached: the next request retries
                if matches!(slots.get(symbol), Some(DetailSlot::Pending(_))) {
                    slots.remove(symbol);
                }
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
