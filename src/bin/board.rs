//! Demo board driver.
//!
//! Wires a simulated two-market feed into the engine and logs the top of the
//! board once a second. Stands in for the real feed transports, which are
//! outside the engine's scope.

use anyhow::Result;
use kimp_engine::{
    init_tracing, BoardConfig, BoardHandle, BoardWorker, DetailCache, HttpDetailFetcher,
    MarketPair, SnapshotUpdate, SortConfig, SortDirection, SortKey,
};
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const UNIVERSE: [&str; 8] = ["BTC", "ETH", "XRP", "SOL", "DOGE", "ADA", "TRX", "DOT"];

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config_path =
        std::env::var("BOARD_CONFIG").unwrap_or_else(|_| "config/board.yaml".to_string());
    let config = BoardConfig::load(&config_path)?;
    info!(
        "Board starting: {}/{}",
        config.markets.main, config.markets.compare
    );

    let fetcher = HttpDetailFetcher::new(
        config.detail.base_url.clone(),
        Duration::from_secs(config.detail.timeout_secs),
    )?;
    let detail = DetailCache::new(Arc::new(fetcher));

    let handle = BoardWorker::spawn(
        Duration::from_millis(config.engine.flag_ttl_ms),
        Some(Arc::clone(&detail)),
    );

    handle.set_pair(MarketPair::new(
        config.markets.main.clone(),
        config.markets.compare.clone(),
    ));
    let universe: Vec<String> = UNIVERSE.iter().map(|s| s.to_string()).collect();
    handle.set_universe(universe.clone());
    handle.set_filter(universe.iter().cloned().collect());
    handle.set_sort(SortConfig {
        key: SortKey::Premium,
        direction: SortDirection::Desc,
    });

    tokio::spawn(simulate_feed(handle.clone(), FeedSide::Primary));
    tokio::spawn(simulate_feed(handle.clone(), FeedSide::Comparison));
    tokio::spawn(print_board(handle.clone()));

    tokio::signal::ctrl_c().await?;
    info!("Received shutdown signal (Ctrl+C)");
    Ok(())
}

#[derive(Clone, Copy)]
enum FeedSide {
    Primary,
    Comparison,
}

/// Random-walk feed for one side of the board.
async fn simulate_feed(handle: BoardHandle, side: FeedSide) {
    let mut prices: HashMap<&str, f64> = UNIVERSE
        .iter()
        .enumerate()
        .map(|(i, s)| (*s, 100.0 * (i + 1) as f64))
        .collect();
    let mut opening: HashMap<&str, f64> = prices.clone();
    // The comparison market trades slightly below the main one
    if matches!(side, FeedSide::Comparison) {
        for price in prices.values_mut() {
            *price *= 0.97;
        }
        opening = prices.clone();
    }

    loop {
        let (symbol, update) = {
            let mut rng = rand::thread_rng();
            let symbol = UNIVERSE[rng.gen_range(0..UNIVERSE.len())];
            let price = prices
                .entry(symbol)
                .and_modify(|p| *p *= 1.0 + rng.gen_range(-0.004..0.004))
                .or_insert(100.0);
            let open = opening[symbol];

            let mut update = SnapshotUpdate::quote(*price, *price / open - 1.0);
            if rng.gen_bool(0.2) {
                update.accumulated_trade_value = Some(rng.gen_range(1e6..1e9));
                update.trade_volume = Some(rng.gen_range(10.0..10_000.0));
            }
            (symbol, update)
        };

        match side {
            FeedSide::Primary => handle.apply_primary(symbol, update),
            FeedSide::Comparison => handle.apply_comparison(symbol, update),
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

/// Log the top of the board once a second.
async fn print_board(handle: BoardHandle) {
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    loop {
        ticker.tick().await;
        let view = handle.view();
        if view.is_empty() {
            warn!("Board empty, waiting for data");
            continue;
        }

        info!(
            "Board {} ({} rows, sort {}):",
            view.pair
                .as_ref()
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string()),
            view.rows.len(),
            view.sort.key.as_str()
        );
        for row in view.ordered_rows().take(5) {
            let premium = row
                .premium
                .map(|p| format!("{:+.2}%", p * 100.0))
                .unwrap_or_else(|| "n/a".to_string());
            let flag = if view.is_flagged(&row.symbol) { "*" } else { " " };
            info!(
                "  {}{:<5} {:>12.4} (cmp {:>12}) premium {}",
                flag,
                row.symbol,
                row.price,
                row.comparison_price
                    .map(|p| format!("{:.4}", p))
                    .unwrap_or_else(|| "-".to_string()),
                premium
            );
        }
    }
}
