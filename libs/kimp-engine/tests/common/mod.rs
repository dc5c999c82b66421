//! Shared helpers for integration tests.

use kimp_engine::engine::BoardView;
use kimp_engine::SnapshotUpdate;
use std::collections::HashSet;
use tokio::sync::watch;

/// Price-only update helper.
pub fn quote(price: f64) -> SnapshotUpdate {
    SnapshotUpdate::quote(price, 0.0)
}

pub fn filtered(symbols: &[&str]) -> HashSet<String> {
    symbols.iter().map(|s| s.to_string()).collect()
}

pub fn symbols(symbols: &[&str]) -> Vec<String> {
    symbols.iter().map(|s| s.to_string()).collect()
}

/// Wait until the published view satisfies the predicate. Commands are
/// processed in order, so a predicate on the last command's effect is enough
/// to know everything before it has been applied.
pub async fn wait_until(
    rx: &mut watch::Receiver<BoardView>,
    pred: impl Fn(&BoardView) -> bool,
) -> BoardView {
    loop {
        {
            let view = rx.borrow().clone();
            if pred(&view) {
                return view;
            }
        }
        rx.changed().await.expect("board worker dropped view channel");
    }
}
