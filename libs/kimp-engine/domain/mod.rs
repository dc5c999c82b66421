//! Pure data model for the premium board.

pub mod pair;
pub mod row;
pub mod snapshot;
pub mod sort;

pub use pair::{MarketPair, SessionEpoch};
pub use row::{premium, RowState};
pub use snapshot::{ChangeDirection, SnapshotUpdate, TokenSnapshot};
pub use sort::{SortConfig, SortDirection, SortKey};
