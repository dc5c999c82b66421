//! Board engine components.
//!
//! Data flow: feeds -> [`SnapshotStore`] -> [`Reconciler`] ->
//! ([`ranker`], [`ChangeSignaler`]) -> [`BoardView`], all owned by the
//! single [`BoardWorker`] task and supervised by the [`SessionController`].

pub mod ranker;
pub mod reconciler;
pub mod session;
pub mod signaler;
pub mod store;
pub mod view;
pub mod worker;

pub use ranker::rank;
pub use reconciler::Reconciler;
pub use session::SessionController;
pub use signaler::{ChangeSignaler, DEFAULT_FLAG_TTL};
pub use store::SnapshotStore;
pub use view::BoardView;
pub use worker::{BoardCommand, BoardHandle, BoardWorker};
