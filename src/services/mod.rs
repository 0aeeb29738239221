pub mod batch;
pub mod rate_gate;
pub mod scheduler;
pub mod series;
pub mod signals;
pub mod sqlite_store;
pub mod watchlists;

pub use batch::BatchExecutor;
pub use rate_gate::RateGate;
pub use scheduler::RefreshScheduler;
pub use series::{normalize, ClosingSeries};
pub use signals::{SignalClassifier, SignalHeuristics};
pub use sqlite_store::{SignalRepository, SqliteStore, WatchlistRepository};
pub use watchlists::WatchlistService;
