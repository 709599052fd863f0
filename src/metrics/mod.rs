// Metrics core: rate derivation, normalization, bounded history,
// fleet aggregation, poll orchestration. Pure in-memory; the Docker
// collaborator plugs in through the SnapshotSource trait.

mod history;
mod normalize;
mod poller;
mod rate;
mod summary;

pub use history::HistoryStore;
pub use normalize::{normalize, not_running_record};
pub use poller::{FetchError, PollOutcome, SnapshotSource, StatsPoller};
pub use rate::{CpuRates, rate};
pub use summary::summarize;
