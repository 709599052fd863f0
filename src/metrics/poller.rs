// Poll orchestration: previous-snapshot tracking, fetch fan-out, history

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::time::Duration;

use futures_util::{StreamExt, stream};
use tokio::time::timeout;
use tracing::warn;

use crate::models::{ContainerMetrics, ContainerState, ContainerSummary, CounterSnapshot, FleetSummary};

use super::history::HistoryStore;
use super::normalize::{normalize, not_running_record};
use super::rate::{CpuRates, rate};
use super::summary::summarize;

/// Why one container's snapshot could not be obtained this cycle.
/// Always recovered locally: the container gets an error record and the
/// cycle continues.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("stats request timed out")]
    Timeout,
    #[error("stats response is missing CPU counters")]
    Incomplete,
    #[error("docker api: {0}")]
    Api(String),
}

/// Source of raw counter snapshots, one container at a time.
/// `DockerRepo` is the production implementation; tests substitute fakes.
pub trait SnapshotSource {
    fn fetch_snapshot(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<CounterSnapshot, FetchError>> + Send;
}

/// One completed poll cycle: a derived record for every listed container,
/// plus the fleet summary over the running ones.
#[derive(Debug, Clone)]
pub struct PollOutcome {
    pub timestamp_ms: u64,
    pub records: HashMap<String, ContainerMetrics>,
    pub summary: FleetSummary,
}

/// Drives poll cycles and owns all mutable core state: the map of each
/// container's previous snapshot and the per-container history windows.
///
/// One cycle runs to completion before the next may start; `poll` takes
/// `&mut self`, and the service wraps the poller in a `tokio::sync::Mutex`
/// so the worker and the HTTP handlers cannot interleave with a cycle.
pub struct StatsPoller {
    history: HistoryStore,
    prev: HashMap<String, CounterSnapshot>,
    fetch_timeout: Duration,
    fetch_concurrency: usize,
}

impl StatsPoller {
    pub fn new(history_capacity: usize, fetch_timeout: Duration, fetch_concurrency: usize) -> Self {
        Self {
            history: HistoryStore::new(history_capacity),
            prev: HashMap::new(),
            fetch_timeout,
            fetch_concurrency: fetch_concurrency.max(1),
        }
    }

    /// Retained history for one container, oldest first.
    pub fn history(&self, id: &str) -> Vec<ContainerMetrics> {
        self.history.window(id)
    }

    pub fn history_capacity(&self) -> usize {
        self.history.capacity()
    }

    /// Change the history window size; existing windows trim immediately.
    pub fn set_history_capacity(&mut self, capacity: usize) {
        self.history.set_capacity(capacity);
    }

    /// Run one poll cycle over the listed containers.
    ///
    /// Snapshots for running containers are fetched concurrently, bounded
    /// by `fetch_concurrency` and per-fetch by `fetch_timeout`. The fetch
    /// phase is read-only; history and the previous-snapshot map are only
    /// touched after every fetch has resolved. A failed fetch yields an
    /// error record for that container and the cycle continues.
    pub async fn poll<S: SnapshotSource>(
        &mut self,
        source: &S,
        containers: &[ContainerSummary],
    ) -> PollOutcome {
        let timestamp_ms = now_ms();
        let fetch_timeout = self.fetch_timeout;

        let running_ids: Vec<String> = containers
            .iter()
            .filter(|c| c.state.is_running())
            .map(|c| c.id.clone())
            .collect();
        let fetches = running_ids.into_iter().map(|id| async move {
            let result = match timeout(fetch_timeout, source.fetch_snapshot(&id)).await {
                Ok(r) => r,
                Err(_) => Err(FetchError::Timeout),
            };
            (id, result)
        });
        let mut fetched: HashMap<String, Result<CounterSnapshot, FetchError>> =
            stream::iter(fetches)
                .buffer_unordered(self.fetch_concurrency)
                .collect::<Vec<_>>()
                .await
                .into_iter()
                .collect();

        let mut records = HashMap::with_capacity(containers.len());
        let mut running_records: Vec<ContainerMetrics> = Vec::new();

        for c in containers {
            if !c.state.is_running() {
                // Previous snapshot intentionally left in place: if the
                // container comes back it is either the same instance or a
                // restart, and the counter-regression guard sorts that out.
                records.insert(
                    c.id.clone(),
                    not_running_record(&c.id, &c.name, c.state, timestamp_ms),
                );
                continue;
            }
            match fetched.remove(&c.id) {
                Some(Ok(snapshot)) => {
                    let rates = match self.prev.get(&c.id) {
                        Some(prev) => rate(prev, &snapshot),
                        // First observation: no delta yet. The snapshot
                        // still becomes the baseline for the next cycle.
                        None => CpuRates::default(),
                    };
                    let record = normalize(&snapshot, &c.name, rates);
                    self.history.append(record.clone());
                    self.prev.insert(c.id.clone(), snapshot);
                    running_records.push(record.clone());
                    records.insert(c.id.clone(), record);
                }
                Some(Err(e)) => {
                    warn!(
                        container = %c.name,
                        error = %e,
                        operation = "fetch_snapshot",
                        "stats fetch failed"
                    );
                    records.insert(
                        c.id.clone(),
                        not_running_record(&c.id, &c.name, ContainerState::Unknown, timestamp_ms),
                    );
                }
                None => {
                    records.insert(
                        c.id.clone(),
                        not_running_record(&c.id, &c.name, ContainerState::Unknown, timestamp_ms),
                    );
                }
            }
        }

        // Forget previous snapshots of containers that are gone entirely,
        // so the map cannot grow without bound over the process lifetime.
        let listed: HashSet<&str> = containers.iter().map(|c| c.id.as_str()).collect();
        self.prev.retain(|id, _| listed.contains(id.as_str()));

        let summary = summarize(running_records.iter());

        PollOutcome {
            timestamp_ms,
            records,
            summary,
        }
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
