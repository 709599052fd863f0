// Background poll worker (the external cadence the metrics core itself
// does not own). Lists containers, runs one poll cycle under the poller
// lock, then publishes the outcome to WebSocket clients and the handler
// cache.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize};

use tokio::sync::{Mutex, RwLock, broadcast};
use tokio::time::{Duration, Instant, interval};

use crate::docker_repo::DockerRepo;
use crate::metrics::StatsPoller;
use crate::models::{StatsBroadcast, format_bytes};

/// Rate limit for "no receivers" notice (avoid logging every tick when no one is on /ws/stats)
const NO_RECEIVERS_WARN_INTERVAL: Duration = Duration::from_secs(60);

/// Repos, shared state, channels, and shutdown for the worker.
pub struct WorkerDeps {
    pub docker_repo: Arc<DockerRepo>,
    pub poller: Arc<Mutex<StatsPoller>>,
    pub tx: broadcast::Sender<StatsBroadcast>,
    /// Latest completed cycle, for /api/metrics and /api/summary.
    pub latest: Arc<RwLock<Option<StatsBroadcast>>>,
    pub ws_stats_connections: Arc<AtomicUsize>,
    pub polls_completed_total: Arc<AtomicU64>,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

/// Worker timing and logging config.
pub struct WorkerConfig {
    pub poll_interval_ms: u64,
    /// How often to log app stats (real seconds).
    pub stats_log_interval_secs: u64,
}

pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> tokio::task::JoinHandle<()> {
    let WorkerDeps {
        docker_repo,
        poller,
        tx,
        latest,
        ws_stats_connections,
        polls_completed_total,
        mut shutdown_rx,
    } = deps;
    let WorkerConfig {
        poll_interval_ms,
        stats_log_interval_secs,
    } = config;

    tokio::spawn(async move {
        let mut tick = interval(Duration::from_millis(poll_interval_ms));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut stats_log_tick = interval(Duration::from_secs(stats_log_interval_secs));
        stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut last_no_receivers_warn: Option<Instant> = None;

        let worker_span = tracing::span!(tracing::Level::DEBUG, "worker", poll_interval_ms);
        let _guard = worker_span.enter();

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let containers = match docker_repo.list_containers().await {
                        Ok(c) => c,
                        Err(e) => {
                            tracing::warn!(
                                error = %e,
                                operation = "list_containers",
                                "docker unreachable; skipping poll cycle"
                            );
                            continue;
                        }
                    };

                    let outcome = {
                        let mut poller = poller.lock().await;
                        poller.poll(docker_repo.as_ref(), &containers).await
                    };
                    polls_completed_total.fetch_add(1, std::sync::atomic::Ordering::Relaxed);

                    let mut records: Vec<_> = outcome.records.into_values().collect();
                    records.sort_by(|a, b| a.name.cmp(&b.name));
                    let update = StatsBroadcast {
                        timestamp_ms: outcome.timestamp_ms,
                        containers: records,
                        summary: outcome.summary,
                    };

                    tracing::debug!(
                        operation = "poll_cycle",
                        containers = update.summary.container_count,
                        cpu_percent_total = update.summary.cpu_percent_total,
                        mem_usage = %format_bytes((update.summary.mem_usage_mb_total * 1024.0 * 1024.0) as u64),
                        "poll cycle complete"
                    );

                    *latest.write().await = Some(update.clone());

                    if tx.send(update).is_err() {
                        let should_warn = last_no_receivers_warn
                            .is_none_or(|t| t.elapsed() >= NO_RECEIVERS_WARN_INTERVAL);
                        if should_warn {
                            tracing::debug!(
                                operation = "broadcast_stats",
                                "No active WebSocket clients; broadcast channel has no receivers"
                            );
                            last_no_receivers_warn = Some(Instant::now());
                        }
                    }
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Worker shutting down");
                    break;
                }
                _ = stats_log_tick.tick() => {
                    tracing::info!(
                        ws_stats_clients =
                            ws_stats_connections.load(std::sync::atomic::Ordering::Relaxed),
                        polls_completed_total =
                            polls_completed_total.load(std::sync::atomic::Ordering::Relaxed),
                        "app stats"
                    );
                }
            }
        }
    })
}
