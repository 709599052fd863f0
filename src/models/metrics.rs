// Derived per-container metrics and fleet-wide summary (wire models)

use serde::{Deserialize, Serialize};

use super::ContainerState;

/// One normalized record per container per poll.
///
/// Memory fields are megabytes; CPU fields are percentages. Network,
/// block-I/O, and OOM counters stay cumulative snapshots rather than
/// rates; a consumer that wants a rate differences consecutive records
/// itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerMetrics {
    pub id: String,
    pub name: String,
    pub state: ContainerState,
    pub running: bool,
    pub timestamp_ms: u64,
    /// 0..=100 x online CPUs; may legitimately exceed 100 on multi-CPU hosts.
    pub cpu_percent: f64,
    pub cpu_system_percent: f64,
    #[serde(default)]
    pub cpu_throttled: bool,
    #[serde(default)]
    pub cpu_throttled_periods: u64,
    #[serde(default)]
    pub cpu_throttled_time_ns: u64,
    pub mem_usage_mb: f64,
    pub mem_limit_mb: f64,
    pub mem_percent: f64,
    #[serde(default)]
    pub mem_cache_mb: f64,
    #[serde(default)]
    pub mem_swap_mb: f64,
    #[serde(default)]
    pub oom_kills: u64,
    #[serde(default)]
    pub network_rx_bytes: u64,
    #[serde(default)]
    pub network_tx_bytes: u64,
    #[serde(default)]
    pub network_rx_errors: u64,
    #[serde(default)]
    pub network_tx_errors: u64,
    #[serde(default)]
    pub network_rx_dropped: u64,
    #[serde(default)]
    pub network_tx_dropped: u64,
    #[serde(default)]
    pub block_read_bytes: u64,
    #[serde(default)]
    pub block_write_bytes: u64,
    #[serde(default)]
    pub pids: u64,
}

/// Aggregate over the latest records of the currently running containers.
/// Recomputed fresh on every poll; never retained in history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetSummary {
    pub container_count: usize,
    pub cpu_percent_total: f64,
    pub mem_usage_mb_total: f64,
    /// Approximate fleet limit: mean per-container limit x container count.
    pub mem_limit_mb_total: f64,
    pub mem_percent: f64,
    pub network_rx_bytes_total: u64,
    pub network_tx_bytes_total: u64,
    pub block_read_bytes_total: u64,
    pub block_write_bytes_total: u64,
    pub pids_total: u64,
}

/// One poll cycle as pushed to /ws/stats clients and cached for the
/// /api/metrics and /api/summary handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsBroadcast {
    pub timestamp_ms: u64,
    /// Every listed container's record for this cycle, sorted by name.
    pub containers: Vec<ContainerMetrics>,
    pub summary: FleetSummary,
}
