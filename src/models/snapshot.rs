// Raw cumulative counters from one stats poll of one container

/// One raw poll result, as read from the Docker stats endpoint.
///
/// Every counter is cumulative since the container instance started and
/// never decreases while that instance is alive; a counter that shrinks
/// between two polls of the same id means the container was restarted and
/// the pair must not be differenced into a rate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CounterSnapshot {
    /// 12-character short id.
    pub id: String,
    /// When the counters were read, unix milliseconds.
    pub read_at_ms: u64,
    /// Cumulative CPU time consumed by the container, nanoseconds.
    pub cpu_usage_ns: u64,
    /// Cumulative CPU time consumed by the whole host, nanoseconds.
    pub system_cpu_usage_ns: u64,
    /// Schedulable CPUs visible to the container.
    pub online_cpus: u32,
    pub throttled_periods: u64,
    pub throttled_time_ns: u64,
    pub memory_usage_bytes: u64,
    /// 0 when no limit is configured.
    pub memory_limit_bytes: u64,
    pub memory_cache_bytes: u64,
    pub memory_swap_bytes: u64,
    pub oom_kills: u64,
    /// Summed across all interfaces.
    pub network_rx_bytes: u64,
    pub network_tx_bytes: u64,
    pub network_rx_errors: u64,
    pub network_tx_errors: u64,
    pub network_rx_dropped: u64,
    pub network_tx_dropped: u64,
    pub block_read_bytes: u64,
    pub block_write_bytes: u64,
    /// Current process count (not cumulative).
    pub pids: u64,
}
