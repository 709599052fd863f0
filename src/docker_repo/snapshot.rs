// Map raw Docker stats responses into typed counter snapshots

use crate::models::CounterSnapshot;
use bollard::models::ContainerStatsResponse;

/// Map a raw stats response into a `CounterSnapshot`. Returns `None` when
/// the CPU counter block is absent (container stopped between listing and
/// fetch); every optional sub-field defaults to zero, since the shape of
/// the stats payload varies with the host's cgroup configuration.
pub(crate) fn from_stats_response(s: &ContainerStatsResponse, id: &str) -> Option<CounterSnapshot> {
    let cpu_stats = s.cpu_stats.as_ref()?;
    let cpu_usage = cpu_stats.cpu_usage.as_ref()?;

    // Snapshots are stamped at mapping time; the poll cadence is coarse
    // enough that the daemon-side read time adds nothing.
    let read_at_ms = now_ms();

    let throttling = cpu_stats.throttling_data.as_ref();

    let memory = s.memory_stats.as_ref();
    let memory_detail = memory.and_then(|m| m.stats.as_ref());
    let mem_detail = |key: &str| -> u64 {
        memory_detail
            .and_then(|m| m.get(key))
            .copied()
            .unwrap_or(0)
    };

    let (network_rx, network_tx, rx_errors, tx_errors, rx_dropped, tx_dropped) =
        s.networks
            .as_ref()
            .map_or((0u64, 0u64, 0u64, 0u64, 0u64, 0u64), |n| {
                let mut rx_bytes = 0u64;
                let mut tx_bytes = 0u64;
                let mut rx_errors = 0u64;
                let mut tx_errors = 0u64;
                let mut rx_dropped = 0u64;
                let mut tx_dropped = 0u64;
                for v in n.values() {
                    rx_bytes += v.rx_bytes.unwrap_or(0);
                    tx_bytes += v.tx_bytes.unwrap_or(0);
                    rx_errors += v.rx_errors.unwrap_or(0);
                    tx_errors += v.tx_errors.unwrap_or(0);
                    rx_dropped += v.rx_dropped.unwrap_or(0);
                    tx_dropped += v.tx_dropped.unwrap_or(0);
                }
                (rx_bytes, tx_bytes, rx_errors, tx_errors, rx_dropped, tx_dropped)
            });

    let (block_read, block_write) = s
        .blkio_stats
        .as_ref()
        .and_then(|b| b.io_service_bytes_recursive.as_ref())
        .map_or((0u64, 0u64), |b| {
            let mut read = 0u64;
            let mut write = 0u64;
            for e in b {
                if e.op
                    .as_ref()
                    .is_some_and(|op| op.eq_ignore_ascii_case("read"))
                {
                    read += e.value.unwrap_or(0);
                } else if e
                    .op
                    .as_ref()
                    .is_some_and(|op| op.eq_ignore_ascii_case("write"))
                {
                    write += e.value.unwrap_or(0);
                }
            }
            (read, write)
        });

    Some(CounterSnapshot {
        id: id.to_string(),
        read_at_ms,
        cpu_usage_ns: cpu_usage.total_usage.unwrap_or(0),
        system_cpu_usage_ns: cpu_stats.system_cpu_usage.unwrap_or(0),
        online_cpus: cpu_stats.online_cpus.unwrap_or(1),
        throttled_periods: throttling.and_then(|t| t.throttled_periods).unwrap_or(0),
        throttled_time_ns: throttling.and_then(|t| t.throttled_time).unwrap_or(0),
        memory_usage_bytes: memory.and_then(|m| m.usage).unwrap_or(0),
        memory_limit_bytes: memory.and_then(|m| m.limit).unwrap_or(0),
        memory_cache_bytes: mem_detail("cache"),
        memory_swap_bytes: mem_detail("swap"),
        oom_kills: mem_detail("oom_kills"),
        network_rx_bytes: network_rx,
        network_tx_bytes: network_tx,
        network_rx_errors: rx_errors,
        network_tx_errors: tx_errors,
        network_rx_dropped: rx_dropped,
        network_tx_dropped: tx_dropped,
        block_read_bytes: block_read,
        block_write_bytes: block_write,
        pids: s.pids_stats.as_ref().and_then(|p| p.current).unwrap_or(0),
    })
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
