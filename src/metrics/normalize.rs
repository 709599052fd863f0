// Normalize raw counters into the wire-facing ContainerMetrics record

use crate::models::{ContainerMetrics, ContainerState, CounterSnapshot};

use super::rate::{CpuRates, round2};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Convert a raw snapshot plus its CPU rates into a derived record.
///
/// Memory fields become megabytes (two decimals); memory percent guards
/// against an unconfigured (zero) limit. Cumulative counters pass through
/// unchanged. Optional fields the daemon did not report are already zero
/// in the snapshot, so they surface as zeros here rather than errors.
pub fn normalize(raw: &CounterSnapshot, name: &str, rates: CpuRates) -> ContainerMetrics {
    let mem_percent = if raw.memory_limit_bytes > 0 {
        round2(raw.memory_usage_bytes as f64 / raw.memory_limit_bytes as f64 * 100.0)
    } else {
        0.0
    };

    ContainerMetrics {
        id: raw.id.clone(),
        name: name.to_string(),
        state: ContainerState::Running,
        running: true,
        timestamp_ms: raw.read_at_ms,
        cpu_percent: rates.cpu_percent,
        cpu_system_percent: rates.cpu_system_percent,
        cpu_throttled: raw.throttled_periods > 0,
        cpu_throttled_periods: raw.throttled_periods,
        cpu_throttled_time_ns: raw.throttled_time_ns,
        mem_usage_mb: round2(raw.memory_usage_bytes as f64 / BYTES_PER_MB),
        mem_limit_mb: round2(raw.memory_limit_bytes as f64 / BYTES_PER_MB),
        mem_percent,
        mem_cache_mb: round2(raw.memory_cache_bytes as f64 / BYTES_PER_MB),
        mem_swap_mb: round2(raw.memory_swap_bytes as f64 / BYTES_PER_MB),
        oom_kills: raw.oom_kills,
        network_rx_bytes: raw.network_rx_bytes,
        network_tx_bytes: raw.network_tx_bytes,
        network_rx_errors: raw.network_rx_errors,
        network_tx_errors: raw.network_tx_errors,
        network_rx_dropped: raw.network_rx_dropped,
        network_tx_dropped: raw.network_tx_dropped,
        block_read_bytes: raw.block_read_bytes,
        block_write_bytes: raw.block_write_bytes,
        pids: raw.pids,
    }
}

/// Minimal record for a container that is not running, or whose stats
/// fetch failed this cycle: identity and state only, numerics zeroed.
/// Never folded into the fleet summary and never appended to history.
pub fn not_running_record(
    id: &str,
    name: &str,
    state: ContainerState,
    timestamp_ms: u64,
) -> ContainerMetrics {
    ContainerMetrics {
        id: id.to_string(),
        name: name.to_string(),
        state,
        running: false,
        timestamp_ms,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_converts_memory_to_megabytes() {
        let raw = CounterSnapshot {
            id: "c1".into(),
            memory_usage_bytes: 104_857_600,    // 100 MB
            memory_limit_bytes: 1_073_741_824,  // 1024 MB
            ..Default::default()
        };
        let out = normalize(&raw, "web", CpuRates::default());
        assert_eq!(out.mem_usage_mb, 100.0);
        assert_eq!(out.mem_limit_mb, 1024.0);
        assert_eq!(out.mem_percent, 9.77);
    }

    #[test]
    fn normalize_zero_limit_yields_zero_percent() {
        let raw = CounterSnapshot {
            id: "c1".into(),
            memory_usage_bytes: 1024 * 1024,
            memory_limit_bytes: 0,
            ..Default::default()
        };
        let out = normalize(&raw, "web", CpuRates::default());
        assert_eq!(out.mem_percent, 0.0);
        assert_eq!(out.mem_limit_mb, 0.0);
    }

    #[test]
    fn normalize_passes_cumulative_counters_through() {
        let raw = CounterSnapshot {
            id: "c1".into(),
            network_rx_bytes: 1000,
            network_tx_bytes: 2000,
            block_read_bytes: 300,
            block_write_bytes: 400,
            oom_kills: 2,
            pids: 7,
            ..Default::default()
        };
        let out = normalize(&raw, "web", CpuRates::default());
        assert_eq!(out.network_rx_bytes, 1000);
        assert_eq!(out.network_tx_bytes, 2000);
        assert_eq!(out.block_read_bytes, 300);
        assert_eq!(out.block_write_bytes, 400);
        assert_eq!(out.oom_kills, 2);
        assert_eq!(out.pids, 7);
    }

    #[test]
    fn normalize_flags_throttling() {
        let raw = CounterSnapshot {
            id: "c1".into(),
            throttled_periods: 3,
            throttled_time_ns: 5_000,
            ..Default::default()
        };
        let out = normalize(&raw, "web", CpuRates::default());
        assert!(out.cpu_throttled);
        assert_eq!(out.cpu_throttled_periods, 3);
        assert_eq!(out.cpu_throttled_time_ns, 5_000);
    }

    #[test]
    fn not_running_record_is_minimal() {
        let out = not_running_record("c2", "db", ContainerState::Exited, 42);
        assert!(!out.running);
        assert_eq!(out.state, ContainerState::Exited);
        assert_eq!(out.timestamp_ms, 42);
        assert_eq!(out.cpu_percent, 0.0);
        assert_eq!(out.mem_usage_mb, 0.0);
        assert_eq!(out.pids, 0);
    }
}
