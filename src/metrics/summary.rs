// Fleet-wide aggregation over the latest records of running containers

use crate::models::{ContainerMetrics, FleetSummary};

use super::rate::round2;

/// Fold per-container records into one fleet summary.
///
/// Callers pass only records of running containers. The total memory
/// limit is mean(limit) x count, which equals the plain sum but carries
/// the caveat that it treats per-container limits as roughly homogeneous;
/// an unlimited container reports limit 0 and drags the estimate down.
pub fn summarize<'a, I>(records: I) -> FleetSummary
where
    I: IntoIterator<Item = &'a ContainerMetrics>,
{
    let mut summary = FleetSummary::default();
    let mut limit_sum_mb = 0.0;

    for r in records {
        summary.container_count += 1;
        summary.cpu_percent_total += r.cpu_percent;
        summary.mem_usage_mb_total += r.mem_usage_mb;
        limit_sum_mb += r.mem_limit_mb;
        summary.network_rx_bytes_total += r.network_rx_bytes;
        summary.network_tx_bytes_total += r.network_tx_bytes;
        summary.block_read_bytes_total += r.block_read_bytes;
        summary.block_write_bytes_total += r.block_write_bytes;
        summary.pids_total += r.pids;
    }

    if summary.container_count > 0 {
        let mean_limit = limit_sum_mb / summary.container_count as f64;
        summary.mem_limit_mb_total = round2(mean_limit * summary.container_count as f64);
    }
    if summary.mem_limit_mb_total > 0.0 {
        summary.mem_percent =
            round2(summary.mem_usage_mb_total / summary.mem_limit_mb_total * 100.0);
    }
    summary.cpu_percent_total = round2(summary.cpu_percent_total);
    summary.mem_usage_mb_total = round2(summary.mem_usage_mb_total);

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(cpu: f64, mem_mb: f64, limit_mb: f64) -> ContainerMetrics {
        ContainerMetrics {
            id: "c".into(),
            name: "c".into(),
            running: true,
            cpu_percent: cpu,
            mem_usage_mb: mem_mb,
            mem_limit_mb: limit_mb,
            network_rx_bytes: 10,
            network_tx_bytes: 20,
            block_read_bytes: 30,
            block_write_bytes: 40,
            pids: 5,
            ..Default::default()
        }
    }

    #[test]
    fn summarize_sums_cpu_percent() {
        let records = vec![
            record(10.5, 100.0, 1024.0),
            record(20.25, 200.0, 1024.0),
            record(0.0, 50.0, 1024.0),
        ];
        let summary = summarize(records.iter());
        assert_eq!(summary.cpu_percent_total, 30.75);
        assert_eq!(summary.container_count, 3);
    }

    #[test]
    fn summarize_weighted_limit_is_mean_times_count() {
        let records = vec![record(0.0, 100.0, 512.0), record(0.0, 100.0, 2048.0)];
        let summary = summarize(records.iter());
        // mean(512, 2048) * 2 = 2560
        assert_eq!(summary.mem_limit_mb_total, 2560.0);
        assert_eq!(summary.mem_usage_mb_total, 200.0);
        // 200 / 2560 * 100 = 7.8125 -> 7.81
        assert_eq!(summary.mem_percent, 7.81);
    }

    #[test]
    fn summarize_sums_cumulative_counters() {
        let records = vec![record(0.0, 0.0, 0.0), record(0.0, 0.0, 0.0)];
        let summary = summarize(records.iter());
        assert_eq!(summary.network_rx_bytes_total, 20);
        assert_eq!(summary.network_tx_bytes_total, 40);
        assert_eq!(summary.block_read_bytes_total, 60);
        assert_eq!(summary.block_write_bytes_total, 80);
        assert_eq!(summary.pids_total, 10);
    }

    #[test]
    fn summarize_empty_fleet_is_all_zero() {
        let summary = summarize(std::iter::empty());
        assert_eq!(summary.container_count, 0);
        assert_eq!(summary.cpu_percent_total, 0.0);
        assert_eq!(summary.mem_limit_mb_total, 0.0);
        assert_eq!(summary.mem_percent, 0.0);
    }

    #[test]
    fn summarize_zero_limits_guard_mem_percent() {
        let records = vec![record(1.0, 100.0, 0.0)];
        let summary = summarize(records.iter());
        assert_eq!(summary.mem_percent, 0.0);
    }
}
