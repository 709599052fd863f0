// CPU rate derivation from two counter snapshots

use crate::models::CounterSnapshot;

/// CPU percentages derived from the delta between two snapshots of the
/// same container instance.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CpuRates {
    pub cpu_percent: f64,
    pub cpu_system_percent: f64,
}

/// Round to two decimal digits (display precision of all derived metrics).
pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Compute CPU percentages from a previous and a current snapshot.
///
/// Both deltas must be positive to produce a rate: a zero or negative
/// delta means clock skew, a counter reset, or a restarted container, and
/// yields 0 instead of a nonsensical value. An `online_cpus` of 0 is
/// treated as 1.
pub fn rate(prev: &CounterSnapshot, curr: &CounterSnapshot) -> CpuRates {
    let cpu_delta = curr.cpu_usage_ns as i64 - prev.cpu_usage_ns as i64;
    let system_delta = curr.system_cpu_usage_ns as i64 - prev.system_cpu_usage_ns as i64;
    let online = curr.online_cpus.max(1) as f64;

    let cpu_percent = if system_delta > 0 && cpu_delta > 0 {
        round2(cpu_delta as f64 / system_delta as f64 * online * 100.0)
    } else {
        0.0
    };
    let cpu_system_percent = if system_delta > 0 {
        round2(system_delta as f64 / online * 100.0)
    } else {
        0.0
    };

    CpuRates {
        cpu_percent,
        cpu_system_percent,
    }
}
