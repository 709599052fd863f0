// Domain models: container identity, raw counters, derived metrics

mod container;
mod engine;
mod format;
mod metrics;
mod snapshot;

pub use container::{ContainerState, ContainerSummary};
pub use engine::EngineStats;
pub use format::{format_bytes, format_uptime};
pub use metrics::{ContainerMetrics, FleetSummary, StatsBroadcast};
pub use snapshot::CounterSnapshot;
