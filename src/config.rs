use serde::Deserialize;

/// Accepted bounds for the per-container history window.
const HISTORY_CAPACITY_MIN: usize = 10;
const HISTORY_CAPACITY_MAX: usize = 500;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub monitoring: MonitoringConfig,
    pub history: HistoryConfig,
    pub publishing: PublishingConfig,
    #[serde(default)]
    pub logs: LogsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    /// Poll cadence; the worker triggers one cycle per tick.
    pub poll_interval_ms: u64,
    /// Upper bound for a single container's stats fetch.
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
    /// Concurrent stats fetches per poll cycle.
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,
    /// How often to log app stats (poll count, ws clients) at INFO level.
    pub stats_log_interval_secs: u64,
}

fn default_fetch_timeout_ms() -> u64 {
    2000
}

fn default_fetch_concurrency() -> usize {
    8
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    /// Derived-metric records retained per container (bounded FIFO).
    pub capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublishingConfig {
    /// Max poll updates kept in the broadcast channel for /ws/stats (slow clients may lag).
    pub broadcast_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogsConfig {
    /// Log lines returned when the request does not say how many.
    #[serde(default = "default_tail_lines")]
    pub default_tail_lines: usize,
}

fn default_tail_lines() -> usize {
    50
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            default_tail_lines: default_tail_lines(),
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            self.monitoring.poll_interval_ms > 0,
            "monitoring.poll_interval_ms must be > 0, got {}",
            self.monitoring.poll_interval_ms
        );
        anyhow::ensure!(
            self.monitoring.fetch_timeout_ms > 0,
            "monitoring.fetch_timeout_ms must be > 0, got {}",
            self.monitoring.fetch_timeout_ms
        );
        anyhow::ensure!(
            self.monitoring.fetch_concurrency > 0,
            "monitoring.fetch_concurrency must be > 0, got {}",
            self.monitoring.fetch_concurrency
        );
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        anyhow::ensure!(
            (HISTORY_CAPACITY_MIN..=HISTORY_CAPACITY_MAX).contains(&self.history.capacity),
            "history.capacity must be between {} and {}, got {}",
            HISTORY_CAPACITY_MIN,
            HISTORY_CAPACITY_MAX,
            self.history.capacity
        );
        anyhow::ensure!(
            self.publishing.broadcast_capacity > 0,
            "publishing.broadcast_capacity must be > 0, got {}",
            self.publishing.broadcast_capacity
        );
        anyhow::ensure!(
            self.logs.default_tail_lines > 0,
            "logs.default_tail_lines must be > 0, got {}",
            self.logs.default_tail_lines
        );
        Ok(())
    }
}
