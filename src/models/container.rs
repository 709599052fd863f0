// Container identity and inventory metadata

use serde::{Deserialize, Serialize};

/// Docker container state; serializes to lowercase JSON (e.g. "running").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerState {
    Created,
    Running,
    Exited,
    Paused,
    Restarting,
    Dead,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ContainerState {
    /// Parse from Docker API state string (e.g. "running", "exited").
    pub fn from_docker(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "created" => ContainerState::Created,
            "running" => ContainerState::Running,
            "exited" => ContainerState::Exited,
            "paused" => ContainerState::Paused,
            "restarting" => ContainerState::Restarting,
            "dead" => ContainerState::Dead,
            _ => ContainerState::Unknown,
        }
    }

    pub fn is_running(self) -> bool {
        matches!(self, ContainerState::Running)
    }
}

/// One row of the container inventory (GET /api/containers).
/// Identity and operational metadata only; resource counters live in
/// [`super::ContainerMetrics`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSummary {
    /// 12-character short id.
    pub id: String,
    pub name: String,
    pub image: String,
    pub state: ContainerState,
    /// Human status line from Docker, e.g. "Up 2 hours".
    pub status: String,
    /// Creation time, unix seconds.
    pub created_at: i64,
    #[serde(default)]
    pub uptime_secs: Option<u64>,
    #[serde(default)]
    pub uptime_human: Option<String>,
    #[serde(default)]
    pub restart_count: u64,
    /// Health-check status when a healthcheck is configured.
    #[serde(default)]
    pub health: Option<String>,
    /// Exit code for exited containers.
    #[serde(default)]
    pub exit_code: Option<i64>,
    #[serde(default)]
    pub network_mode: String,
    /// "ip:hostPort->containerPort/proto" per published port.
    #[serde(default)]
    pub ports: Vec<String>,
    /// "source -> destination" per mount.
    #[serde(default)]
    pub volumes: Vec<String>,
}
