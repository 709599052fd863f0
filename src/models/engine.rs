// Docker engine overview (info + disk usage)

use serde::{Deserialize, Serialize};

/// Engine-wide counts and sizes from the Docker `info` and `df` endpoints.
/// Served at GET /api/engine; independent of the per-container pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStats {
    pub containers_running: i64,
    pub containers_paused: i64,
    pub containers_stopped: i64,
    pub images: i64,
    pub server_version: String,
    pub kernel_version: String,
    pub operating_system: String,
    pub cpu_count: i64,
    pub total_memory_gb: f64,
    pub total_image_size_gb: f64,
    pub total_container_size_gb: f64,
}
