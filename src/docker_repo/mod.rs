// Docker collaborator: inventory, one-shot stats, logs, engine overview

mod snapshot;

use bollard::Docker;
use bollard::query_parameters::{
    InspectContainerOptions, ListContainersOptions, LogsOptions, StatsOptions,
};
use futures_util::StreamExt;
use tracing::debug;

use crate::metrics::{FetchError, SnapshotSource};
use crate::models::{ContainerState, ContainerSummary, CounterSnapshot, EngineStats, format_uptime};

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// The Docker daemon is unreachable (connection-level failure). Fatal to
/// a poll cycle; retrying is the caller's policy, not ours.
#[derive(Debug, thiserror::Error)]
#[error("cannot reach docker daemon: {0}")]
pub struct ConnectivityError(String);

pub struct DockerRepo {
    docker: Docker,
}

impl DockerRepo {
    pub fn connect() -> anyhow::Result<Self> {
        let docker = Docker::connect_with_unix_defaults()?;
        Ok(Self { docker })
    }

    /// Liveness check; consulted once before any polling begins.
    pub async fn ping(&self) -> Result<(), ConnectivityError> {
        self.docker
            .ping()
            .await
            .map(|_| ())
            .map_err(|e| ConnectivityError(e.to_string()))
    }

    /// List all containers (running or not) with inventory metadata.
    /// Per-container inspect failures degrade to defaults; a failed list
    /// call means the daemon is unreachable.
    pub async fn list_containers(&self) -> Result<Vec<ContainerSummary>, ConnectivityError> {
        let options = ListContainersOptions {
            all: true,
            ..Default::default()
        };
        let listed = self
            .docker
            .list_containers(Some(options))
            .await
            .map_err(|e| ConnectivityError(e.to_string()))?;

        let mut out = Vec::with_capacity(listed.len());
        for c in listed {
            let full_id = c.id.unwrap_or_default();
            let id: String = full_id.chars().take(12).collect();
            let name = c
                .names
                .as_ref()
                .and_then(|n| n.first())
                .map(|n| n.trim_start_matches('/').to_string())
                .unwrap_or_else(|| id.clone());
            let state = c
                .state
                .as_ref()
                .map(|s| ContainerState::from_docker(&s.to_string()))
                .unwrap_or_default();

            let ports = c.ports.as_ref().map_or_else(Vec::new, |ports| {
                ports.iter().map(format_port).collect()
            });
            let volumes = c.mounts.as_ref().map_or_else(Vec::new, |mounts| {
                mounts
                    .iter()
                    .map(|m| {
                        format!(
                            "{} -> {}",
                            m.source.as_deref().unwrap_or_default(),
                            m.destination.as_deref().unwrap_or_default()
                        )
                    })
                    .collect()
            });

            let mut summary = ContainerSummary {
                id,
                name,
                image: c.image.unwrap_or_default(),
                state,
                status: c.status.unwrap_or_default(),
                created_at: c.created.unwrap_or(0),
                uptime_secs: None,
                uptime_human: None,
                restart_count: 0,
                health: None,
                exit_code: None,
                network_mode: String::new(),
                ports,
                volumes,
            };
            self.enrich_from_inspect(&full_id, &mut summary).await;
            out.push(summary);
        }
        Ok(out)
    }

    /// Fill restart count, health, exit code, network mode, and uptime
    /// from the inspect endpoint; best-effort.
    async fn enrich_from_inspect(&self, full_id: &str, summary: &mut ContainerSummary) {
        let inspected = match self
            .docker
            .inspect_container(full_id, None::<InspectContainerOptions>)
            .await
        {
            Ok(i) => i,
            Err(e) => {
                debug!(container = %summary.name, error = %e, "inspect failed; partial inventory row");
                return;
            }
        };

        summary.restart_count = inspected.restart_count.unwrap_or(0).max(0) as u64;
        summary.network_mode = inspected
            .host_config
            .as_ref()
            .and_then(|h| h.network_mode.clone())
            .unwrap_or_default();

        let Some(state) = inspected.state.as_ref() else {
            return;
        };
        summary.health = state
            .health
            .as_ref()
            .and_then(|h| h.status.as_ref())
            .map(|s| s.to_string());
        if summary.state == ContainerState::Exited {
            summary.exit_code = state.exit_code;
        }
        if summary.state.is_running()
            && let Some(started) = state
                .started_at
                .as_deref()
                .and_then(|t| chrono::DateTime::parse_from_rfc3339(t).ok())
        {
            let uptime = (chrono::Utc::now() - started.with_timezone(&chrono::Utc))
                .num_seconds()
                .max(0) as u64;
            summary.uptime_secs = Some(uptime);
            summary.uptime_human = Some(format_uptime(uptime));
        }
    }

    /// Last `tail_lines` log lines (stdout + stderr, with timestamps).
    pub async fn container_logs(&self, id: &str, tail_lines: usize) -> anyhow::Result<Vec<String>> {
        let options = LogsOptions {
            stdout: true,
            stderr: true,
            timestamps: true,
            tail: tail_lines.to_string(),
            ..Default::default()
        };
        let mut stream = self.docker.logs(id, Some(options));
        let mut lines = Vec::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            let text = String::from_utf8_lossy(&chunk.into_bytes()).into_owned();
            for line in text.lines() {
                if !line.is_empty() {
                    lines.push(line.to_string());
                }
            }
        }
        Ok(lines)
    }

    /// Engine-wide counts and sizes from the `info` and `df` endpoints.
    pub async fn engine_stats(&self) -> anyhow::Result<EngineStats> {
        let info = self.docker.info().await?;

        let usage = self
            .docker
            .df(None::<bollard::query_parameters::DataUsageOptions>)
            .await?;
        let total_image_size: i64 = usage
            .image_usage
            .as_ref()
            .and_then(|u| u.total_size)
            .unwrap_or(0);
        let total_container_size: i64 = usage
            .container_usage
            .as_ref()
            .and_then(|u| u.total_size)
            .unwrap_or(0);

        Ok(EngineStats {
            containers_running: info.containers_running.unwrap_or(0),
            containers_paused: info.containers_paused.unwrap_or(0),
            containers_stopped: info.containers_stopped.unwrap_or(0),
            images: info.images.unwrap_or(0),
            server_version: info.server_version.unwrap_or_default(),
            kernel_version: info.kernel_version.unwrap_or_default(),
            operating_system: info.operating_system.unwrap_or_default(),
            cpu_count: info.ncpu.unwrap_or(0),
            total_memory_gb: info.mem_total.unwrap_or(0) as f64 / BYTES_PER_GB,
            total_image_size_gb: total_image_size as f64 / BYTES_PER_GB,
            total_container_size_gb: total_container_size as f64 / BYTES_PER_GB,
        })
    }
}

impl SnapshotSource for DockerRepo {
    /// One-shot stats read for one running container.
    async fn fetch_snapshot(&self, id: &str) -> Result<CounterSnapshot, FetchError> {
        let options = StatsOptions {
            stream: false,
            one_shot: true,
            ..Default::default()
        };
        let mut stream = self.docker.stats(id, Some(options));
        match stream.next().await {
            Some(Ok(response)) => {
                snapshot::from_stats_response(&response, id).ok_or(FetchError::Incomplete)
            }
            Some(Err(e)) => Err(FetchError::Api(e.to_string())),
            None => Err(FetchError::Api("empty stats stream".to_string())),
        }
    }
}

fn format_port(p: &bollard::models::PortSummary) -> String {
    let proto = p
        .typ
        .as_ref()
        .map(|t| t.to_string())
        .unwrap_or_else(|| "tcp".to_string());
    match p.public_port {
        Some(public) => format!(
            "{}:{}->{}/{}",
            p.ip.as_deref().unwrap_or_default(),
            public,
            p.private_port,
            proto
        ),
        None => format!("{}/{}", p.private_port, proto),
    }
}
