use anyhow::Result;
use dockwatch::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock, broadcast};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;

    let docker_repo = Arc::new(docker_repo::DockerRepo::connect()?);
    // Refuse to start polling when the daemon is unreachable; surfacing a
    // connectivity error beats rendering an empty fleet.
    docker_repo.ping().await?;

    let (tx, _) =
        broadcast::channel::<models::StatsBroadcast>(app_config.publishing.broadcast_capacity);
    let poller = Arc::new(Mutex::new(metrics::StatsPoller::new(
        app_config.history.capacity,
        Duration::from_millis(app_config.monitoring.fetch_timeout_ms),
        app_config.monitoring.fetch_concurrency,
    )));
    let latest = Arc::new(RwLock::new(None));

    let ws_stats_connections = Arc::new(AtomicUsize::new(0));
    let polls_completed_total = Arc::new(AtomicU64::new(0));
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let worker_handle = worker::spawn(
        worker::WorkerDeps {
            docker_repo: docker_repo.clone(),
            poller: poller.clone(),
            tx: tx.clone(),
            latest: latest.clone(),
            ws_stats_connections: ws_stats_connections.clone(),
            polls_completed_total: polls_completed_total.clone(),
            shutdown_rx,
        },
        worker::WorkerConfig {
            poll_interval_ms: app_config.monitoring.poll_interval_ms,
            stats_log_interval_secs: app_config.monitoring.stats_log_interval_secs,
        },
    );

    let app = routes::app(
        tx,
        docker_repo,
        poller,
        latest,
        ws_stats_connections,
        app_config.clone(),
    );
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    let in_container = std::path::Path::new("/.dockerenv").exists()
        || std::env::var("CONTAINER").as_deref() == Ok("1");

    if in_container {
        // In Docker: run server until error or SIGTERM (no signal handler; avoids immediate exit)
        axum::serve(listener, app).await?;
    } else {
        tokio::select! {
            result = axum::serve(listener, app) => {
                result?;
            }
            _ = async {
                #[cfg(unix)]
                {
                    let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                        Ok(s) => s,
                        Err(_) => {
                            let _ = tokio::signal::ctrl_c().await;
                            return;
                        }
                    };
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {}
                        _ = sigterm.recv() => {}
                    }
                }
                #[cfg(not(unix))]
                {
                    tokio::signal::ctrl_c().await
                }
            } => {
                tracing::info!("Received shutdown signal");
                let _ = shutdown_tx.send(());
                let _ = worker_handle.await;
            }
        }
    }

    Ok(())
}
