// HTTP + WebSocket routes

mod http;
mod ws;

use axum::{Router, routing::get};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::{Mutex, RwLock, broadcast};
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::docker_repo::DockerRepo;
use crate::metrics::StatsPoller;
use crate::models::StatsBroadcast;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) stats_tx: broadcast::Sender<StatsBroadcast>,
    pub(crate) docker_repo: Arc<DockerRepo>,
    pub(crate) poller: Arc<Mutex<StatsPoller>>,
    pub(crate) latest: Arc<RwLock<Option<StatsBroadcast>>>,
    pub(crate) ws_stats_connections: Arc<AtomicUsize>,
    pub(crate) config: AppConfig,
}

pub fn app(
    stats_tx: broadcast::Sender<StatsBroadcast>,
    docker_repo: Arc<DockerRepo>,
    poller: Arc<Mutex<StatsPoller>>,
    latest: Arc<RwLock<Option<StatsBroadcast>>>,
    ws_stats_connections: Arc<AtomicUsize>,
    config: AppConfig,
) -> Router {
    let state = AppState {
        stats_tx,
        docker_repo,
        poller,
        latest,
        ws_stats_connections,
        config,
    };
    Router::new()
        .route("/", get(|| async { "dockwatch: Docker container stats over HTTP/WebSockets" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/containers", get(http::containers_handler)) // GET /api/containers
        .route("/api/containers/{id}/logs", get(http::logs_handler)) // GET /api/containers/{id}/logs?lines=N
        .route("/api/metrics", get(http::metrics_handler)) // GET /api/metrics
        .route("/api/summary", get(http::summary_handler)) // GET /api/summary
        .route("/api/history/{id}", get(http::history_handler)) // GET /api/history/{id}
        .route("/api/engine", get(http::engine_handler)) // GET /api/engine
        .route("/ws/stats", get(ws::ws_stats)) // WS /ws/stats
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
