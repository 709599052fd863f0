// Integration tests: HTTP and WebSocket endpoints

use axum_test::TestServer;
use dockwatch::config::AppConfig;
use dockwatch::docker_repo::DockerRepo;
use dockwatch::metrics::StatsPoller;
use dockwatch::models::{ContainerMetrics, FleetSummary, StatsBroadcast};
use dockwatch::routes;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock, broadcast};

const TEST_CONFIG: &str = r#"
[server]
port = 8090
host = "0.0.0.0"

[monitoring]
poll_interval_ms = 1000
stats_log_interval_secs = 60

[history]
capacity = 10

[publishing]
broadcast_capacity = 10
"#;

struct TestApp {
    app: axum::Router,
    tx: broadcast::Sender<StatsBroadcast>,
    poller: Arc<Mutex<StatsPoller>>,
    latest: Arc<RwLock<Option<StatsBroadcast>>>,
}

/// Build the router with an idle poller and no completed cycles. Returns
/// None when a Docker client cannot even be constructed on this host.
fn test_app() -> Option<TestApp> {
    let config = AppConfig::load_from_str(TEST_CONFIG).unwrap();
    let docker_repo = match DockerRepo::connect() {
        Ok(r) => Arc::new(r),
        Err(_) => return None,
    };
    let (tx, _) = broadcast::channel(config.publishing.broadcast_capacity);
    let poller = Arc::new(Mutex::new(StatsPoller::new(
        config.history.capacity,
        Duration::from_millis(config.monitoring.fetch_timeout_ms),
        config.monitoring.fetch_concurrency,
    )));
    let latest = Arc::new(RwLock::new(None));
    let app = routes::app(
        tx.clone(),
        docker_repo,
        poller.clone(),
        latest.clone(),
        Arc::new(AtomicUsize::new(0)),
        config,
    );
    Some(TestApp {
        app,
        tx,
        poller,
        latest,
    })
}

fn sample_update() -> StatsBroadcast {
    StatsBroadcast {
        timestamp_ms: 12345,
        containers: vec![ContainerMetrics {
            id: "c1".into(),
            name: "web".into(),
            running: true,
            cpu_percent: 20.0,
            ..Default::default()
        }],
        summary: FleetSummary {
            container_count: 1,
            cpu_percent_total: 20.0,
            ..Default::default()
        },
    }
}

#[tokio::test]
async fn test_root_endpoint() {
    let Some(t) = test_app() else { return };
    let server = TestServer::new(t.app);
    let response = server.get("/").await;
    response.assert_status_ok();
    response.assert_text("dockwatch: Docker container stats over HTTP/WebSockets");
}

#[tokio::test]
async fn test_version_endpoint() {
    let Some(t) = test_app() else { return };
    let server = TestServer::new(t.app);
    let response = server.get("/version").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json.get("name").and_then(|v| v.as_str()), Some("dockwatch"));
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_summary_unavailable_before_first_poll() {
    let Some(t) = test_app() else { return };
    let server = TestServer::new(t.app);
    let response = server.get("/api/summary").await;
    response.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_metrics_and_summary_serve_latest_cycle() {
    let Some(t) = test_app() else { return };
    *t.latest.write().await = Some(sample_update());
    let server = TestServer::new(t.app);

    let response = server.get("/api/metrics").await;
    response.assert_status_ok();
    let records: Vec<ContainerMetrics> = response.json();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "web");

    let response = server.get("/api/summary").await;
    response.assert_status_ok();
    let summary: FleetSummary = response.json();
    assert_eq!(summary.container_count, 1);
    assert_eq!(summary.cpu_percent_total, 20.0);
}

#[tokio::test]
async fn test_history_endpoint_returns_window() {
    let Some(t) = test_app() else { return };
    assert_eq!(t.poller.lock().await.history_capacity(), 10);
    let server = TestServer::new(t.app);
    let response = server.get("/api/history/unknown").await;
    response.assert_status_ok();
    let window: Vec<ContainerMetrics> = response.json();
    assert!(window.is_empty());
}

// --- WebSocket message tests (require http_transport + ws feature) ---
// Receive until the payload parses as a StatsBroadcast (the server sends
// a hello message and may send Ping first).

async fn receive_first_broadcast(ws: &mut axum_test::TestWebSocket) -> StatsBroadcast {
    let deadline = tokio::time::Instant::now() + tokio::time::Duration::from_secs(3);
    loop {
        let text = ws.receive_text().await;
        if let Ok(v) = serde_json::from_str::<StatsBroadcast>(&text) {
            return v;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for stats JSON"
        );
    }
}

#[tokio::test]
async fn test_ws_stats_streams_poll_updates() {
    let Some(t) = test_app() else { return };
    let server = TestServer::builder()
        .http_transport()
        .build(t.app);
    let mut ws = server.get_websocket("/ws/stats").await.into_websocket().await;

    // The hello frame is sent after the handler subscribes, so once it
    // arrives a broadcast cannot be missed.
    let hello = ws.receive_text().await;
    assert!(hello.contains("\"hello\""));

    t.tx.send(sample_update()).unwrap();

    let update = receive_first_broadcast(&mut ws).await;
    assert_eq!(update.timestamp_ms, 12345);
    assert_eq!(update.containers.len(), 1);
    assert_eq!(update.summary.container_count, 1);
}
