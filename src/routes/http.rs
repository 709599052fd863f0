// GET handlers: version, inventory, metrics, history, engine, logs

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;

use super::AppState;
use crate::version::{NAME, VERSION};

/// GET /version — returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/containers — inventory of all containers, running or not.
pub(super) async fn containers_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.docker_repo.list_containers().await {
        Ok(containers) => axum::Json(containers).into_response(),
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            axum::Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

/// GET /api/metrics — latest derived record per container.
pub(super) async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.latest.read().await.as_ref() {
        Some(update) => axum::Json(update.containers.clone()).into_response(),
        None => no_data_response(),
    }
}

/// GET /api/summary — latest fleet summary.
pub(super) async fn summary_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.latest.read().await.as_ref() {
        Some(update) => axum::Json(update.summary.clone()).into_response(),
        None => no_data_response(),
    }
}

/// GET /api/history/{id} — retained records for one container, oldest
/// first. Unknown ids get an empty window, not a 404.
pub(super) async fn history_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let window = state.poller.lock().await.history(&id);
    axum::Json(window)
}

/// GET /api/engine — engine-wide counts and sizes.
pub(super) async fn engine_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.docker_repo.engine_stats().await {
        Ok(stats) => axum::Json(stats).into_response(),
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            axum::Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct LogsQuery {
    lines: Option<usize>,
}

/// GET /api/containers/{id}/logs?lines=N — log tail for one container.
pub(super) async fn logs_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<LogsQuery>,
) -> impl IntoResponse {
    let lines = query
        .lines
        .unwrap_or(state.config.logs.default_tail_lines);
    match state.docker_repo.container_logs(&id, lines).await {
        Ok(lines) => axum::Json(lines).into_response(),
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            axum::Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

fn no_data_response() -> axum::response::Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        axum::Json(serde_json::json!({ "error": "no poll cycle completed yet" })),
    )
        .into_response()
}
