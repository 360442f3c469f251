use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::AppState;
use crate::metrics;

/// Health check endpoint - reports whether the hub is answering
pub async fn health_handler(State(state): State<AppState>) -> Response {
    let snapshot = state.metrics.snapshot();

    match state.query.map_summary().await {
        Ok(summary) => Json(metrics::HealthStatus {
            status: "healthy".to_string(),
            online: summary.online,
            painted: summary.total_pixels,
            connections: snapshot.connections.active,
            uptime_secs: snapshot.uptime_secs,
        })
        .into_response(),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(metrics::HealthStatus {
                status: "unavailable".to_string(),
                online: 0,
                painted: 0,
                connections: snapshot.connections.active,
                uptime_secs: snapshot.uptime_secs,
            }),
        )
            .into_response(),
    }
}

/// Metrics endpoint - returns detailed server metrics
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.snapshot())
}

/// Liveness probe - returns 200 if the server is running
pub async fn health_live_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "alive" }))
}
