use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::AppState;

fn internal_error(e: anyhow::Error) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": e.to_string() })),
    )
        .into_response()
}

/// `GET /api/map`: grid contents, painted count, and online count.
pub async fn get_map(State(state): State<AppState>) -> Response {
    match state.query.map_summary().await {
        Ok(summary) => Json(summary).into_response(),
        Err(e) => {
            error!("Failed to read map: {}", e);
            internal_error(e)
        }
    }
}

/// `GET /api/backup`: grid contents plus the retained placement history.
pub async fn get_backup(State(state): State<AppState>) -> Response {
    match state.query.backup().await {
        Ok(backup) => Json(backup).into_response(),
        Err(e) => {
            error!("Failed to build backup: {}", e);
            internal_error(e)
        }
    }
}
