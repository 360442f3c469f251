//! HTTP and WebSocket front end for the shared canvas.
//!
//! [`AppState::new`] spawns the hub; [`router`] wires the pull endpoints,
//! the WebSocket upgrade, and the health probes onto it.

pub mod config;
pub mod handlers;
pub mod hub;
pub mod metrics;
pub mod query;
pub mod ws;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::{MakeSpan, TraceLayer};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::hub::{BroadcastHub, HubHandle};
use crate::metrics::ServerMetrics;
use crate::query::QueryService;

/// Shared handles passed to every request handler
#[derive(Clone)]
pub struct AppState {
    pub hub: HubHandle,
    pub query: QueryService,
    /// Server metrics for observability
    pub metrics: Arc<ServerMetrics>,
    pub server_config: Arc<ServerConfig>,
}

impl AppState {
    /// Spawn the hub task and build the state around it. Must be called
    /// inside a tokio runtime.
    pub fn new(server_config: ServerConfig) -> Self {
        let metrics = Arc::new(ServerMetrics::new());
        let hub = BroadcastHub::new(metrics.clone()).spawn(server_config.command_capacity);
        Self {
            query: QueryService::new(hub.clone()),
            hub,
            metrics,
            server_config: Arc::new(server_config),
        }
    }
}

/// Custom span maker that adds a unique request ID to each incoming request
#[derive(Clone)]
pub struct RequestIdMakeSpan;

impl<B> MakeSpan<B> for RequestIdMakeSpan {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> tracing::Span {
        let request_id = Uuid::new_v4().to_string();
        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    }
}

pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/api/map", get(handlers::get_map))
        .route("/api/backup", get(handlers::get_backup))
        .route("/ws", get(handlers::websocket_handler))
        .route("/health", get(handlers::health_handler))
        .route("/health/live", get(handlers::health_live_handler))
        .route("/metrics", get(handlers::metrics_handler));

    if let Some(dir) = &state.server_config.static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(TraceLayer::new_for_http().make_span_with(RequestIdMakeSpan))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
