use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};

use crate::AppState;
use crate::ws;

/// Upgrade to a canvas session.
pub async fn websocket_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let hub = state.hub.clone();
    let metrics = state.metrics.clone();
    let outbound_capacity = state.server_config.outbound_capacity;

    ws.on_upgrade(move |socket| ws::handle_canvas_ws(socket, hub, metrics, outbound_capacity))
}
