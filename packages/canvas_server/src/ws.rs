//! Per-connection WebSocket transport.
//!
//! Each connection becomes one session: a fresh id, a bounded outbound
//! queue registered with the hub, and two tasks. The sender task drains the
//! queue onto the socket; the input task decodes client frames and forwards
//! placements to the hub. Whichever finishes first ends the session.

use axum::extract::ws::{Message, WebSocket};
use canvas_core::{ClientMessage, SessionId};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::hub::HubHandle;
use crate::metrics::ServerMetrics;

/// Drive one canvas connection until either side goes away.
pub async fn handle_canvas_ws(
    mut socket: WebSocket,
    hub: HubHandle,
    metrics: Arc<ServerMetrics>,
    outbound_capacity: usize,
) {
    let session_id = SessionId::new();
    let (tx, mut rx) = mpsc::channel(outbound_capacity);

    if let Err(e) = hub.connect(session_id, tx).await {
        warn!(session = %session_id, "Failed to register session: {}", e);
        let _ = socket.send(Message::Close(None)).await;
        return;
    }

    metrics.connection_opened();
    info!(session = %session_id, "Canvas connection opened");

    let (mut ws_sender, mut ws_receiver) = socket.split();

    // The hub closes the queue when it evicts this session
    let sender_task = async move {
        while let Some(msg) = rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(j) => j,
                Err(e) => {
                    error!("Failed to serialize message: {}", e);
                    continue;
                }
            };
            if ws_sender.send(Message::Text(json.into())).await.is_err() {
                return;
            }
        }
        let _ = ws_sender.send(Message::Close(None)).await;
    };

    let input_hub = hub.clone();
    let input_metrics = metrics.clone();
    let input_task = async move {
        while let Some(msg) = ws_receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    input_metrics.message_received();
                    match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(ClientMessage::PlacePixel(request)) => {
                            if input_hub.place(session_id, request).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            debug!(session = %session_id, "Ignoring unreadable frame: {}", e);
                        }
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!(session = %session_id, "Client closed connection");
                    break;
                }
                Err(e) => {
                    debug!(session = %session_id, "WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    };

    tokio::select! {
        _ = sender_task => debug!(session = %session_id, "Sender task ended"),
        _ = input_task => debug!(session = %session_id, "Input task ended"),
    }

    hub.disconnect(session_id).await;
    metrics.connection_closed();
    info!(session = %session_id, "Canvas connection closed");
}
