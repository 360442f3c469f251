//! The single writer for all canvas state.
//!
//! `BroadcastHub` runs as one spawned task that owns the grid, the history
//! log, and the session registry. Every mutation arrives as a
//! [`HubCommand`] on one queue and is handled to completion, with no await
//! point, before the next command is taken. That gives:
//!
//! - no lost updates (nothing else can touch the state),
//! - per-session ordering (each connection submits through one sender),
//! - consistent snapshots (queries are commands too).
//!
//! Delivery to sessions is `try_send` on each session's bounded outbound
//! queue, so the hub never waits on a consumer. A closed queue is skipped;
//! a full queue means the session fell behind and it is disconnected.

use anyhow::Result;
use canvas_core::{
    Backup, CanvasError, Color, GridStore, HistoryLog, MapData, MapSummary, PixelPlaced,
    PlacePixel, PlacementEvent, ServerMessage, SessionId, SessionRegistry,
};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};

use crate::metrics::ServerMetrics;

/// Outbound queue handle for one session.
pub type SessionSender = mpsc::Sender<ServerMessage>;

/// Commands that can be sent to the hub actor
#[derive(Debug)]
pub enum HubCommand {
    Connect {
        session_id: SessionId,
        outbound: SessionSender,
        respond_to: oneshot::Sender<Result<(), CanvasError>>,
    },
    Place {
        session_id: SessionId,
        request: PlacePixel,
    },
    Disconnect {
        session_id: SessionId,
    },
    MapSummary {
        respond_to: oneshot::Sender<MapSummary>,
    },
    Backup {
        respond_to: oneshot::Sender<Backup>,
    },
}

/// Handle to communicate with the hub actor
#[derive(Clone)]
pub struct HubHandle {
    sender: mpsc::Sender<HubCommand>,
}

impl HubHandle {
    #[cfg(test)]
    pub(crate) fn from_sender(sender: mpsc::Sender<HubCommand>) -> Self {
        Self { sender }
    }

    /// Register a session and queue its initial `map-data`.
    ///
    /// Fails if the hub refuses the session id; the caller must then drop
    /// the connection.
    pub async fn connect(&self, session_id: SessionId, outbound: SessionSender) -> Result<()> {
        self.request(|respond_to| HubCommand::Connect {
            session_id,
            outbound,
            respond_to,
        })
        .await??;
        Ok(())
    }

    /// Submit a placement. Validation happens inside the hub; rejected
    /// requests are dropped there without a reply.
    pub async fn place(&self, session_id: SessionId, request: PlacePixel) -> Result<()> {
        self.sender
            .send(HubCommand::Place {
                session_id,
                request,
            })
            .await
            .map_err(|_| anyhow::anyhow!("Canvas hub is gone"))
    }

    /// Remove a session. Safe to call for sessions the hub already dropped.
    pub async fn disconnect(&self, session_id: SessionId) {
        let _ = self
            .sender
            .send(HubCommand::Disconnect { session_id })
            .await;
    }

    /// Send a command carrying a reply channel and wait for the answer.
    pub(crate) async fn request<R>(
        &self,
        command: impl FnOnce(oneshot::Sender<R>) -> HubCommand,
    ) -> Result<R> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(command(tx))
            .await
            .map_err(|_| anyhow::anyhow!("Canvas hub is gone"))?;
        rx.await
            .map_err(|_| anyhow::anyhow!("Canvas hub didn't respond"))
    }
}

/// The hub actor. Owns all mutable canvas state.
pub struct BroadcastHub {
    grid: GridStore,
    history: HistoryLog,
    sessions: SessionRegistry<SessionSender>,
    metrics: Arc<ServerMetrics>,
    /// Highest timestamp handed out, so history never goes backwards.
    last_timestamp: i64,
}

impl BroadcastHub {
    pub fn new(metrics: Arc<ServerMetrics>) -> Self {
        Self {
            grid: GridStore::new(),
            history: HistoryLog::new(),
            sessions: SessionRegistry::new(),
            metrics,
            last_timestamp: 0,
        }
    }

    /// Spawn the hub task and return its handle.
    pub fn spawn(self, command_capacity: usize) -> HubHandle {
        let (sender, receiver) = mpsc::channel(command_capacity);
        tokio::spawn(self.run(receiver));
        HubHandle { sender }
    }

    async fn run(mut self, mut receiver: mpsc::Receiver<HubCommand>) {
        debug!("Canvas hub started");
        while let Some(cmd) = receiver.recv().await {
            self.handle(cmd);
        }
        debug!("Canvas hub stopped");
    }

    fn handle(&mut self, cmd: HubCommand) {
        match cmd {
            HubCommand::Connect {
                session_id,
                outbound,
                respond_to,
            } => {
                let _ = respond_to.send(self.connect(session_id, outbound));
            }
            HubCommand::Place {
                session_id,
                request,
            } => self.place(session_id, request),
            HubCommand::Disconnect { session_id } => self.disconnect(session_id),
            HubCommand::MapSummary { respond_to } => {
                let _ = respond_to.send(self.map_summary());
            }
            HubCommand::Backup { respond_to } => {
                let _ = respond_to.send(self.backup());
            }
        }
    }

    fn connect(&mut self, session_id: SessionId, outbound: SessionSender) -> Result<(), CanvasError> {
        if let Err(e) = self.sessions.join(session_id, outbound.clone()) {
            warn!(session = %session_id, code = e.error_code(), "Refusing session: {}", e);
            return Err(e);
        }

        let initial = ServerMessage::MapData(MapData {
            pixels: self.grid.snapshot(),
            online: self.sessions.count(),
        });
        match outbound.try_send(initial) {
            Ok(()) => self.metrics.message_sent(),
            Err(e) => warn!(session = %session_id, "Failed to queue initial map data: {}", e),
        }

        info!(session = %session_id, online = self.sessions.count(), "Session joined");
        self.publish(ServerMessage::PlayerCount(self.sessions.count()));
        Ok(())
    }

    fn place(&mut self, session_id: SessionId, request: PlacePixel) {
        let coordinate = match request.coordinate() {
            Ok(c) => c,
            Err(e) => {
                debug!(session = %session_id, code = e.error_code(), "Dropping placement: {}", e);
                self.metrics.placement_rejected();
                return;
            }
        };

        let color = Color::from(request.color);
        self.grid.apply(coordinate, color.clone());

        let event = PlacementEvent {
            coordinate,
            color,
            player: request.player,
            timestamp: self.next_timestamp(),
            socket_id: session_id,
        };
        let placed = PixelPlaced::from(&event);
        debug!(
            session = %session_id,
            "Pixel ({}) color:{} by {}",
            event.coordinate, event.color, event.player
        );
        self.history.append(event);
        self.metrics.placement_accepted();

        self.publish(ServerMessage::PixelPlaced(placed));
    }

    fn disconnect(&mut self, session_id: SessionId) {
        if self.sessions.leave(&session_id).is_none() {
            // Already evicted, or never joined
            return;
        }
        info!(session = %session_id, online = self.sessions.count(), "Session left");
        self.publish(ServerMessage::PlayerCount(self.sessions.count()));
    }

    fn map_summary(&self) -> MapSummary {
        let pixels = self.grid.snapshot();
        MapSummary {
            total_pixels: pixels.painted(),
            pixels,
            online: self.sessions.count(),
        }
    }

    fn backup(&self) -> Backup {
        Backup {
            pixels: self.grid.snapshot(),
            history: self.history.snapshot(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Queue `msg` for every registered session.
    ///
    /// Sessions whose queue is full are removed, which closes their outbound
    /// channel, and the new count is published to the rest.
    fn publish(&mut self, msg: ServerMessage) {
        let mut lagging = Vec::new();

        for (session_id, outbound) in self.sessions.iter() {
            match outbound.try_send(msg.clone()) {
                Ok(()) => self.metrics.message_sent(),
                Err(TrySendError::Full(_)) => {
                    self.metrics.message_dropped();
                    lagging.push(*session_id);
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(session = %session_id, "Skipping closed session");
                }
            }
        }

        if lagging.is_empty() {
            return;
        }
        for session_id in &lagging {
            self.sessions.leave(session_id);
            self.metrics.session_evicted();
            warn!(session = %session_id, "Disconnecting lagging session");
        }
        self.publish(ServerMessage::PlayerCount(self.sessions.count()));
    }

    fn next_timestamp(&mut self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        self.last_timestamp = self.last_timestamp.max(now);
        self.last_timestamp
    }
}
