//! Wire payloads for the event channel and the read-only HTTP surface.
//!
//! Every WebSocket text frame carries one envelope:
//!
//! ```json
//! { "event": "pixel-placed", "data": { "x": 5, "y": 5, "color": "#fff", "player": "A" } }
//! ```

use serde::{Deserialize, Serialize};

use crate::grid::GridSnapshot;
use crate::placement::{Color, PlacePixel, PlacementEvent};

/// Messages from client to server
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientMessage {
    PlacePixel(PlacePixel),
}

/// Messages from server to client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Sent once, privately, right after connect.
    MapData(MapData),
    /// An accepted placement, sent to every session including its author.
    PixelPlaced(PixelPlaced),
    /// Number of connected sessions after a join or leave.
    PlayerCount(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapData {
    pub pixels: GridSnapshot,
    pub online: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PixelPlaced {
    pub x: u16,
    pub y: u16,
    pub color: Color,
    pub player: String,
}

impl From<&PlacementEvent> for PixelPlaced {
    fn from(event: &PlacementEvent) -> Self {
        Self {
            x: event.coordinate.x(),
            y: event.coordinate.y(),
            color: event.color.clone(),
            player: event.player.clone(),
        }
    }
}

/// Body of `GET /api/map`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSummary {
    pub pixels: GridSnapshot,
    pub total_pixels: usize,
    pub online: usize,
}

/// Body of `GET /api/backup`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Backup {
    pub pixels: GridSnapshot,
    pub history: Vec<PlacementEvent>,
    /// Export time, milliseconds since the Unix epoch.
    pub timestamp: i64,
}
