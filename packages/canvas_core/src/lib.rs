//! Canonical state for the shared pixel canvas.
//!
//! Everything in this crate is plain data with invariants and no I/O:
//! the grid of painted cells, the bounded placement history, and the
//! registry of connected sessions. The server crate owns one instance of
//! each behind a single writer.

pub mod error;
pub mod grid;
pub mod history;
pub mod placement;
pub mod protocol;
pub mod sessions;

pub use error::CanvasError;
pub use grid::{GridSnapshot, GridStore};
pub use history::HistoryLog;
pub use placement::{Color, Coordinate, PlacePixel, PlacementEvent, SessionId};
pub use protocol::{Backup, ClientMessage, MapData, MapSummary, PixelPlaced, ServerMessage};
pub use sessions::SessionRegistry;

/// Width and height of the square grid, in cells.
pub const GRID_DIM: u16 = 2000;

/// Number of most recent placements retained for backup export.
pub const MAX_HISTORY: usize = 1000;
