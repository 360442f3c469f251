//! Error type shared by validation and session bookkeeping.

use crate::placement::SessionId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CanvasError {
    #[error("coordinate ({x}, {y}) is outside the grid")]
    OutOfBounds { x: i64, y: i64 },

    #[error("coordinate is not an integer")]
    NonIntegerCoordinate,

    #[error("session {0} is already registered")]
    DuplicateSession(SessionId),
}

impl CanvasError {
    pub fn error_code(&self) -> &str {
        match self {
            Self::OutOfBounds { .. } => "out_of_bounds",
            Self::NonIntegerCoordinate => "non_integer_coordinate",
            Self::DuplicateSession(_) => "duplicate_session",
        }
    }
}
