//! Coordinates, colors, session ids, and the placement records built from them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use crate::GRID_DIM;
use crate::error::CanvasError;

/// A cell address, guaranteed to lie inside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Coordinate {
    x: u16,
    y: u16,
}

impl Coordinate {
    pub fn new(x: i64, y: i64) -> Result<Self, CanvasError> {
        let range = 0..i64::from(GRID_DIM);
        if !range.contains(&x) || !range.contains(&y) {
            return Err(CanvasError::OutOfBounds { x, y });
        }
        Ok(Self {
            x: x as u16,
            y: y as u16,
        })
    }

    pub fn x(&self) -> u16 {
        self.x
    }

    pub fn y(&self) -> u16 {
        self.y
    }
}

/// Renders as `x,y`, the key format used by the pixel map.
impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Opaque color token. Never parsed or normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Color {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Color {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of one live connection. Fresh for every connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Raw `place-pixel` payload as sent by a client.
///
/// `x` and `y` are kept as JSON values so that strings, floats, and other
/// non-integer inputs reach [`PlacePixel::coordinate`] and are rejected
/// there instead of failing deserialization of the whole frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacePixel {
    pub x: Value,
    pub y: Value,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub player: String,
}

impl PlacePixel {
    pub fn new(x: i64, y: i64, color: impl Into<String>, player: impl Into<String>) -> Self {
        Self {
            x: Value::from(x),
            y: Value::from(y),
            color: color.into(),
            player: player.into(),
        }
    }

    /// Validate the requested cell. Color and player are accepted as-is.
    pub fn coordinate(&self) -> Result<Coordinate, CanvasError> {
        Coordinate::new(axis(&self.x)?, axis(&self.y)?)
    }
}

fn axis(value: &Value) -> Result<i64, CanvasError> {
    if let Some(n) = value.as_i64() {
        return Ok(n);
    }
    // Integers past i64::MAX are still integers, just never on the grid.
    if value.is_u64() {
        return Ok(i64::MAX);
    }
    // Whole numbers spelled as floats (`5.0`, `1e2`). The cast saturates, so
    // huge values still fail the bounds check.
    match value.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 => Ok(f as i64),
        _ => Err(CanvasError::NonIntegerCoordinate),
    }
}

/// An accepted placement, as retained in the history log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementEvent {
    #[serde(flatten)]
    pub coordinate: Coordinate,
    pub color: Color,
    pub player: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub socket_id: SessionId,
}
