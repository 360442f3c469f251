//! Canonical cell → color mapping.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

use crate::placement::{Color, Coordinate};

/// Owns the painted cells. Absence of a key means the cell was never painted.
///
/// The store trusts its caller: coordinates are validated on construction,
/// and `apply` always overwrites.
#[derive(Debug, Default)]
pub struct GridStore {
    cells: HashMap<Coordinate, Color>,
}

impl GridStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paint a cell, replacing whatever color it had.
    pub fn apply(&mut self, coordinate: Coordinate, color: Color) {
        self.cells.insert(coordinate, color);
    }

    pub fn get(&self, coordinate: &Coordinate) -> Option<&Color> {
        self.cells.get(coordinate)
    }

    /// Number of cells painted at least once.
    pub fn painted(&self) -> usize {
        self.cells.len()
    }

    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            cells: self.cells.clone(),
        }
    }
}

/// Point-in-time copy of the grid, detached from the live store.
///
/// Serializes as a JSON object keyed by `"x,y"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridSnapshot {
    cells: HashMap<Coordinate, Color>,
}

impl GridSnapshot {
    pub fn get(&self, coordinate: &Coordinate) -> Option<&Color> {
        self.cells.get(coordinate)
    }

    pub fn painted(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Coordinate, &Color)> {
        self.cells.iter()
    }
}

impl Serialize for GridSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (coordinate, color) in self.iter() {
            map.serialize_entry(&coordinate.to_string(), color)?;
        }
        map.end()
    }
}
