//! Integer positions and the geometry that gives them neighbors.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How the grid treats its edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edges {
    /// Edges wrap around (toroidal world).
    #[default]
    Wrap,
    /// Edges are walls; coordinates may fall outside the grid.
    Clamp,
}

/// Size and edge policy of a square world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Edge length of the square grid.
    pub size: i32,
    /// Edge policy.
    pub edges: Edges,
}

impl Geometry {
    /// Creates a toroidal geometry.
    pub fn toroidal(size: i32) -> Self {
        Self {
            size,
            edges: Edges::Wrap,
        }
    }

    /// Creates a bounded geometry.
    pub fn bounded(size: i32) -> Self {
        Self {
            size,
            edges: Edges::Clamp,
        }
    }

    /// Whether `coordinate` lies in `[0, size)` on both axes.
    pub fn contains(&self, coordinate: Coordinate) -> bool {
        (0..self.size).contains(&coordinate.x) && (0..self.size).contains(&coordinate.y)
    }

    /// Number of cells.
    pub fn capacity(&self) -> usize {
        let side = self.size.max(0) as usize;
        side * side
    }
}

/// A cell position. Equality and hashing are by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Coordinate {
    /// Creates a coordinate.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the coordinate displaced by `(dx, dy)`.
    ///
    /// In a toroidal geometry the result always lies on the grid; in a bounded
    /// one it is left as is and may fall outside.
    pub fn relative(self, dx: i32, dy: i32, geometry: Geometry) -> Self {
        let (x, y) = (self.x + dx, self.y + dy);
        match geometry.edges {
            Edges::Wrap => Self::new(x.rem_euclid(geometry.size), y.rem_euclid(geometry.size)),
            Edges::Clamp => Self::new(x, y),
        }
    }

    /// Lazily yields the 8 Moore neighbors.
    pub fn neighbors(self, geometry: Geometry) -> impl Iterator<Item = Coordinate> {
        const DELTA: [i32; 3] = [-1, 0, 1];
        DELTA
            .into_iter()
            .flat_map(|dx| DELTA.into_iter().map(move |dy| (dx, dy)))
            .filter(|&offset| offset != (0, 0))
            .map(move |(dx, dy)| self.relative(dx, dy, geometry))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
