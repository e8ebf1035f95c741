//! Hex coordinate system using cube coordinates (q, r, s).
//!
//! This module provides the foundational coordinate types for the board:
//! - `CubeCoord`: Identifies individual hex tiles
//! - `VertexKey`: Identifies a corner by the three hexes sharing it
//! - `EdgeKey`: Identifies a side by the two hexes sharing it
//!
//! Keys are canonical (sorted) so the same corner discovered from any of its
//! hexes hashes to the same value. Board generation collapses keys into the
//! stable integer ids used everywhere else.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction from a hex to one of its six neighbors.
///
/// Listed in counter-clockwise order starting from East, so consecutive
/// directions always point at two hexes that are themselves neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    East,
    NorthEast,
    NorthWest,
    West,
    SouthWest,
    SouthEast,
}

impl Direction {
    /// All directions in counter-clockwise order starting from East
    pub const ALL: [Direction; 6] = [
        Direction::East,
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::West,
        Direction::SouthWest,
        Direction::SouthEast,
    ];

    /// Cube offset for one step in this direction
    pub const fn offset(self) -> (i32, i32, i32) {
        match self {
            Direction::East => (1, 0, -1),
            Direction::NorthEast => (1, -1, 0),
            Direction::NorthWest => (0, -1, 1),
            Direction::West => (-1, 0, 1),
            Direction::SouthWest => (-1, 1, 0),
            Direction::SouthEast => (0, 1, -1),
        }
    }

    /// The next direction counter-clockwise
    pub fn next(self) -> Direction {
        let idx = Direction::ALL.iter().position(|d| *d == self).unwrap_or(0);
        Direction::ALL[(idx + 1) % 6]
    }
}

/// Cube coordinate for the hex grid.
///
/// Invariant: `q + r + s == 0`. The constructors maintain it and
/// deserialization rejects values that break it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(try_from = "RawCube")]
pub struct CubeCoord {
    pub q: i32,
    pub r: i32,
    pub s: i32,
}

#[derive(Deserialize)]
struct RawCube {
    q: i32,
    r: i32,
    s: i32,
}

impl TryFrom<RawCube> for CubeCoord {
    type Error = String;

    fn try_from(raw: RawCube) -> Result<Self, Self::Error> {
        CubeCoord::try_new(raw.q, raw.r, raw.s)
            .ok_or_else(|| format!("cube coordinate ({}, {}, {}) does not sum to zero", raw.q, raw.r, raw.s))
    }
}

impl CubeCoord {
    /// Create a coordinate from its two axial components; `s` is derived.
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r, s: -q - r }
    }

    /// Create a coordinate from all three components, if they sum to zero.
    pub const fn try_new(q: i32, r: i32, s: i32) -> Option<Self> {
        if q + r + s == 0 {
            Some(Self { q, r, s })
        } else {
            None
        }
    }

    /// The hex at the origin
    pub const fn origin() -> Self {
        Self::new(0, 0)
    }

    /// Whether the coordinate satisfies the cube invariant
    pub const fn is_valid(&self) -> bool {
        self.q + self.r + self.s == 0
    }

    /// Get the neighbor in a specific direction
    pub fn neighbor(&self, direction: Direction) -> CubeCoord {
        let (dq, dr, ds) = direction.offset();
        CubeCoord {
            q: self.q + dq,
            r: self.r + dr,
            s: self.s + ds,
        }
    }

    /// The six neighboring hexes in `Direction::ALL` order
    pub fn neighbors(&self) -> [CubeCoord; 6] {
        Direction::ALL.map(|dir| self.neighbor(dir))
    }

    /// Distance to another hex (in hex steps)
    pub fn distance_to(&self, other: &CubeCoord) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s - other.s).abs();
        ((dq + dr + ds) / 2) as u32
    }

    /// Key of corner `i` (0..6): the corner between the neighbors in
    /// direction `i` and direction `i + 1`.
    pub fn corner_key(&self, corner: usize) -> VertexKey {
        let dir = Direction::ALL[corner % 6];
        VertexKey::new(*self, self.neighbor(dir), self.neighbor(dir.next()))
    }

    /// Key of side `i` (0..6): the side shared with the neighbor in direction `i`.
    ///
    /// Side `i` runs from corner `i - 1` to corner `i`.
    pub fn side_key(&self, side: usize) -> EdgeKey {
        EdgeKey::new(*self, self.neighbor(Direction::ALL[side % 6]))
    }

    /// All six corner keys
    pub fn corner_keys(&self) -> [VertexKey; 6] {
        [0, 1, 2, 3, 4, 5].map(|i| self.corner_key(i))
    }

    /// All six side keys
    pub fn side_keys(&self) -> [EdgeKey; 6] {
        [0, 1, 2, 3, 4, 5].map(|i| self.side_key(i))
    }
}

impl fmt::Display for CubeCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.q, self.r, self.s)
    }
}

/// Canonical identity of a corner: the three hexes that meet there, sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexKey([CubeCoord; 3]);

impl VertexKey {
    /// Build a key from three hexes in any order
    pub fn new(a: CubeCoord, b: CubeCoord, c: CubeCoord) -> Self {
        let mut hexes = [a, b, c];
        hexes.sort();
        Self(hexes)
    }

    /// The hexes sharing this corner, sorted
    pub fn hexes(&self) -> &[CubeCoord; 3] {
        &self.0
    }
}

/// Canonical identity of a side: the two hexes that share it, sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey([CubeCoord; 2]);

impl EdgeKey {
    /// Build a key from two hexes in any order
    pub fn new(a: CubeCoord, b: CubeCoord) -> Self {
        if a <= b {
            Self([a, b])
        } else {
            Self([b, a])
        }
    }

    /// The hexes sharing this side, sorted
    pub fn hexes(&self) -> &[CubeCoord; 2] {
        &self.0
    }
}
