//! Square grid coordinate system.
//!
//! This module provides the coordinate types for the tile board:
//! - `GridPos`: Identifies a cell on the unbounded board
//! - `Direction`: One of the four cardinal directions a tile edge faces
//!
//! North is `+y`. Positions are pure cell indices; no render scale ever
//! enters the arithmetic.

use serde::{Deserialize, Serialize};

/// Cardinal direction of a tile edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Top edge (`+y`)
    North,
    /// Right edge (`+x`)
    East,
    /// Bottom edge (`-y`)
    South,
    /// Left edge (`-x`)
    West,
}

impl Direction {
    /// All directions in clockwise order starting from North
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Unit offset `(dx, dy)` of this direction
    pub const fn offset(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::East => (1, 0),
            Direction::South => (0, -1),
            Direction::West => (-1, 0),
        }
    }

    /// The direction facing the other way
    pub const fn opposite(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Clockwise index (North = 0 .. West = 3)
    pub const fn index(&self) -> usize {
        match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
        }
    }

    /// Direction for a clockwise index, wrapping modulo 4
    pub const fn from_index(index: usize) -> Direction {
        Direction::ALL[index % 4]
    }
}

/// Cell coordinate on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct GridPos {
    /// Column (increases going east)
    pub x: i32,
    /// Row (increases going north)
    pub y: i32,
}

impl GridPos {
    /// The cell the starter tile occupies
    pub const ORIGIN: GridPos = GridPos::new(0, 0);

    /// Create a new grid position
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Get the neighbor in a specific direction
    pub const fn neighbor(&self, direction: Direction) -> GridPos {
        let (dx, dy) = direction.offset();
        GridPos::new(self.x + dx, self.y + dy)
    }

    /// The four edge-sharing neighbors in clockwise order starting from North
    pub fn neighbors(&self) -> [GridPos; 4] {
        Direction::ALL.map(|dir| self.neighbor(dir))
    }

    /// The eight cells of the 3x3 block around this one (cardinal and diagonal)
    pub fn surrounding(&self) -> [GridPos; 8] {
        [
            GridPos::new(self.x, self.y + 1),
            GridPos::new(self.x + 1, self.y + 1),
            GridPos::new(self.x + 1, self.y),
            GridPos::new(self.x + 1, self.y - 1),
            GridPos::new(self.x, self.y - 1),
            GridPos::new(self.x - 1, self.y - 1),
            GridPos::new(self.x - 1, self.y),
            GridPos::new(self.x - 1, self.y + 1),
        ]
    }

    /// Manhattan distance to another cell
    pub fn distance_to(&self, other: &GridPos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl std::fmt::Display for GridPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
