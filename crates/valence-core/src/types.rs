//! Core type definitions for the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reduce a coordinate onto the torus `[0, size)`.
///
/// `size` must be non-zero.
pub fn safe_wrap(n: i64, size: usize) -> usize {
    debug_assert!(size > 0, "cannot wrap onto an empty axis");
    n.rem_euclid(size as i64) as usize
}

/// Cell coordinate on the lattice, `y` is the row and `x` the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Offset this position and wrap it onto a square torus of side `size`
    pub fn offset(&self, dx: i64, dy: i64, size: usize) -> Self {
        Self {
            x: safe_wrap(self.x as i64 + dx, size),
            y: safe_wrap(self.y as i64 + dy, size),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.y, self.x)
    }
}

/// One of the eight compass slots around a cell.
///
/// The discriminants are the slot indices used by per-direction arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    TopLeft = 0,
    Top = 1,
    TopRight = 2,
    Right = 3,
    BottomRight = 4,
    Bottom = 5,
    BottomLeft = 6,
    Left = 7,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::TopLeft,
        Direction::Top,
        Direction::TopRight,
        Direction::Right,
        Direction::BottomRight,
        Direction::Bottom,
        Direction::BottomLeft,
        Direction::Left,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Unit offset `(dx, dy)`; `dy` grows downwards
    pub fn to_delta(self) -> (i64, i64) {
        match self {
            Direction::TopLeft => (-1, -1),
            Direction::Top => (0, -1),
            Direction::TopRight => (1, -1),
            Direction::Right => (1, 0),
            Direction::BottomRight => (1, 1),
            Direction::Bottom => (0, 1),
            Direction::BottomLeft => (-1, 1),
            Direction::Left => (-1, 0),
        }
    }

    /// Direction of an offset by sign only. `None` for `(0, 0)`.
    pub fn from_delta(dx: i64, dy: i64) -> Option<Direction> {
        let dir = match (dx.signum(), dy.signum()) {
            (0, 0) => return None,
            (0, 1) => Direction::Bottom,
            (0, _) => Direction::Top,
            (1, 0) => Direction::Right,
            (1, 1) => Direction::BottomRight,
            (1, _) => Direction::TopRight,
            (_, 0) => Direction::Left,
            (_, 1) => Direction::BottomLeft,
            (_, _) => Direction::TopLeft,
        };
        Some(dir)
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::TopLeft => Direction::BottomRight,
            Direction::Top => Direction::Bottom,
            Direction::TopRight => Direction::BottomLeft,
            Direction::Right => Direction::Left,
            Direction::BottomRight => Direction::TopLeft,
            Direction::Bottom => Direction::Top,
            Direction::BottomLeft => Direction::TopRight,
            Direction::Left => Direction::Right,
        }
    }

    pub fn is_corner(self) -> bool {
        matches!(
            self,
            Direction::TopLeft | Direction::TopRight | Direction::BottomRight | Direction::BottomLeft
        )
    }
}

/// Input forwarded by the front end. Nothing reacts to it yet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    PointerMoved { x: i32, y: i32 },
    PointerPressed { x: i32, y: i32 },
    Key(char),
}
