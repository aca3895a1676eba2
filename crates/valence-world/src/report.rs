//! Text dump of the per-direction forces of every cell.

use crate::grid::Grid;
use std::fmt;
use valence_core::{Direction, Position};

const ROWS: [[Option<Direction>; 3]; 3] = [
    [Some(Direction::TopLeft), Some(Direction::Top), Some(Direction::TopRight)],
    [Some(Direction::Left), None, Some(Direction::Right)],
    [Some(Direction::BottomLeft), Some(Direction::Bottom), Some(Direction::BottomRight)],
];

/// Renders a grid as a 3N x 3N table: each cell shows its eight outer
/// forces around an `X`, one blank line between grid rows.
pub struct ForceReport<'a> {
    grid: &'a Grid,
}

impl<'a> ForceReport<'a> {
    pub fn new(grid: &'a Grid) -> Self {
        Self { grid }
    }
}

impl fmt::Display for ForceReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let size = self.grid.size();
        for y in 0..size {
            for row in &ROWS {
                for x in 0..size {
                    let particle = self.grid.get(Position::new(x, y));
                    for slot in row {
                        match slot {
                            Some(direction) => {
                                write!(f, "{:>6.1}|", particle.outer_force_at(*direction))?
                            }
                            None => write!(f, "{:>6}|", "X")?,
                        }
                    }
                }
                writeln!(f)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
