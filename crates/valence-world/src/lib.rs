//! World simulation engine.
//!
//! A toroidal lattice of atoms that push and pull on their neighbours and
//! migrate into empty cells, one generation per tick.

pub mod grid;
pub mod handoff;
pub mod init;
pub mod particle;
pub mod report;
pub mod universe;

pub use grid::Grid;
pub use handoff::{Generation, GenerationHandoff};
pub use init::{Initializer, ParityPattern, RandomOccupancy};
pub use particle::{Bond, BondScores, Particle};
pub use report::ForceReport;
pub use universe::{TickStats, Universe};
