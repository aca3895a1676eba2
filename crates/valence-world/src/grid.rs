//! Square toroidal lattice of particles.

use crate::init::Initializer;
use crate::particle::Particle;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use valence_core::{safe_wrap, Direction, Position};

/// A square toroidal grid stored row-major in a flat buffer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    size: usize,
    cells: Vec<Particle>,
}

impl Grid {
    /// Grid of vacuum. `size` must be non-zero.
    pub fn new(size: usize) -> Self {
        debug_assert!(size > 0, "grid must have at least one cell");
        Self {
            size,
            cells: vec![Particle::empty(); size * size],
        }
    }

    /// Populate every cell from an initializer, visiting rows top to bottom
    pub fn populate<I: Initializer + ?Sized>(
        size: usize,
        initializer: &mut I,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let mut grid = Self::new(size);
        for y in 0..size {
            for x in 0..size {
                let particle = initializer.particle_at(Position::new(x, y), rng);
                grid.set(Position::new(x, y), particle);
            }
        }
        grid
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of cells, `size * size`
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Reduce a position onto the torus
    pub fn wrap(&self, pos: Position) -> Position {
        Position::new(
            safe_wrap(pos.x as i64, self.size),
            safe_wrap(pos.y as i64, self.size),
        )
    }

    /// Get particle at position, wrapping out-of-range coordinates
    pub fn get(&self, pos: Position) -> &Particle {
        &self.cells[self.pos_to_index(self.wrap(pos))]
    }

    pub fn get_mut(&mut self, pos: Position) -> &mut Particle {
        let index = self.pos_to_index(self.wrap(pos));
        &mut self.cells[index]
    }

    pub fn set(&mut self, pos: Position, particle: Particle) {
        let index = self.pos_to_index(self.wrap(pos));
        self.cells[index] = particle;
    }

    pub(crate) fn at(&self, index: usize) -> &Particle {
        &self.cells[index]
    }

    pub(crate) fn at_mut(&mut self, index: usize) -> &mut Particle {
        &mut self.cells[index]
    }

    /// Wrapped position of the neighbour in `direction`
    pub fn neighbor(&self, pos: Position, direction: Direction) -> Position {
        let (dx, dy) = direction.to_delta();
        pos.offset(dx, dy, self.size)
    }

    pub(crate) fn neighbor_index(&self, index: usize, direction: Direction) -> usize {
        let pos = self.index_to_pos(index);
        self.pos_to_index(self.neighbor(pos, direction))
    }

    /// Reset every cell to vacuum
    pub fn clear(&mut self) {
        self.cells.fill(Particle::empty());
    }

    /// Number of non-empty cells
    pub fn particle_count(&self) -> usize {
        self.cells.iter().filter(|p| !p.is_empty()).count()
    }

    pub(crate) fn pos_to_index(&self, pos: Position) -> usize {
        debug_assert!(
            pos.x < self.size && pos.y < self.size,
            "position {} outside a grid of size {}",
            pos,
            self.size
        );
        pos.y * self.size + pos.x
    }

    /// Get position from index
    pub fn index_to_pos(&self, index: usize) -> Position {
        Position::new(index % self.size, index / self.size)
    }

    /// Iterator over all particles with positions
    pub fn iter(&self) -> impl Iterator<Item = (Position, &Particle)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, particle)| (self.index_to_pos(i), particle))
    }

    /// Visit every cell in row-major order as `(y, x, particle)`
    pub fn for_each_cell<F>(&self, mut visitor: F)
    where
        F: FnMut(usize, usize, &Particle),
    {
        for (pos, particle) in self.iter() {
            visitor(pos.y, pos.x, particle);
        }
    }
}
