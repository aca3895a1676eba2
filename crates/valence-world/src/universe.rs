//! Two-generation universe and its three-phase tick.

use crate::grid::Grid;
use crate::handoff::Generation;
use crate::init::{self, Initializer};
use crate::particle::Particle;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use valence_core::{Direction, Error, InputEvent, Position, Result, UniverseConfig};

/// Order in which a cell finalizes its pending slots during aggregation
const SYNC_ORDER: [Direction; 8] = [
    Direction::TopLeft,
    Direction::TopRight,
    Direction::BottomLeft,
    Direction::BottomRight,
    Direction::Top,
    Direction::Bottom,
    Direction::Left,
    Direction::Right,
];

/// Movement outcome of a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickStats {
    /// Generation number the tick produced
    pub generation: u64,
    pub particles: usize,
    /// Atoms that claimed and entered an empty cell
    pub moves: usize,
    /// Pairs of atoms that traded places
    pub swaps: usize,
    /// Atoms that wanted to move but stayed
    pub blocked: usize,
}

/// The simulated lattice.
///
/// `current` is the published generation; `next` is scratch space that
/// receives the movement results and is swapped in at the end of a tick.
pub struct Universe {
    config: UniverseConfig,
    current: Grid,
    next: Grid,
    generation: u64,
    last_stats: TickStats,
}

impl Universe {
    /// Create a universe populated by the initializer named in the config
    pub fn new(config: UniverseConfig) -> Result<Self> {
        let mut initializer = init::from_config(&config.initial_occupancy);
        Self::with_initializer(config, initializer.as_mut())
    }

    /// Create a universe populated by a custom initializer
    pub fn with_initializer<I: Initializer + ?Sized>(
        config: UniverseConfig,
        initializer: &mut I,
    ) -> Result<Self> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let grid = Grid::populate(config.size, initializer, &mut rng);
        Self::from_grid(config, grid)
    }

    /// Wrap an existing lattice
    pub fn from_grid(config: UniverseConfig, grid: Grid) -> Result<Self> {
        config.validate()?;
        if grid.size() != config.size {
            return Err(Error::InvalidConfig(format!(
                "grid of size {} does not match configured size {}",
                grid.size(),
                config.size
            )));
        }

        let particles = grid.particle_count();
        info!(
            size = config.size,
            seed = config.seed,
            particles,
            "Universe created"
        );

        Ok(Self {
            next: Grid::new(config.size),
            current: grid,
            generation: 0,
            last_stats: TickStats {
                particles,
                ..Default::default()
            },
            config,
        })
    }

    pub fn config(&self) -> &UniverseConfig {
        &self.config
    }

    /// The latest completed generation
    pub fn current(&self) -> &Grid {
        &self.current
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn last_stats(&self) -> TickStats {
        self.last_stats
    }

    pub fn particle_count(&self) -> usize {
        self.current.particle_count()
    }

    /// Read-only visit of the current generation as `(y, x, particle)`
    pub fn for_each_cell<F>(&self, visitor: F)
    where
        F: FnMut(usize, usize, &Particle),
    {
        self.current.for_each_cell(visitor);
    }

    /// Top-left pixel of a cell's 3x3 block of shell squares
    pub fn pixel_origin(&self, pos: Position) -> (u32, u32) {
        let block = self.config.cell_pixel_size * 3;
        (pos.x as u32 * block, pos.y as u32 * block)
    }

    /// Copy of the current generation for readers on other threads
    pub fn snapshot(&self) -> Generation {
        Generation {
            number: self.generation,
            grid: self.current.clone(),
            stats: self.last_stats,
        }
    }

    pub fn handle_event(&mut self, event: InputEvent) {
        trace!(?event, "Input ignored");
    }

    /// Advance exactly one generation
    #[instrument(skip(self), fields(generation = self.generation))]
    pub fn tick(&mut self) -> TickStats {
        self.measure_forces();
        self.sync_forces();
        let stats = self.resolve_movement();

        std::mem::swap(&mut self.current, &mut self.next);
        self.generation += 1;
        self.last_stats = stats;

        debug!(
            particles = stats.particles,
            moves = stats.moves,
            swaps = stats.swaps,
            blocked = stats.blocked,
            "Tick complete"
        );
        stats
    }

    /// Phase 1: measure every shared edge once, writing both sides.
    fn measure_forces(&mut self) {
        let size = self.current.size();
        for index in 0..self.current.len() {
            let pos = self.current.index_to_pos(index);
            for off_x in -1..=1 {
                for off_y in -1..=1 {
                    let Some(side) = Direction::from_delta(off_x, off_y) else {
                        continue;
                    };
                    let other = self.current.pos_to_index(pos.offset(off_x, off_y, size));
                    self.set_force_for(index, other, side);
                }
            }
        }
    }

    fn set_force_for(&mut self, index: usize, other: usize, side: Direction) {
        let grid = &mut self.current;
        if grid.at(index).is_pending(side) {
            return;
        }
        let other_side = side.opposite();
        debug_assert!(
            !grid.at(other).is_pending(other_side),
            "edge {:?} of cell {} measured from one side only",
            other_side,
            other
        );

        let (me, them) = (grid.at(index), grid.at(other));
        let force = me.measure_outer_pressure(them);
        if !me.is_empty() && !them.is_empty() {
            trace!(
                from = %grid.index_to_pos(index),
                to = %grid.index_to_pos(other),
                bond = ?me.bond_with(them),
                force,
                "Measured bond"
            );
        }

        grid.at_mut(index).set_outer_pressure(force, side);
        grid.at_mut(other).set_outer_pressure(force, other_side);
    }

    /// Phase 2: replace each pairwise value by the sum over every slot that
    /// borders the same edge or corner.
    fn sync_forces(&mut self) {
        for index in 0..self.current.len() {
            for side in SYNC_ORDER {
                if self.current.at(index).is_pending(side) {
                    self.sync_slot(index, side);
                }
            }
        }
        debug_assert!(
            !self.current.iter().any(|(_, p)| p.has_pending()),
            "aggregation left pending slots"
        );
    }

    fn sync_slot(&mut self, index: usize, side: Direction) {
        let members = self.shared_slots(index, side);
        debug_assert!(
            members
                .iter()
                .all(|&(cell, slot)| self.current.at(cell).is_pending(slot)),
            "slot group of cell {} {:?} partially aggregated",
            index,
            side
        );

        let total: f64 = members
            .iter()
            .map(|&(cell, slot)| self.current.at(cell).outer_force_at(slot))
            .sum();
        for &(cell, slot) in &members {
            self.current.at_mut(cell).sync_pressure_at(total, slot);
        }
    }

    /// Every `(cell, slot)` facing the same edge or corner as `side` of `index`.
    /// Corners are shared by four cells, edges by two.
    fn shared_slots(&self, index: usize, side: Direction) -> Vec<(usize, Direction)> {
        let grid = &self.current;
        let mut members = vec![
            (index, side),
            (grid.neighbor_index(index, side), side.opposite()),
        ];

        if side.is_corner() {
            let (dx, dy) = side.to_delta();
            let vertical = Direction::from_delta(0, dy);
            let horizontal = Direction::from_delta(dx, 0);
            let across_vertical = Direction::from_delta(dx, -dy);
            let across_horizontal = Direction::from_delta(-dx, dy);
            if let (Some(v), Some(h), Some(v_slot), Some(h_slot)) =
                (vertical, horizontal, across_vertical, across_horizontal)
            {
                members.push((grid.neighbor_index(index, v), v_slot));
                members.push((grid.neighbor_index(index, h), h_slot));
            }
        }

        members
    }

    /// Where the atom at `index` wants to go, if anywhere
    fn destination(&self, index: usize) -> Option<usize> {
        let particle = self.current.at(index);
        let (dx, dy) = (particle.dx(), particle.dy());
        if dx == 0 && dy == 0 {
            return None;
        }
        let pos = self.current.index_to_pos(index);
        Some(self.current.pos_to_index(pos.offset(dx, dy, self.current.size())))
    }

    /// The neighbour of the empty cell `target` pushing into it hardest.
    /// Ties go to the first claimant in compass order around the target.
    fn contention_winner(&self, target: usize) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for side in Direction::ALL {
            let candidate = self.current.neighbor_index(target, side);
            let particle = self.current.at(candidate);
            if particle.is_empty() || self.destination(candidate) != Some(target) {
                continue;
            }
            let strength = particle.step_strength();
            if best.map_or(true, |(_, s)| strength > s) {
                best = Some((candidate, strength));
            }
        }
        best.map(|(index, _)| index)
    }

    /// Phase 3: place every atom into `next`.
    fn resolve_movement(&mut self) -> TickStats {
        self.next.clear();
        let mut stats = TickStats {
            generation: self.generation + 1,
            ..Default::default()
        };

        for index in 0..self.current.len() {
            let particle = *self.current.at(index);
            if particle.is_empty() {
                continue;
            }
            stats.particles += 1;

            let placed = match self.destination(index) {
                None => index,
                Some(target) if target == index => index,
                Some(target) if !self.current.at(target).is_empty() => {
                    if self.config.allow_swaps && self.destination(target) == Some(index) {
                        if index < target {
                            stats.swaps += 1;
                        }
                        target
                    } else {
                        stats.blocked += 1;
                        index
                    }
                }
                Some(target) => {
                    if self.contention_winner(target) == Some(index) {
                        stats.moves += 1;
                        target
                    } else {
                        stats.blocked += 1;
                        index
                    }
                }
            };

            trace!(
                from = %self.current.index_to_pos(index),
                to = %self.current.index_to_pos(placed),
                dx = particle.dx(),
                dy = particle.dy(),
                strength = particle.step_strength(),
                "Resolved movement"
            );
            debug_assert!(
                self.next.at(placed).is_empty(),
                "two atoms placed into cell {}",
                placed
            );
            *self.next.at_mut(placed) = particle;
        }

        debug_assert_eq!(
            self.next.particle_count(),
            stats.particles,
            "movement changed the number of atoms"
        );
        stats
    }
}
