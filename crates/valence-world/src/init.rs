//! Initial population policies.

use crate::particle::Particle;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;
use valence_core::{InitialOccupancy, Nucleons, Position};

/// Decides the occupant of each cell when a universe is created.
///
/// Cells are visited row-major, and the same rng is threaded through every
/// call, so a seeded rng reproduces the same lattice and valence patterns.
/// Any `FnMut(Position, &mut ChaCha8Rng) -> Particle` closure is an initializer.
pub trait Initializer {
    fn particle_at(&mut self, pos: Position, rng: &mut ChaCha8Rng) -> Particle;
}

impl<F> Initializer for F
where
    F: FnMut(Position, &mut ChaCha8Rng) -> Particle,
{
    fn particle_at(&mut self, pos: Position, rng: &mut ChaCha8Rng) -> Particle {
        self(pos, rng)
    }
}

/// Sparse uniform-random population
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomOccupancy {
    pub occupancy: f32,
    pub max_count: u32,
}

impl Initializer for RandomOccupancy {
    fn particle_at(&mut self, pos: Position, rng: &mut ChaCha8Rng) -> Particle {
        if rng.gen::<f32>() >= self.occupancy {
            return Particle::empty();
        }
        let count = rng.gen_range(0..=self.max_count);
        let particle = Particle::uniform(count, rng);
        if !particle.is_empty() {
            debug!(
                position = %pos,
                count,
                radial_pressure = particle.radial_pressure(),
                nucleoid_pressure = particle.nucleoid_pressure(),
                "Placed atom"
            );
        }
        particle
    }
}

/// Deterministic lattice on even rows and columns, alternating two atoms
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParityPattern {
    pub even: Nucleons,
    pub odd: Nucleons,
}

impl Initializer for ParityPattern {
    fn particle_at(&mut self, pos: Position, rng: &mut ChaCha8Rng) -> Particle {
        if pos.x % 2 != 0 || pos.y % 2 != 0 {
            return Particle::empty();
        }
        let nucleons = if ((pos.x + pos.y) / 2) % 2 == 0 {
            self.even
        } else {
            self.odd
        };
        Particle::new(nucleons, rng)
    }
}

/// Initializer described by a configuration
pub fn from_config(occupancy: &InitialOccupancy) -> Box<dyn Initializer + Send> {
    match *occupancy {
        InitialOccupancy::Random {
            occupancy,
            max_count,
        } => Box::new(RandomOccupancy {
            occupancy,
            max_count,
        }),
        InitialOccupancy::Parity { even, odd } => Box::new(ParityPattern { even, odd }),
    }
}
