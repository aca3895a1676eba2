//! Atom state, derived pressures and the pairwise bond rule.

use rand::Rng;
use serde::{Deserialize, Serialize};
use valence_core::{Direction, Nucleons};

/// Number of positions on the valence shell
pub const SHELL_SLOTS: usize = 8;

/// Score both bond kinds must stay under for a pair to repel
const BOND_THRESHOLD: f64 = 50.0;

/// Valence electrons for a total electron count. A non-empty shell that
/// divides evenly into eight is full, not empty.
pub fn valence_electron_count(electrons: u32) -> u32 {
    match electrons % 8 {
        0 if electrons != 0 => 8,
        v => v,
    }
}

/// Spread `valence_electrons` filled slots over the shell, walking it from
/// `start` and keeping the filled/unfilled ratio close to the target.
pub fn valence_pattern(valence_electrons: u32, start: usize) -> [bool; SHELL_SLOTS] {
    debug_assert!(valence_electrons <= 8);
    let unfilled_target = 8 - valence_electrons;
    let mut filled = 1;
    let mut unfilled = 1;
    let mut pattern = [false; SHELL_SLOTS];

    for i in 0..SHELL_SLOTS {
        let slot = (i + start) % SHELL_SLOTS;
        if filled * unfilled_target < unfilled * valence_electrons {
            filled += 1;
            pattern[slot] = true;
        } else {
            unfilled += 1;
        }
    }

    pattern
}

/// How a pair of atoms relates when they meet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bond {
    None,
    Ionic,
    Covalent,
}

/// Raw bond likelihoods for a pair of atoms
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BondScores {
    pub ionic: f64,
    pub covalent: f64,
}

impl BondScores {
    pub fn bond(&self) -> Bond {
        if self.ionic < BOND_THRESHOLD && self.covalent < BOND_THRESHOLD {
            Bond::None
        } else if self.ionic > self.covalent {
            Bond::Ionic
        } else {
            Bond::Covalent
        }
    }
}

/// A lattice cell occupant. All counts zero means vacuum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    protons: u32,
    neutrons: u32,
    electrons: u32,
    valence_electrons: u32,
    valence: [bool; SHELL_SLOTS],
    outer_force: [f64; 8],
    pending: [bool; 8],
}

impl Default for Particle {
    fn default() -> Self {
        Self::empty()
    }
}

impl Particle {
    pub fn empty() -> Self {
        Self {
            protons: 0,
            neutrons: 0,
            electrons: 0,
            valence_electrons: 0,
            valence: [false; SHELL_SLOTS],
            outer_force: [0.0; 8],
            pending: [false; 8],
        }
    }

    /// Build an atom, starting the valence walk at a random shell position
    pub fn new<R: Rng>(nucleons: Nucleons, rng: &mut R) -> Self {
        let start = rng.gen_range(0..SHELL_SLOTS);
        Self::with_valence_start(nucleons, start)
    }

    /// Neutral atom with `count` of each particle
    pub fn uniform<R: Rng>(count: u32, rng: &mut R) -> Self {
        Self::new(Nucleons::uniform(count), rng)
    }

    pub fn with_valence_start(nucleons: Nucleons, start: usize) -> Self {
        let valence_electrons = valence_electron_count(nucleons.electrons);
        Self {
            protons: nucleons.protons,
            neutrons: nucleons.neutrons,
            electrons: nucleons.electrons,
            valence_electrons,
            valence: valence_pattern(valence_electrons, start),
            outer_force: [0.0; 8],
            pending: [false; 8],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.protons == 0 && self.neutrons == 0 && self.electrons == 0
    }

    pub fn protons(&self) -> u32 {
        self.protons
    }

    pub fn neutrons(&self) -> u32 {
        self.neutrons
    }

    pub fn electrons(&self) -> u32 {
        self.electrons
    }

    pub fn nucleons(&self) -> Nucleons {
        Nucleons {
            protons: self.protons,
            neutrons: self.neutrons,
            electrons: self.electrons,
        }
    }

    pub fn valence_electrons(&self) -> u32 {
        self.valence_electrons
    }

    pub fn valence(&self) -> &[bool; SHELL_SLOTS] {
        &self.valence
    }

    /// Protons minus electrons
    pub fn charge(&self) -> i64 {
        self.protons as i64 - self.electrons as i64
    }

    pub fn weight(&self) -> f64 {
        self.protons as f64 + self.neutrons as f64 * 1.125 + self.electrons as f64 * 0.01
    }

    /// Balance between protons and neutrons, scaled by size
    pub fn neutron_charge(&self) -> f64 {
        (self.protons as f64 - self.neutrons as f64 * 0.8) * (self.weight() / 2.0).sqrt()
    }

    /// Stability of the electron shell
    pub fn radial_pressure(&self) -> f64 {
        let shell = self.electrons % 8;
        let charge_coeff = (3 * self.charge()).abs() as f64;
        let valence_coeff = shell.min(8 - shell) as f64 * 12.0;
        let weight_coeff = self.weight() * 0.6;
        charge_coeff + valence_coeff + weight_coeff
    }

    /// Stability of the nucleus
    pub fn nucleoid_pressure(&self) -> f64 {
        let neutron_coeff = 3.0 * self.neutron_charge().abs();
        let size_coeff = (self.weight() / 2.0).sqrt();
        neutron_coeff * size_coeff
    }

    pub fn total_pressure(&self) -> f64 {
        self.radial_pressure() + self.nucleoid_pressure()
    }

    pub fn bond_scores(&self, other: &Particle) -> BondScores {
        let net_charge = (self.charge() + other.charge()).abs() as f64;
        let valence_diff = (self.valence_electrons as i64 - other.valence_electrons as i64).abs() as f64;
        let valence_ionic = (self.valence_electrons + other.valence_electrons) as f64;
        let valence_covalent =
            self.valence_electrons as f64 * 2.0 / 3.0 + other.valence_electrons as f64 * 2.0 / 3.0;

        let ionic = valence_diff * (1.0 / 6.0) * 100.0
            - (valence_ionic - 8.0).abs() * 12.0
            - net_charge * 12.0;
        let covalent = 100.0
            - valence_diff * 12.0
            - (valence_covalent - 8.0).abs() * 12.0
            - net_charge * 12.0;

        BondScores { ionic, covalent }
    }

    pub fn bond_with(&self, other: &Particle) -> Bond {
        if self.is_empty() || other.is_empty() {
            return Bond::None;
        }
        self.bond_scores(other).bond()
    }

    /// Pairwise force against `other`: positive pushes, negative pulls.
    /// Zero whenever either side is vacuum.
    pub fn measure_outer_pressure(&self, other: &Particle) -> f64 {
        if self.is_empty() || other.is_empty() {
            return 0.0;
        }
        let scores = self.bond_scores(other);
        let radial_diff = self.radial_pressure() - other.radial_pressure();

        match scores.bond() {
            Bond::None => (radial_diff + scores.ionic.abs()).abs(),
            Bond::Ionic => -(radial_diff - (scores.ionic / 10.0).abs()).abs(),
            Bond::Covalent => -(radial_diff - (scores.covalent / 10.0).abs()).abs(),
        }
    }

    pub fn outer_force_at(&self, direction: Direction) -> f64 {
        self.outer_force[direction.index()]
    }

    /// Whether the slot holds a fresh pairwise measurement awaiting aggregation
    pub fn is_pending(&self, direction: Direction) -> bool {
        self.pending[direction.index()]
    }

    pub fn has_pending(&self) -> bool {
        self.pending.iter().any(|&p| p)
    }

    /// Store a fresh pairwise measurement
    pub(crate) fn set_outer_pressure(&mut self, value: f64, direction: Direction) {
        self.outer_force[direction.index()] = value;
        self.pending[direction.index()] = true;
    }

    /// Store an aggregated value; the slot is final for this tick
    pub(crate) fn sync_pressure_at(&mut self, value: f64, direction: Direction) {
        self.outer_force[direction.index()] = value;
        self.pending[direction.index()] = false;
    }

    fn sum_forces(&self, directions: [Direction; 3]) -> f64 {
        directions.iter().map(|d| self.outer_force_at(*d)).sum()
    }

    /// Net force along x, positive to the right
    pub fn horizontal_force(&self) -> f64 {
        -self.sum_forces([Direction::TopLeft, Direction::Left, Direction::BottomLeft])
            + self.sum_forces([Direction::TopRight, Direction::Right, Direction::BottomRight])
    }

    /// Net force along y, positive downwards
    pub fn vertical_force(&self) -> f64 {
        -self.sum_forces([Direction::TopLeft, Direction::Top, Direction::TopRight])
            + self.sum_forces([Direction::BottomLeft, Direction::Bottom, Direction::BottomRight])
    }

    pub fn dx(&self) -> i64 {
        unit_step(self.horizontal_force())
    }

    pub fn dy(&self) -> i64 {
        unit_step(self.vertical_force())
    }

    /// Force projected onto the atom's own unit step
    pub fn step_strength(&self) -> f64 {
        self.horizontal_force() * self.dx() as f64 + self.vertical_force() * self.dy() as f64
    }
}

fn unit_step(force: f64) -> i64 {
    if force > 0.0 {
        1
    } else if force < 0.0 {
        -1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const EPS: f64 = 1e-9;

    fn carbon() -> Particle {
        Particle::with_valence_start(Nucleons::uniform(6), 0)
    }

    fn helium() -> Particle {
        Particle::with_valence_start(Nucleons::uniform(2), 0)
    }

    #[test]
    fn test_empty_particle() {
        let p = Particle::empty();
        assert!(p.is_empty());
        assert_eq!(p.valence_electrons(), 0);
        assert!(!p.valence().iter().any(|&v| v));
        assert_eq!(Particle::default(), p);
    }

    #[test]
    fn test_valence_electron_count() {
        assert_eq!(valence_electron_count(0), 0);
        assert_eq!(valence_electron_count(3), 3);
        assert_eq!(valence_electron_count(8), 8);
        assert_eq!(valence_electron_count(16), 8);
        assert_eq!(valence_electron_count(11), 3);
    }

    #[test]
    fn test_valence_pattern_spreads_electrons() {
        assert_eq!(
            valence_pattern(3, 0),
            [false, true, false, false, true, false, false, true]
        );
        assert_eq!(
            valence_pattern(1, 0),
            [false, false, false, false, false, false, false, true]
        );
        assert_eq!(valence_pattern(8, 5), [true; 8]);
        assert_eq!(valence_pattern(0, 2), [false; 8]);
    }

    #[test]
    fn test_valence_pattern_rotates_with_start() {
        let base = valence_pattern(3, 0);
        let shifted = valence_pattern(3, 2);
        for i in 0..SHELL_SLOTS {
            assert_eq!(shifted[(i + 2) % SHELL_SLOTS], base[i]);
        }
    }

    #[test]
    fn test_seeded_construction_is_reproducible() {
        let mut a = ChaCha8Rng::seed_from_u64(42);
        let mut b = ChaCha8Rng::seed_from_u64(42);
        for count in 0..12 {
            assert_eq!(Particle::uniform(count, &mut a), Particle::uniform(count, &mut b));
        }
    }

    #[test]
    fn test_seeded_valence_pattern() {
        // seed 42 starts the walk at slot 5
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let atom = Particle::new(Nucleons::uniform(3), &mut rng);
        assert_eq!(
            atom.valence(),
            &[false, true, false, false, true, false, true, false]
        );
        assert_eq!(atom, Particle::with_valence_start(Nucleons::uniform(3), 5));
        assert_eq!(atom.nucleons(), Nucleons::uniform(3));
    }

    #[test]
    fn test_derived_quantities() {
        let c = carbon();
        assert_eq!(c.charge(), 0);
        assert!((c.weight() - 12.81).abs() < EPS);
        assert!((c.radial_pressure() - 31.686).abs() < EPS);
        let expected_neutron_charge = (6.0 - 4.8) * (12.81f64 / 2.0).sqrt();
        assert!((c.neutron_charge() - expected_neutron_charge).abs() < EPS);
        let expected_nucleoid = 3.0 * expected_neutron_charge.abs() * (12.81f64 / 2.0).sqrt();
        assert!((c.nucleoid_pressure() - expected_nucleoid).abs() < EPS);
        assert!((c.total_pressure() - (31.686 + expected_nucleoid)).abs() < EPS);

        let he = helium();
        assert!((he.weight() - 4.27).abs() < EPS);
        assert!((he.radial_pressure() - 26.562).abs() < EPS);
    }

    #[test]
    fn test_charged_radial_pressure() {
        let ion = Particle::with_valence_start(
            Nucleons {
                protons: 3,
                neutrons: 4,
                electrons: 2,
            },
            0,
        );
        assert_eq!(ion.charge(), 1);
        // |3 * 1| + min(2, 6) * 12 + weight * 0.6
        let weight = 3.0 + 4.0 * 1.125 + 2.0 * 0.01;
        assert!((ion.radial_pressure() - (3.0 + 24.0 + weight * 0.6)).abs() < EPS);
    }

    #[test]
    fn test_ionic_bond() {
        let scores = carbon().bond_scores(&helium());
        assert!((scores.ionic - 200.0 / 3.0).abs() < EPS);
        assert!((scores.covalent - 20.0).abs() < EPS);
        assert_eq!(carbon().bond_with(&helium()), Bond::Ionic);

        // the radial difference is taken from the measuring side
        let forward = carbon().measure_outer_pressure(&helium());
        let backward = helium().measure_outer_pressure(&carbon());
        assert!((forward - -(31.686 - 26.562 - 20.0 / 3.0f64).abs()).abs() < EPS);
        assert!((backward - -(26.562 - 31.686 - 20.0 / 3.0f64).abs()).abs() < EPS);
        assert!(forward < 0.0 && backward < 0.0);
    }

    #[test]
    fn test_covalent_bond() {
        // four and four: no difference, perfect covalent sum
        let a = Particle::with_valence_start(Nucleons::uniform(4), 0);
        let scores = a.bond_scores(&a);
        let expected_covalent = 100.0 - (16.0 / 3.0 - 8.0f64).abs() * 12.0;
        assert!((scores.ionic - 0.0).abs() < EPS);
        assert!((scores.covalent - expected_covalent).abs() < EPS);
        assert_eq!(a.bond_with(&a), Bond::Covalent);
        let force = a.measure_outer_pressure(&a);
        assert!((force - -(expected_covalent / 10.0)).abs() < EPS);
    }

    #[test]
    fn test_no_bond_repels() {
        let h = Particle::with_valence_start(Nucleons::uniform(1), 0);
        let scores = h.bond_scores(&h);
        assert!((scores.ionic - -72.0).abs() < EPS);
        assert!((scores.covalent - 20.0).abs() < EPS);
        assert_eq!(h.bond_with(&h), Bond::None);
        assert!((h.measure_outer_pressure(&h) - 72.0).abs() < EPS);
    }

    #[test]
    fn test_empty_pairs_have_no_force() {
        let empty = Particle::empty();
        assert_eq!(carbon().measure_outer_pressure(&empty), 0.0);
        assert_eq!(empty.measure_outer_pressure(&carbon()), 0.0);
        assert_eq!(empty.measure_outer_pressure(&empty), 0.0);
        assert_eq!(empty.bond_with(&carbon()), Bond::None);
    }

    #[test]
    fn test_force_storage_flags() {
        let mut p = carbon();
        p.set_outer_pressure(3.5, Direction::Top);
        assert!(p.is_pending(Direction::Top));
        assert!(p.has_pending());
        assert_eq!(p.outer_force_at(Direction::Top), 3.5);

        p.sync_pressure_at(7.0, Direction::Top);
        assert!(!p.is_pending(Direction::Top));
        assert!(!p.has_pending());
        assert_eq!(p.outer_force_at(Direction::Top), 7.0);
    }

    #[test]
    fn test_net_force_and_steps() {
        let mut p = carbon();
        for dir in Direction::ALL {
            p.sync_pressure_at(0.0, dir);
        }
        assert_eq!((p.dx(), p.dy()), (0, 0));
        assert_eq!(p.step_strength(), 0.0);

        p.sync_pressure_at(-4.0, Direction::Left);
        p.sync_pressure_at(1.0, Direction::BottomRight);
        assert_eq!(p.horizontal_force(), 5.0);
        assert_eq!(p.vertical_force(), 1.0);
        assert_eq!((p.dx(), p.dy()), (1, 1));
        assert_eq!(p.step_strength(), 6.0);

        p.sync_pressure_at(3.0, Direction::Top);
        assert_eq!(p.vertical_force(), -2.0);
        assert_eq!(p.dy(), -1);
    }

    proptest! {
        #[test]
        fn valence_pattern_fills_exact_count(electrons in 0u32..64, start in 0usize..8) {
            let v = valence_electron_count(electrons);
            let filled = valence_pattern(v, start).iter().filter(|&&s| s).count();
            prop_assert_eq!(filled as u32, v);
        }

        #[test]
        fn bond_scores_are_symmetric(a in 0u32..20, b in 0u32..20) {
            let pa = Particle::with_valence_start(Nucleons::uniform(a), 0);
            let pb = Particle::with_valence_start(Nucleons::uniform(b), 0);
            prop_assert_eq!(pa.bond_scores(&pb), pb.bond_scores(&pa));
        }
    }
}
