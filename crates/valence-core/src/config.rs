//! Configuration types for the simulation.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Proton, neutron and electron counts for a placed atom
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Nucleons {
    pub protons: u32,
    pub neutrons: u32,
    pub electrons: u32,
}

impl Nucleons {
    /// Neutral atom with equal counts, the default shape of a new atom
    pub fn uniform(count: u32) -> Self {
        Self {
            protons: count,
            neutrons: count,
            electrons: count,
        }
    }
}

/// How the lattice is populated before the first tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InitialOccupancy {
    /// Each cell is occupied with probability `occupancy` by a uniform atom
    /// whose count is drawn from `0..=max_count` (a zero draw stays empty).
    Random { occupancy: f32, max_count: u32 },
    /// Atoms on every cell whose row and column are both even, alternating
    /// between `even` and `odd` along the diagonal index `(x + y) / 2`.
    Parity { even: Nucleons, odd: Nucleons },
}

impl Default for InitialOccupancy {
    fn default() -> Self {
        InitialOccupancy::Random {
            occupancy: 0.1,
            max_count: 8,
        }
    }
}

/// Universe configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UniverseConfig {
    /// Side length of the square toroidal grid
    pub size: usize,
    /// Display size of one electron or nucleus square
    pub cell_pixel_size: u32,
    /// Random seed for reproducibility
    pub seed: u64,
    /// Initial population policy
    pub initial_occupancy: InitialOccupancy,
    /// Let two atoms pushing into each other trade places
    pub allow_swaps: bool,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            size: 9,
            cell_pixel_size: 8,
            seed: 0,
            initial_occupancy: InitialOccupancy::default(),
            allow_swaps: false,
        }
    }
}

impl UniverseConfig {
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(Error::InvalidConfig("universe size must be > 0".to_string()));
        }
        if let InitialOccupancy::Random { occupancy, .. } = self.initial_occupancy {
            if !(0.0..=1.0).contains(&occupancy) {
                return Err(Error::InvalidConfig(format!(
                    "occupancy must be within [0, 1], got {}",
                    occupancy
                )));
            }
        }
        Ok(())
    }
}

/// Front-end loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Simulation updates per second
    pub ticks_per_second: u32,
    /// Render attempts per second
    pub frames_per_second: u32,
    /// Stop after this many ticks (runs until interrupted when unset)
    pub max_ticks: Option<u64>,
    /// Rotate the rendered valence ring every frame
    pub electron_spin: bool,
    /// Dump the force table after every tick at debug level
    pub print_universe_on_update: bool,
    /// Emit logs as JSON lines
    pub log_json: bool,
    pub universe: UniverseConfig,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: 2,
            frames_per_second: 30,
            max_ticks: None,
            electron_spin: true,
            print_universe_on_update: false,
            log_json: false,
            universe: UniverseConfig::default(),
        }
    }
}

impl DriverConfig {
    /// Load a JSON configuration file; missing fields keep their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: DriverConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ticks_per_second == 0 {
            return Err(Error::InvalidConfig("ticks_per_second must be > 0".to_string()));
        }
        if self.frames_per_second == 0 {
            return Err(Error::InvalidConfig("frames_per_second must be > 0".to_string()));
        }
        self.universe.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs() {
        let universe = UniverseConfig::default();
        assert_eq!(universe.size, 9);
        assert!(!universe.allow_swaps);
        assert!(universe.validate().is_ok());

        let driver = DriverConfig::default();
        assert_eq!(driver.ticks_per_second, 2);
        assert!(driver.validate().is_ok());
    }

    #[test]
    fn test_invalid_universe_config() {
        let config = UniverseConfig {
            size: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = UniverseConfig {
            initial_occupancy: InitialOccupancy::Random {
                occupancy: 1.5,
                max_count: 8,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_driver_config() {
        let json = r#"{
            "ticks_per_second": 10,
            "universe": {
                "size": 16,
                "cell_pixel_size": 4,
                "seed": 7,
                "initial_occupancy": {
                    "kind": "parity",
                    "even": { "protons": 6, "neutrons": 6, "electrons": 6 },
                    "odd": { "protons": 2, "neutrons": 2, "electrons": 2 }
                },
                "allow_swaps": true
            }
        }"#;
        let config: DriverConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.ticks_per_second, 10);
        assert_eq!(config.frames_per_second, 30);
        assert_eq!(config.universe.size, 16);
        assert!(matches!(
            config.universe.initial_occupancy,
            InitialOccupancy::Parity { .. }
        ));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_config_file() {
        let result = DriverConfig::from_json_file("/definitely/not/here.json");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
