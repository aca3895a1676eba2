//! Publishing completed generations to readers on other threads.

use crate::grid::Grid;
use crate::universe::TickStats;
use parking_lot::RwLock;
use std::sync::Arc;

/// A completed, immutable generation
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub number: u64,
    pub grid: Grid,
    pub stats: TickStats,
}

/// Single-writer handoff of the latest generation.
///
/// The tick owner publishes whole generations; readers clone the `Arc` out
/// and never observe a grid while it is being updated.
#[derive(Debug, Clone)]
pub struct GenerationHandoff {
    latest: Arc<RwLock<Arc<Generation>>>,
}

impl GenerationHandoff {
    pub fn new(initial: Generation) -> Self {
        Self {
            latest: Arc::new(RwLock::new(Arc::new(initial))),
        }
    }

    /// Replace the published generation
    pub fn publish(&self, generation: Generation) {
        let generation = Arc::new(generation);
        *self.latest.write() = generation;
    }

    /// The most recently published generation
    pub fn latest(&self) -> Arc<Generation> {
        self.latest.read().clone()
    }
}
