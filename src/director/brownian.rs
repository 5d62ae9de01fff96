//! Random-walk director
//!
//! Picks one of the four directions uniformly and keeps it only if the
//! target cell is free in the snapshot it was given.

use parking_lot::Mutex;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::core::types::{MoveIntent, Position};
use crate::director::Director;
use crate::map::Snapshot;

/// Shared by every obstacle worker; the random source is serialized so
/// concurrent draws never race and seeded runs stay reproducible
pub struct BrownianDirector {
    rng: Mutex<ChaCha8Rng>,
}

impl Default for BrownianDirector {
    fn default() -> Self {
        Self::new()
    }
}

impl BrownianDirector {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::from_entropy()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    fn sample(&self) -> MoveIntent {
        let mut rng = self.rng.lock();
        MoveIntent::DIRECTIONS
            .choose(&mut *rng)
            .copied()
            .unwrap_or(MoveIntent::Stay)
    }
}

impl Director for BrownianDirector {
    fn decide(&self, at: Position, snapshot: &Snapshot) -> MoveIntent {
        let direction = self.sample();
        if snapshot.is_available(at.step(direction)) {
            direction
        } else {
            MoveIntent::Stay
        }
    }
}
