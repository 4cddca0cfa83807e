use rand::prelude::*;

use super::*;

/// Spawn strategy that is purely random, reproducible from its seed.
#[derive(Clone, Debug)]
pub struct RandomSpawner {
    rng: SmallRng,
}

impl RandomSpawner {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl TileSpawner for RandomSpawner {
    fn pick_index(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len)
    }

    fn draw(&mut self) -> f64 {
        self.rng.random()
    }
}
