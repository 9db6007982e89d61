use crate::core::traits::RandomSource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A seedable random generator implementing [`RandomSource`]
#[derive(Debug, Clone)]
pub struct Random {
    rng: StdRng,
}

impl Random {
    /// Constructor, with random seed
    pub fn new() -> Self {
        Random {
            rng: StdRng::from_entropy(),
        }
    }

    /// Constructor, with specific seed
    pub fn with_seed(seed: u64) -> Self {
        Random {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded when `seed` is given, entropy seeded otherwise
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::with_seed(seed),
            None => Self::new(),
        }
    }
}

impl Default for Random {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for Random {
    fn next_uniform(&mut self) -> f64 {
        // gen::<f64>() is uniform over [0, 1)
        self.rng.gen::<f64>()
    }

    fn next_index(&mut self, bound: usize) -> usize {
        self.rng.gen_range(0..bound)
    }
}
