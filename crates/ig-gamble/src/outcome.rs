//! Random outcome source for rolls

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Supplies one uniform draw in [0, 1) per roll
pub trait OutcomeSource: Send + Sync {
    fn draw(&self) -> f64;
}

/// A roll wins when its draw falls strictly below the chance
///
/// `chance` 0 never wins, 1 always wins.
#[inline]
pub fn is_win(draw: f64, chance: f64) -> bool {
    draw < chance
}

/// Thread-local RNG (production default)
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngSource;

impl OutcomeSource for ThreadRngSource {
    fn draw(&self) -> f64 {
        rand::rng().random::<f64>()
    }
}

/// Seeded RNG for reproducible sessions
pub struct SeededSource {
    rng: Mutex<StdRng>,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl OutcomeSource for SeededSource {
    fn draw(&self) -> f64 {
        self.rng.lock().random::<f64>()
    }
}

/// Always returns the same draw
#[derive(Debug, Clone, Copy)]
pub struct FixedDraw(pub f64);

impl OutcomeSource for FixedDraw {
    fn draw(&self) -> f64 {
        self.0
    }
}
