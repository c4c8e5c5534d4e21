//! Conversational spurs.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Unique prompts handed out at random until none remain, then a constant
/// fallback forever.
#[derive(Debug, Clone)]
pub struct SpurPool {
    remaining: Vec<String>,
    fallback: String,
    rng: StdRng,
}

impl SpurPool {
    /// Create a pool; duplicate spurs are dropped.
    pub fn new(
        spurs: impl IntoIterator<Item = String>,
        fallback: impl Into<String>,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut pool = Self {
            remaining: Vec::new(),
            fallback: fallback.into(),
            rng,
        };
        pool.extend(spurs);
        pool
    }

    /// Add a spur unless an identical one is still unused.
    pub fn add(&mut self, spur: impl Into<String>) {
        let spur = spur.into();
        if !self.remaining.contains(&spur) {
            self.remaining.push(spur);
        }
    }

    /// Add several spurs.
    pub fn extend(&mut self, spurs: impl IntoIterator<Item = String>) {
        for spur in spurs {
            self.add(spur);
        }
    }

    /// Take a random unused spur, or the fallback once all are used.
    pub fn next_spur(&mut self) -> String {
        if self.remaining.is_empty() {
            return self.fallback.clone();
        }
        let index = self.rng.gen_range(0..self.remaining.len());
        let spur = self.remaining.swap_remove(index);
        if self.remaining.is_empty() {
            debug!("spur pool exhausted");
        }
        spur
    }

    /// Number of unused spurs.
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    /// Whether only the fallback is left.
    pub fn is_exhausted(&self) -> bool {
        self.remaining.is_empty()
    }

    /// The constant fallback spur.
    pub fn fallback(&self) -> &str {
        &self.fallback
    }
}
