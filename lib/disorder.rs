//! Sources of random on-site energies.
//!
//! A disorder generator yields one real sample per call; the RNG it draws
//! from is owned by whichever term or driver advances it, re-seeded per
//! realization by policy outside this crate.

use rand::Rng;

/// One real sample per invocation.
pub trait DisorderGenerator {
    fn sample<R>(&self, rng: &mut R) -> f64
    where R: Rng + ?Sized;
}

/// Samples uniformly from `[min, max)`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct UniformDisorder {
    min: f64,
    max: f64,
}

impl UniformDisorder {
    /// *Panics* if `min >= max`.
    pub fn new(min: f64, max: f64) -> Self {
        if min >= max {
            panic!("UniformDisorder::new: min must be below max");
        }
        Self { min, max }
    }
}

impl DisorderGenerator for UniformDisorder {
    fn sample<R>(&self, rng: &mut R) -> f64
    where R: Rng + ?Sized
    {
        rng.gen_range(self.min..self.max)
    }
}
