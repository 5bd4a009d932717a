//! Random number sources for the simulation engine.
//!
//! RULE: The simulation never reaches for a platform RNG directly.
//! All draws go through a UniformSource, so tests can inject a seeded
//! generator and get reproducible summaries.
//!
//! Parallel runs derive one stream per trial from (master_seed, trial_index).
//! A trial's draws therefore do not depend on which thread evaluates it
//! or on how many threads the pool has.

use crate::error::{RiskError, RiskResult};
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// Anything that yields uniform floats in [0.0, 1.0).
pub trait UniformSource {
    fn next_f64(&mut self) -> f64;
}

/// Seedable PCG generator used by the engine.
pub struct SimRng {
    inner: Pcg64Mcg,
}

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    /// Seeded from OS entropy. Not reproducible.
    pub fn from_entropy() -> Self {
        Self {
            inner: Pcg64Mcg::from_entropy(),
        }
    }

    /// Stream for one trial of a parallel run.
    pub fn for_trial(master_seed: u64, trial_index: u64) -> Self {
        let derived_seed = master_seed ^ (trial_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self::seeded(derived_seed)
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }
}

impl UniformSource for SimRng {
    fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }
}

/// Replays a fixed sequence of draws, cycling when exhausted.
/// Useful for pinning a simulation to known perturbations.
pub struct FixedSequence {
    values: Vec<f64>,
    cursor: usize,
}

impl FixedSequence {
    pub fn new(values: Vec<f64>) -> RiskResult<Self> {
        if values.is_empty() {
            return Err(RiskError::validation("values", "needs at least one draw"));
        }
        Ok(Self { values, cursor: 0 })
    }
}

impl UniformSource for FixedSequence {
    fn next_f64(&mut self) -> f64 {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}
