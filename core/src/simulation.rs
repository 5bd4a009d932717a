//! Monte Carlo sensitivity simulation over quantitative inputs.
//!
//! Each trial perturbs exposure factor and annual rate of occurrence by a
//! symmetric relative factor `1 + (U − 0.5) × 2 × volatility`, clamps them
//! back into their domains, and recomputes net residual loss.
//! Trials are independent; only the input is shared, read-only.

use crate::{
    error::{RiskError, RiskResult},
    formula::assess_quantitative,
    model::QuantitativeInput,
    rng::{SimRng, UniformSource},
    types::Money,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ITERATIONS: usize = 1000;
pub const DEFAULT_VOLATILITY: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParams {
    pub iterations: usize,
    pub volatility: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            volatility: DEFAULT_VOLATILITY,
        }
    }
}

impl SimulationParams {
    pub fn new(iterations: usize, volatility: f64) -> Self {
        Self { iterations, volatility }
    }

    /// Reject empty runs, runs above the caller's iteration cap, and
    /// negative or non-finite volatility.
    pub fn validate(&self, max_iterations: usize) -> RiskResult<()> {
        if self.iterations == 0 {
            return Err(RiskError::validation("iterations", "must be at least 1"));
        }
        if self.iterations > max_iterations {
            return Err(RiskError::validation(
                "iterations",
                format!("must not exceed {max_iterations}, got {}", self.iterations),
            ));
        }
        if !self.volatility.is_finite() || self.volatility < 0.0 {
            return Err(RiskError::validation(
                "volatility",
                format!("must be a non-negative number, got {}", self.volatility),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSummary {
    pub iterations: usize,
    pub mean:       Money,
    pub min:        Money,
    pub max:        Money,
}

/// Run `params.iterations` trials sequentially, drawing from `rng`.
pub fn run_simulation(
    input: &QuantitativeInput,
    params: SimulationParams,
    rng: &mut impl UniformSource,
) -> RiskResult<SimulationSummary> {
    input.validate()?;
    params.validate(usize::MAX)?;

    let results: Vec<Money> = (0..params.iterations)
        .map(|_| run_trial(input, params.volatility, rng))
        .collect();
    Ok(summarize(&results))
}

/// Run trials on the rayon pool. Trial `i` draws from its own stream
/// derived from `(master_seed, i)`, so the summary is a pure function of
/// the arguments.
pub fn run_simulation_parallel(
    input: &QuantitativeInput,
    params: SimulationParams,
    master_seed: u64,
) -> RiskResult<SimulationSummary> {
    input.validate()?;
    params.validate(usize::MAX)?;

    let results: Vec<Money> = (0..params.iterations)
        .into_par_iter()
        .map(|i| {
            let mut rng = SimRng::for_trial(master_seed, i as u64);
            run_trial(input, params.volatility, &mut rng)
        })
        .collect();
    Ok(summarize(&results))
}

fn run_trial(input: &QuantitativeInput, volatility: f64, rng: &mut impl UniformSource) -> Money {
    let exposure_factor = perturb(input.exposure_factor, volatility, rng).clamp(0.0, 1.0);
    let rate = perturb(input.annualized_rate_of_occurrence, volatility, rng).max(0.0);

    let sample = QuantitativeInput {
        exposure_factor,
        annualized_rate_of_occurrence: rate,
        ..input.clone()
    };
    assess_quantitative(&sample).net_residual
}

fn perturb(value: f64, volatility: f64, rng: &mut impl UniformSource) -> f64 {
    value * (1.0 + (rng.next_f64() - 0.5) * 2.0 * volatility)
}

/// Non-empty slice only; callers validate iterations first.
fn summarize(results: &[Money]) -> SimulationSummary {
    let min = results.iter().copied().fold(f64::INFINITY, f64::min);
    let max = results.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = results.iter().sum::<f64>() / results.len() as f64;

    SimulationSummary {
        iterations: results.len(),
        // Summation error must not push the mean outside the observed range.
        mean: mean.clamp(min, max),
        min,
        max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarize_identical_values_is_exact() {
        let values = vec![0.1; 3];
        let summary = summarize(&values);
        assert_eq!(summary.mean, 0.1);
        assert_eq!(summary.min, 0.1);
        assert_eq!(summary.max, 0.1);
    }

    #[test]
    fn perturb_spans_plus_minus_volatility() {
        let mut low = crate::rng::FixedSequence::new(vec![0.0]).unwrap();
        let mut mid = crate::rng::FixedSequence::new(vec![0.5]).unwrap();
        assert!((perturb(100.0, 0.2, &mut low) - 80.0).abs() < 1e-9);
        assert_eq!(perturb(100.0, 0.2, &mut mid), 100.0);
    }
}
