//! Risk formula engine — pure functions, no state.
//!
//! Detection capability is applied at half weight in both models.
//! Residual likelihood and impact are floored at 1 so strong controls
//! can never produce a zero severity.

use crate::{
    band::band_from_score,
    error::RiskResult,
    model::{QualitativeInput, QualitativeOutput, QuantitativeInput, QuantitativeOutput},
};

pub const DETECTION_WEIGHT: f64 = 0.5;

/// Likelihood × impact scoring with control mitigation.
/// Rounding is half away from zero: 3.5 rounds to 4.
pub fn assess_qualitative(input: &QualitativeInput) -> QualitativeOutput {
    let likelihood = input.likelihood as f64;
    let impact = input.impact as f64;

    let inherent_severity = input.likelihood as u32 * input.impact as u32;

    let residual_likelihood = floor_one(likelihood * (1.0 - input.control_effectiveness));
    let residual_impact =
        floor_one(impact * (1.0 - input.detection_capability * DETECTION_WEIGHT));
    let residual_severity = residual_likelihood * residual_impact;

    QualitativeOutput {
        inherent_severity,
        residual_likelihood,
        residual_impact,
        residual_severity,
        inherent_band: band_from_score(inherent_severity),
        residual_band: band_from_score(residual_severity),
    }
}

/// SLE/ALE loss-expectancy model. No rounding is applied.
pub fn assess_quantitative(input: &QuantitativeInput) -> QuantitativeOutput {
    let sle = input.asset_value * input.exposure_factor;
    let ale_inherent = sle * input.annualized_rate_of_occurrence;
    let ale_residual = ale_inherent
        * (1.0 - input.control_effectiveness)
        * (1.0 - input.detection_capability * DETECTION_WEIGHT);
    let net_residual = ale_residual + input.control_cost;

    QuantitativeOutput {
        sle,
        ale_inherent,
        ale_residual,
        net_residual,
    }
}

/// Validate, then assess.
pub fn score_qualitative(input: &QualitativeInput) -> RiskResult<QualitativeOutput> {
    input.validate()?;
    Ok(assess_qualitative(input))
}

/// Validate, then assess.
pub fn score_quantitative(input: &QuantitativeInput) -> RiskResult<QuantitativeOutput> {
    input.validate()?;
    Ok(assess_quantitative(input))
}

fn floor_one(value: f64) -> u32 {
    (value.round() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_one_rounds_half_away_from_zero() {
        assert_eq!(floor_one(2.5), 3);
        assert_eq!(floor_one(3.5), 4);
        assert_eq!(floor_one(3.49), 3);
        assert_eq!(floor_one(0.4), 1);
        assert_eq!(floor_one(0.0), 1);
    }
}
