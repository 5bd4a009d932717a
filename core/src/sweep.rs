//! Scenario sweep: one control parameter stepped evenly across [0, 1].
//!
//! Unlike the Monte Carlo simulation this is a structured sweep. Every
//! other input is held fixed and the full quantitative output is
//! recomputed at each point.

use crate::{
    error::{RiskError, RiskResult},
    formula::assess_quantitative,
    model::{QuantitativeInput, QuantitativeOutput},
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SweepAxis {
    ControlEffectiveness,
    DetectionCapability,
}

impl FromStr for SweepAxis {
    type Err = RiskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "controlEffectiveness" => Ok(Self::ControlEffectiveness),
            "detectionCapability"  => Ok(Self::DetectionCapability),
            other => Err(RiskError::validation(
                "axis",
                format!("unknown sweep axis '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepPoint {
    pub value:  f64,
    pub output: QuantitativeOutput,
}

/// `steps` points inclusive of both endpoints. One step yields a single
/// point at 0.
pub fn sweep_controls(
    input: &QuantitativeInput,
    axis: SweepAxis,
    steps: usize,
) -> RiskResult<Vec<SweepPoint>> {
    input.validate()?;
    if steps == 0 {
        return Err(RiskError::validation("steps", "must be at least 1"));
    }

    let points = (0..steps)
        .map(|i| {
            let value = if steps == 1 {
                0.0
            } else {
                i as f64 / (steps - 1) as f64
            };
            let mut sample = input.clone();
            match axis {
                SweepAxis::ControlEffectiveness => sample.control_effectiveness = value,
                SweepAxis::DetectionCapability  => sample.detection_capability = value,
            }
            SweepPoint {
                value,
                output: assess_quantitative(&sample),
            }
        })
        .collect();
    Ok(points)
}
