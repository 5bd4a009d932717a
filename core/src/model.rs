//! Assessment inputs and outputs.
//!
//! Inputs carry their own declared constraints via `validate()`.
//! The formula engine assumes validated input and never re-checks.

use crate::{
    band::RiskBand,
    error::{RiskError, RiskResult},
    types::Money,
};
use serde::{Deserialize, Serialize};

// ── Qualitative ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualitativeInput {
    pub asset_name:         String,
    pub threat_description: String,
    pub likelihood:         u8,
    pub impact:             u8,
    #[serde(default)]
    pub control_effectiveness: f64,
    #[serde(default)]
    pub detection_capability:  f64,
}

impl QualitativeInput {
    /// Input with no controls applied.
    pub fn new(
        asset_name: impl Into<String>,
        threat_description: impl Into<String>,
        likelihood: u8,
        impact: u8,
    ) -> Self {
        Self {
            asset_name: asset_name.into(),
            threat_description: threat_description.into(),
            likelihood,
            impact,
            control_effectiveness: 0.0,
            detection_capability: 0.0,
        }
    }

    pub fn with_controls(mut self, control_effectiveness: f64, detection_capability: f64) -> Self {
        self.control_effectiveness = control_effectiveness;
        self.detection_capability = detection_capability;
        self
    }

    pub fn validate(&self) -> RiskResult<()> {
        require_non_empty("assetName", &self.asset_name)?;
        require_non_empty("threatDescription", &self.threat_description)?;
        require_scale("likelihood", self.likelihood)?;
        require_scale("impact", self.impact)?;
        require_fraction("controlEffectiveness", self.control_effectiveness)?;
        require_fraction("detectionCapability", self.detection_capability)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualitativeOutput {
    pub inherent_severity:   u32,
    pub residual_likelihood: u32,
    pub residual_impact:     u32,
    pub residual_severity:   u32,
    pub inherent_band:       RiskBand,
    pub residual_band:       RiskBand,
}

// ── Quantitative ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantitativeInput {
    pub asset_value:                   Money,
    pub exposure_factor:               f64,
    pub annualized_rate_of_occurrence: f64,
    #[serde(default)]
    pub control_cost:          Money,
    #[serde(default)]
    pub control_effectiveness: f64,
    #[serde(default)]
    pub detection_capability:  f64,
}

impl QuantitativeInput {
    /// Input with no controls and no control cost.
    pub fn new(asset_value: Money, exposure_factor: f64, annualized_rate_of_occurrence: f64) -> Self {
        Self {
            asset_value,
            exposure_factor,
            annualized_rate_of_occurrence,
            control_cost: 0.0,
            control_effectiveness: 0.0,
            detection_capability: 0.0,
        }
    }

    pub fn with_controls(
        mut self,
        control_cost: Money,
        control_effectiveness: f64,
        detection_capability: f64,
    ) -> Self {
        self.control_cost = control_cost;
        self.control_effectiveness = control_effectiveness;
        self.detection_capability = detection_capability;
        self
    }

    pub fn validate(&self) -> RiskResult<()> {
        require_non_negative("assetValue", self.asset_value)?;
        require_fraction("exposureFactor", self.exposure_factor)?;
        require_non_negative("annualizedRateOfOccurrence", self.annualized_rate_of_occurrence)?;
        require_non_negative("controlCost", self.control_cost)?;
        require_fraction("controlEffectiveness", self.control_effectiveness)?;
        require_fraction("detectionCapability", self.detection_capability)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantitativeOutput {
    pub sle:          Money,
    pub ale_inherent: Money,
    pub ale_residual: Money,
    pub net_residual: Money,
}

// ── Constraint helpers ─────────────────────────────────────────────

fn require_non_empty(field: &str, value: &str) -> RiskResult<()> {
    if value.is_empty() {
        return Err(RiskError::validation(field, "must not be empty"));
    }
    Ok(())
}

fn require_scale(field: &str, value: u8) -> RiskResult<()> {
    if !(1..=5).contains(&value) {
        return Err(RiskError::validation(
            field,
            format!("must be an integer between 1 and 5, got {value}"),
        ));
    }
    Ok(())
}

pub(crate) fn require_fraction(field: &str, value: f64) -> RiskResult<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(RiskError::validation(
            field,
            format!("must be between 0 and 1, got {value}"),
        ));
    }
    Ok(())
}

pub(crate) fn require_non_negative(field: &str, value: f64) -> RiskResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(RiskError::validation(
            field,
            format!("must be a non-negative number, got {value}"),
        ));
    }
    Ok(())
}
