//! Stored risk records.
//!
//! A record pairs an input with the output the formula engine produced
//! for it. The pairing is a tagged sum type, so a qualitative input can
//! never sit next to a quantitative output.

use crate::{
    band::RiskBand,
    error::{RiskError, RiskResult},
    formula::{score_qualitative, score_quantitative},
    model::{QualitativeInput, QualitativeOutput, QuantitativeInput, QuantitativeOutput},
    types::{RecordId, Timestamp},
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskKind {
    Qualitative,
    Quantitative,
}

impl RiskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Qualitative  => "qualitative",
            Self::Quantitative => "quantitative",
        }
    }
}

impl fmt::Display for RiskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskKind {
    type Err = RiskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "qualitative"  => Ok(Self::Qualitative),
            "quantitative" => Ok(Self::Quantitative),
            other => Err(RiskError::validation(
                "type",
                format!("expected 'qualitative' or 'quantitative', got '{other}'"),
            )),
        }
    }
}

/// An input together with its computed output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Assessment {
    Qualitative {
        input:  QualitativeInput,
        output: QualitativeOutput,
    },
    Quantitative {
        input:  QuantitativeInput,
        output: QuantitativeOutput,
    },
}

impl Assessment {
    /// Validate and score a qualitative input.
    pub fn qualitative(input: QualitativeInput) -> RiskResult<Self> {
        let output = score_qualitative(&input)?;
        Ok(Self::Qualitative { input, output })
    }

    /// Validate and score a quantitative input.
    pub fn quantitative(input: QuantitativeInput) -> RiskResult<Self> {
        let output = score_quantitative(&input)?;
        Ok(Self::Quantitative { input, output })
    }

    pub fn kind(&self) -> RiskKind {
        match self {
            Self::Qualitative { .. }  => RiskKind::Qualitative,
            Self::Quantitative { .. } => RiskKind::Quantitative,
        }
    }

    /// Inherent magnitude: severity score for qualitative records,
    /// inherent ALE for quantitative ones. The two are different units.
    pub fn inherent_magnitude(&self) -> f64 {
        match self {
            Self::Qualitative { output, .. }  => output.inherent_severity as f64,
            Self::Quantitative { output, .. } => output.ale_inherent,
        }
    }

    /// Residual counterpart of `inherent_magnitude`.
    pub fn residual_magnitude(&self) -> f64 {
        match self {
            Self::Qualitative { output, .. }  => output.residual_severity as f64,
            Self::Quantitative { output, .. } => output.ale_residual,
        }
    }

    /// Inherent band. Quantitative records are not banded.
    pub fn inherent_band(&self) -> Option<RiskBand> {
        match self {
            Self::Qualitative { output, .. } => Some(output.inherent_band),
            Self::Quantitative { .. }        => None,
        }
    }

    /// Inherent ALE, for quantitative records only.
    pub fn ale_inherent(&self) -> Option<f64> {
        match self {
            Self::Qualitative { .. }          => None,
            Self::Quantitative { output, .. } => Some(output.ale_inherent),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskRecord {
    pub id: RecordId,
    #[serde(flatten)]
    pub assessment: Assessment,
    pub created_at: Timestamp,
}

impl RiskRecord {
    pub fn kind(&self) -> RiskKind {
        self.assessment.kind()
    }
}
