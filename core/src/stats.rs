//! Aggregate statistics over the record set.
//!
//! `avg_inherent` / `avg_residual` blend severity scores (1–25) with ALE
//! currency amounts into one number. That figure is kept for
//! compatibility with existing consumers; the per-kind averages next to it
//! are the ones worth reading.

use crate::{
    band::RiskBand,
    record::{RiskKind, RiskRecord},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KindAverages {
    pub count:        usize,
    pub avg_inherent: f64,
    pub avg_residual: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskStats {
    pub total:        usize,
    /// Only kinds that are present appear.
    pub by_type:      BTreeMap<RiskKind, usize>,
    /// Inherent band of qualitative records. Quantitative records have no band.
    pub by_band:      BTreeMap<RiskBand, usize>,
    pub avg_inherent: f64,
    pub avg_residual: f64,
    pub qualitative:  KindAverages,
    pub quantitative: KindAverages,
}

pub fn compute_stats(records: &[RiskRecord]) -> RiskStats {
    let mut stats = RiskStats {
        total: records.len(),
        ..RiskStats::default()
    };

    let mut inherent_sum = 0.0;
    let mut residual_sum = 0.0;
    let mut per_kind: BTreeMap<RiskKind, (f64, f64)> = BTreeMap::new();

    for record in records {
        let kind = record.kind();
        *stats.by_type.entry(kind).or_insert(0) += 1;

        if let Some(band) = record.assessment.inherent_band() {
            *stats.by_band.entry(band).or_insert(0) += 1;
        }

        let inherent = record.assessment.inherent_magnitude();
        let residual = record.assessment.residual_magnitude();
        inherent_sum += inherent;
        residual_sum += residual;

        let sums = per_kind.entry(kind).or_insert((0.0, 0.0));
        sums.0 += inherent;
        sums.1 += residual;
    }

    if stats.total > 0 {
        stats.avg_inherent = inherent_sum / stats.total as f64;
        stats.avg_residual = residual_sum / stats.total as f64;
    }

    for (kind, (inherent, residual)) in per_kind {
        let count = stats.by_type.get(&kind).copied().unwrap_or(0);
        let averages = KindAverages {
            count,
            avg_inherent: inherent / count as f64,
            avg_residual: residual / count as f64,
        };
        match kind {
            RiskKind::Qualitative  => stats.qualitative = averages,
            RiskKind::Quantitative => stats.quantitative = averages,
        }
    }

    stats
}
