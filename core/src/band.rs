//! Severity banding and the colour tables keyed by band.
//!
//! RULE: The badge palette and the heatmap palette are independent tables.
//! Both are keyed by the same RiskBand, but a view must pick one explicitly.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest score reachable from the 1–5 × 1–5 qualitative grid.
pub const MAX_SCORE: u32 = 25;

/// Side length of the likelihood × impact heatmap.
pub const GRID_SIZE: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskBand {
    Low,
    Moderate,
    High,
    Extreme,
}

impl RiskBand {
    pub const ALL: [RiskBand; 4] = [Self::Low, Self::Moderate, Self::High, Self::Extreme];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low      => "Low",
            Self::Moderate => "Moderate",
            Self::High     => "High",
            Self::Extreme  => "Extreme",
        }
    }

    /// Inclusive score range covered by this band.
    pub fn score_range(&self) -> (u32, u32) {
        match self {
            Self::Low      => (1, 5),
            Self::Moderate => (6, 10),
            Self::High     => (11, 15),
            Self::Extreme  => (16, MAX_SCORE),
        }
    }

    /// Colour used by severity lists and badges.
    pub fn badge_color(&self) -> &'static str {
        match self {
            Self::Low      => "#10B981",
            Self::Moderate => "#F59E0B",
            Self::High     => "#EF4444",
            Self::Extreme  => "#7C2D12",
        }
    }

    /// Colour used by heatmap cells.
    pub fn heatmap_color(&self) -> &'static str {
        match self {
            Self::Low      => "#b7e4c7",
            Self::Moderate => "#ffd166",
            Self::High     => "#f8961e",
            Self::Extreme  => "#e63946",
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Map a qualitative severity score to its band.
/// Scores outside 1..=25 are not reachable from validated input.
pub fn band_from_score(score: u32) -> RiskBand {
    if score <= 5 {
        RiskBand::Low
    } else if score <= 10 {
        RiskBand::Moderate
    } else if score <= 15 {
        RiskBand::High
    } else {
        RiskBand::Extreme
    }
}

/// Heatmap colour for a likelihood/impact cell.
pub fn heatmap_cell_color(likelihood: u8, impact: u8) -> &'static str {
    band_from_score(likelihood as u32 * impact as u32).heatmap_color()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapCell {
    pub likelihood: u8,
    pub impact:     u8,
    pub score:      u32,
    pub band:       RiskBand,
    pub color:      &'static str,
}

/// The full 5×5 grid, rows ordered by likelihood descending so row 0
/// is the top of the rendered chart.
pub fn heatmap_grid() -> Vec<Vec<HeatmapCell>> {
    (1..=GRID_SIZE)
        .rev()
        .map(|likelihood| {
            (1..=GRID_SIZE)
                .map(|impact| {
                    let score = likelihood as u32 * impact as u32;
                    let band = band_from_score(score);
                    HeatmapCell {
                        likelihood,
                        impact,
                        score,
                        band,
                        color: band.heatmap_color(),
                    }
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_ranges_agree_with_band_from_score() {
        for band in RiskBand::ALL {
            let (lo, hi) = band.score_range();
            assert_eq!(band_from_score(lo), band, "lower edge of {band}");
            assert_eq!(band_from_score(hi), band, "upper edge of {band}");
        }
    }

    #[test]
    fn palettes_are_distinct_per_band() {
        for band in RiskBand::ALL {
            assert_ne!(band.badge_color(), band.heatmap_color(), "{band}");
        }
    }

    #[test]
    fn grid_top_left_is_likelihood_five() {
        let grid = heatmap_grid();
        assert_eq!(grid.len(), 5);
        assert!(grid.iter().all(|row| row.len() == 5));
        assert_eq!(grid[0][0].likelihood, 5);
        assert_eq!(grid[0][0].impact, 1);
        assert_eq!(grid[0][4].score, 25);
        assert_eq!(grid[0][4].band, RiskBand::Extreme);
        assert_eq!(grid[4][0].color, "#b7e4c7");
    }
}
