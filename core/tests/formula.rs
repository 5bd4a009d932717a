//! Formula engine and banding tests.

use riskcalc_core::{
    band::{band_from_score, heatmap_cell_color, RiskBand},
    error::RiskError,
    formula::{assess_qualitative, assess_quantitative, score_qualitative, score_quantitative},
    model::{QualitativeInput, QuantitativeInput},
};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn band_thresholds_at_every_boundary() {
    let cases = [
        (1, RiskBand::Low),
        (5, RiskBand::Low),
        (6, RiskBand::Moderate),
        (10, RiskBand::Moderate),
        (11, RiskBand::High),
        (15, RiskBand::High),
        (16, RiskBand::Extreme),
        (25, RiskBand::Extreme),
    ];
    for (score, expected) in cases {
        assert_eq!(band_from_score(score), expected, "score {score}");
    }
}

#[test]
fn inherent_severity_is_likelihood_times_impact() {
    for likelihood in 1..=5u8 {
        for impact in 1..=5u8 {
            let out = assess_qualitative(&QualitativeInput::new("a", "t", likelihood, impact));
            let score = likelihood as u32 * impact as u32;
            assert_eq!(out.inherent_severity, score);
            assert_eq!(out.inherent_band, band_from_score(score));
            // No controls: residual equals inherent.
            assert_eq!(out.residual_severity, score);
        }
    }
}

/// Rounding rule: half away from zero. 5 × (1 − 0.6 × 0.5) = 3.5 → 4.
#[test]
fn residual_with_controls_rounds_half_away_from_zero() {
    let input = QualitativeInput::new("Test Asset", "Test threat", 4, 5).with_controls(0.5, 0.6);
    let out = assess_qualitative(&input);

    assert_eq!(out.inherent_severity, 20);
    assert_eq!(out.inherent_band, RiskBand::Extreme);
    assert_eq!(out.residual_likelihood, 2);
    assert_eq!(out.residual_impact, 4);
    assert_eq!(out.residual_severity, 8);
    assert_eq!(out.residual_band, RiskBand::Moderate);
}

#[test]
fn residual_factors_never_fall_below_one() {
    for likelihood in 1..=5u8 {
        for impact in 1..=5u8 {
            let input = QualitativeInput::new("a", "t", likelihood, impact).with_controls(1.0, 1.0);
            let out = assess_qualitative(&input);
            assert!(out.residual_likelihood >= 1, "likelihood floor broken");
            assert!(out.residual_impact >= 1, "impact floor broken");
            assert!(out.residual_severity >= 1, "severity floor broken");
        }
    }
    let out = assess_qualitative(&QualitativeInput::new("a", "t", 5, 1).with_controls(0.99, 0.0));
    assert_eq!(out.residual_likelihood, 1);
    assert_eq!(out.residual_severity, 1);
    assert_eq!(out.residual_band, RiskBand::Low);
}

#[test]
fn quantitative_without_controls() {
    let out = assess_quantitative(&QuantitativeInput::new(1_000_000.0, 0.3, 2.0));
    assert!(approx(out.sle, 300_000.0), "sle {}", out.sle);
    assert!(approx(out.ale_inherent, 600_000.0), "ale {}", out.ale_inherent);
    assert!(approx(out.ale_residual, 600_000.0));
    assert!(approx(out.net_residual, 600_000.0));
}

#[test]
fn quantitative_with_controls_adds_control_cost() {
    let input = QuantitativeInput::new(1_000_000.0, 0.3, 2.0).with_controls(50_000.0, 0.5, 0.4);
    let out = assess_quantitative(&input);
    assert!(approx(out.ale_residual, 240_000.0), "ale residual {}", out.ale_residual);
    assert!(approx(out.net_residual, 290_000.0), "net residual {}", out.net_residual);
}

#[test]
fn score_rejects_out_of_range_fields() {
    let err = score_qualitative(&QualitativeInput::new("a", "t", 6, 1)).unwrap_err();
    assert!(matches!(err, RiskError::Validation { ref field, .. } if field == "likelihood"));

    let err = score_qualitative(&QualitativeInput::new("", "t", 1, 1)).unwrap_err();
    assert!(matches!(err, RiskError::Validation { ref field, .. } if field == "assetName"));

    let err = score_qualitative(&QualitativeInput::new("a", "t", 1, 1).with_controls(1.5, 0.0))
        .unwrap_err();
    assert!(matches!(err, RiskError::Validation { ref field, .. } if field == "controlEffectiveness"));

    let err = score_quantitative(&QuantitativeInput::new(-1.0, 0.5, 1.0)).unwrap_err();
    assert!(matches!(err, RiskError::Validation { ref field, .. } if field == "assetValue"));

    let err = score_quantitative(&QuantitativeInput::new(1.0, f64::NAN, 1.0)).unwrap_err();
    assert!(matches!(err, RiskError::Validation { ref field, .. } if field == "exposureFactor"));
    assert_eq!(err.code(), "VALIDATION_ERROR");
}

#[test]
fn heatmap_uses_its_own_palette() {
    assert_eq!(heatmap_cell_color(1, 1), "#b7e4c7");
    assert_eq!(heatmap_cell_color(2, 3), "#ffd166");
    assert_eq!(heatmap_cell_color(3, 4), "#f8961e");
    assert_eq!(heatmap_cell_color(5, 5), "#e63946");
    assert_eq!(RiskBand::Extreme.badge_color(), "#7C2D12");
}

#[test]
fn optional_controls_default_to_zero_when_deserialized() {
    let input: QualitativeInput = serde_json::from_str(
        r#"{"assetName":"CRM","threatDescription":"Phishing","likelihood":3,"impact":4}"#,
    )
    .unwrap();
    assert_eq!(input.control_effectiveness, 0.0);
    assert_eq!(input.detection_capability, 0.0);

    let input: QuantitativeInput = serde_json::from_str(
        r#"{"assetValue":50000,"exposureFactor":0.3,"annualizedRateOfOccurrence":0.5}"#,
    )
    .unwrap();
    assert_eq!(input.control_cost, 0.0);
}
