//! Service facade tests — the path request handlers take.

use riskcalc_core::{
    band::RiskBand,
    config::RiskConfig,
    error::RiskError,
    model::{QualitativeInput, QuantitativeInput},
    query::RiskQuery,
    record::{Assessment, RiskKind},
    service::RiskService,
    store::RiskStore,
    sweep::SweepAxis,
};

fn build() -> RiskService {
    RiskService::build_test().with_seed(0x1111_AAAA)
}

#[test]
fn created_records_are_scored_atomically() {
    let mut service = build();
    let record = service
        .create_qualitative(QualitativeInput::new("Core DB", "SQL injection", 4, 5).with_controls(0.5, 0.6))
        .unwrap();

    let stored = service.require(&record.id).unwrap();
    match &stored.assessment {
        Assessment::Qualitative { output, .. } => {
            assert_eq!(output.residual_severity, 8);
            assert_eq!(output.residual_band, RiskBand::Moderate);
        }
        other => panic!("expected qualitative record, got {other:?}"),
    }
}

#[test]
fn invalid_input_creates_nothing() {
    let mut service = build();
    let err = service
        .create_quantitative(QuantitativeInput::new(1000.0, 1.5, 1.0))
        .unwrap_err();
    assert!(matches!(err, RiskError::Validation { ref field, .. } if field == "exposureFactor"));
    assert!(service.store().is_empty());
}

#[test]
fn update_rescores_the_record() {
    let mut service = build();
    let record = service
        .create_quantitative(QuantitativeInput::new(1_000_000.0, 0.3, 2.0))
        .unwrap();

    let updated = service
        .update_quantitative(
            &record.id,
            QuantitativeInput::new(1_000_000.0, 0.3, 2.0).with_controls(50_000.0, 0.5, 0.4),
        )
        .unwrap()
        .unwrap();

    match updated.assessment {
        Assessment::Quantitative { output, .. } => {
            assert!((output.net_residual - 290_000.0).abs() < 1e-6)
        }
        other => panic!("expected quantitative record, got {other:?}"),
    }
    assert!(service
        .update_qualitative("missing", QualitativeInput::new("a", "t", 1, 1))
        .unwrap()
        .is_none());
}

#[test]
fn require_and_delete_report_missing_ids() {
    let mut service = build();
    let err = service.require("nope").unwrap_err();
    assert!(matches!(err, RiskError::NotFound { .. }));
    assert_eq!(err.code(), "NOT_FOUND");
    assert!(!service.delete("nope"));
}

#[test]
fn find_all_validates_page_bounds() {
    let service = build();
    let err = service.find_all(&RiskQuery::default().page(1, 500)).unwrap_err();
    assert!(matches!(err, RiskError::Validation { ref field, .. } if field == "pageSize"));
    assert!(service.find_all(&RiskQuery::default()).unwrap().items.is_empty());
}

#[test]
fn omitted_page_size_takes_configured_default() {
    let mut config = RiskConfig::default_test();
    config.pagination.default_page_size = 3;
    let mut service = RiskService::new(config, RiskStore::in_memory());
    for likelihood in 1..=5 {
        service
            .create_qualitative(QualitativeInput::new("asset", "threat", likelihood, 3))
            .unwrap();
    }

    let query: RiskQuery = serde_json::from_str("{}").unwrap();
    let page = service.find_all(&query).unwrap();
    assert_eq!(page.items.len(), 3, "configured defaultPageSize should apply");
    assert_eq!(page.page_size, 3);
    assert_eq!(page.total, 5);
    assert!(page.has_next_page());

    // An explicit size still wins over the configured default.
    let page = service.find_all(&RiskQuery::default().page(1, 5)).unwrap();
    assert_eq!(page.items.len(), 5);
}

#[test]
fn seed_defaults_only_fills_an_empty_store() {
    let mut service = build();
    let seeded = service.seed_defaults().unwrap();
    assert_eq!(seeded.len(), 2);
    assert_eq!(seeded[0].kind(), RiskKind::Qualitative);
    assert_eq!(seeded[1].kind(), RiskKind::Quantitative);

    assert!(service.seed_defaults().unwrap().is_empty());
    assert_eq!(service.stats().total, 2);
}

#[test]
fn simulate_applies_config_defaults_and_cap() {
    let mut service = build();
    let input = QuantitativeInput::new(1_000_000.0, 0.3, 2.0);

    let summary = service.simulate(&input, None, None).unwrap();
    assert_eq!(summary.iterations, 1000);
    assert!(summary.min <= summary.mean && summary.mean <= summary.max);

    let flat = service.simulate(&input, Some(10), Some(0.0)).unwrap();
    assert!((flat.mean - 600_000.0).abs() < 1e-6);
    assert_eq!(flat.min, flat.max);

    let cap = service.config.simulation.max_iterations;
    let err = service.simulate(&input, Some(cap + 1), None).unwrap_err();
    assert!(matches!(err, RiskError::Validation { ref field, .. } if field == "iterations"));
    assert!(service.store().is_empty(), "simulation must not touch the store");
}

#[test]
fn seeded_services_simulate_identically() {
    let input = QuantitativeInput::new(250_000.0, 0.4, 1.5).with_controls(5_000.0, 0.3, 0.2);
    let a = RiskService::build_test().with_seed(7).simulate(&input, Some(2_000), Some(0.3)).unwrap();
    let b = RiskService::build_test().with_seed(7).simulate(&input, Some(2_000), Some(0.3)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn sweep_goes_through_service() {
    let service = build();
    let input = QuantitativeInput::new(1_000_000.0, 0.3, 2.0);
    let points = service.sweep(&input, SweepAxis::DetectionCapability, 3).unwrap();
    let residuals: Vec<f64> = points.iter().map(|p| p.output.ale_residual).collect();
    assert!((residuals[0] - 600_000.0).abs() < 1e-6);
    assert!((residuals[1] - 450_000.0).abs() < 1e-6);
    assert!((residuals[2] - 300_000.0).abs() < 1e-6);
}

#[test]
fn config_defaults_match_documented_values() {
    let config: RiskConfig = serde_json::from_str(r#"{"persistPath":"data/risks.json"}"#).unwrap();
    assert_eq!(config.persist_path.as_deref(), Some("data/risks.json"));
    assert_eq!(config.debounce_ms, 1000);
    assert_eq!(config.simulation.default_iterations, 1000);
    assert_eq!(config.simulation.default_volatility, 0.2);
    assert_eq!(config.pagination.default_page_size, 10);
    assert_eq!(config.pagination.max_page_size, 100);

    let test = RiskConfig::default_test();
    assert!(test.persist_path.is_none());
    assert!(test.open_backend().unwrap().is_none());
}

#[test]
fn service_over_existing_store() {
    let mut store = RiskStore::in_memory();
    store.create(Assessment::qualitative(QualitativeInput::new("a", "t", 3, 3)).unwrap());
    let service = RiskService::new(RiskConfig::default_test(), store);
    assert_eq!(service.stats().by_band.get(&RiskBand::Moderate), Some(&1));
}
