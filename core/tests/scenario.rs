use cartproj_core::{
    engine::ProjectionEngine,
    scenario::{Scenario, YearMap},
    ProjError,
};
use serde_json::json;

fn data_path(rel: &str) -> String {
    format!("{}/../data/{rel}", env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn minimal_scenario_defaults_every_knob_to_inert() {
    let s = Scenario::from_value(json!({
        "start_year": 2025,
        "start_month": 7,
        "projection_years": 5,
        "partner_sales_by_year": { "1": 30, "2": 71 }
    }))
    .unwrap();

    assert!(!s.apply_inflation);
    assert!(!s.apply_reduction);
    assert!(!s.enable_service);
    assert_eq!(s.cost_reduction, 0.0);
    assert_eq!(s.service_adoption, 0.0);
    assert!(s.direct_sales_by_year.is_empty());
    assert!(s.selling_price_reduction_by_year.is_empty());
    assert_eq!(s.partner_target(1), 30.0);
    assert_eq!(s.partner_target(3), 0.0);
    assert_eq!(s.direct_target(1), 0.0);
    assert_eq!(s.price_reduction(2), 0.0);
}

#[test]
fn missing_partner_sales_is_named() {
    let err = Scenario::from_value(json!({
        "start_year": 2025,
        "start_month": 7,
        "projection_years": 5
    }))
    .unwrap_err();
    assert!(
        matches!(err, ProjError::MissingScenarioKey { key: "partner_sales_by_year" }),
        "unexpected error: {err}"
    );
}

#[test]
fn missing_start_month_is_named() {
    let err = Scenario::from_json_str(r#"{"start_year": 2025, "projection_years": 1, "partner_sales_by_year": {}}"#)
        .unwrap_err();
    assert!(matches!(err, ProjError::MissingScenarioKey { key: "start_month" }));
}

#[test]
fn out_of_range_month_is_rejected() {
    let err = Scenario::from_value(json!({
        "start_year": 2025,
        "start_month": 13,
        "projection_years": 1,
        "partner_sales_by_year": { "1": 10 }
    }))
    .unwrap_err();
    assert!(matches!(err, ProjError::InvalidScenario { .. }), "unexpected error: {err}");
}

#[test]
fn zero_year_horizon_is_rejected() {
    let err = Scenario::from_value(json!({
        "start_year": 2025,
        "start_month": 1,
        "projection_years": 0,
        "partner_sales_by_year": {}
    }))
    .unwrap_err();
    assert!(matches!(err, ProjError::InvalidScenario { .. }));
}

#[test]
fn out_of_horizon_years_are_accepted_and_ignored() {
    let s = Scenario::from_value(json!({
        "start_year": 2025,
        "start_month": 1,
        "projection_years": 1,
        "partner_sales_by_year": { "1": 10, "4": 99 },
        "additional_revenue": 5000
    }))
    .unwrap();
    assert_eq!(s.partner_target(4), 99.0);
    assert_eq!(s.additional_revenue, 5000.0);
}

#[test]
fn bundled_scenarios_parse() {
    for name in ["oem_partnership.json", "growth_plan.json", "hybrid_channels.json"] {
        let path = data_path(&format!("scenarios/{name}"));
        let s = Scenario::load(&path).unwrap_or_else(|e| panic!("{name}: {e}"));
        assert!(!s.partner_sales_by_year.is_empty(), "{name}");
    }

    let growth = Scenario::load(&data_path("scenarios/growth_plan.json")).unwrap();
    assert_eq!((growth.start_year, growth.start_month, growth.projection_years), (2025, 7, 5));
    assert_eq!(growth.partner_target(5), 261.0);
}

#[test]
fn scenario_survives_a_json_round_trip() {
    let s = Scenario::load(&data_path("scenarios/hybrid_channels.json")).unwrap();
    let text = serde_json::to_string(&s).unwrap();
    let back = Scenario::from_json_str(&text).unwrap();
    assert_eq!(s, back);
}

// ── Range checks ───────────────────────────────────────────────

fn with(key: &str, value: serde_json::Value) -> Result<Scenario, ProjError> {
    let mut base = json!({
        "start_year": 2025,
        "start_month": 7,
        "projection_years": 2,
        "partner_sales_by_year": { "1": 30, "2": 60 }
    });
    base[key] = value;
    Scenario::from_value(base)
}

fn assert_invalid(result: Result<Scenario, ProjError>, what: &str) {
    match result {
        Err(ProjError::InvalidScenario { reason }) => {
            assert!(reason.contains(what), "reason '{reason}' does not name {what}")
        }
        Err(other) => panic!("expected InvalidScenario for {what}, got {other}"),
        Ok(_) => panic!("{what}: malformed scenario was accepted"),
    }
}

#[test]
fn negative_partner_target_is_rejected() {
    assert_invalid(with("partner_sales_by_year", json!({ "1": -30 })), "partner_sales_by_year");
}

#[test]
fn negative_direct_target_is_rejected() {
    assert_invalid(with("direct_sales_by_year", json!({ "1": 60, "2": -5 })), "direct_sales_by_year");
}

#[test]
fn price_haircut_outside_unit_range_is_rejected() {
    assert_invalid(
        with("selling_price_reduction_by_year", json!({ "1": 1.5 })),
        "selling_price_reduction_by_year",
    );
    assert_invalid(
        with("selling_price_reduction_by_year", json!({ "2": -0.1 })),
        "selling_price_reduction_by_year",
    );
}

#[test]
fn service_adoption_outside_unit_range_is_rejected() {
    assert_invalid(with("service_adoption", json!(1.2)), "service_adoption");
    assert_invalid(with("service_adoption", json!(-0.1)), "service_adoption");
}

#[test]
fn negative_cost_reduction_is_rejected() {
    assert_invalid(with("cost_reduction", json!(-0.05)), "cost_reduction");
}

#[test]
fn range_boundaries_are_accepted() {
    with("selling_price_reduction_by_year", json!({ "1": 0.0, "2": 1.0 })).unwrap();
    with("service_adoption", json!(1.0)).unwrap();
    with("service_adoption", json!(0.0)).unwrap();
    with("cost_reduction", json!(0.0)).unwrap();
    with("direct_sales_by_year", json!({ "1": 0 })).unwrap();
}

#[test]
fn engine_rejects_a_hand_built_negative_target() {
    let partner: YearMap = [(1, -30.0)].into_iter().collect();
    let mut scenario = Scenario::new(2025, 7, 1, partner);
    scenario.direct_sales_by_year = [(1, 60.0)].into_iter().collect();

    let err = ProjectionEngine::build_test().run(&scenario).unwrap_err();
    assert!(matches!(err, ProjError::InvalidScenario { .. }), "unexpected error: {err}");
}

#[test]
fn warnings_name_out_of_horizon_years_and_unused_revenue() {
    let s = Scenario::from_value(json!({
        "start_year": 2025,
        "start_month": 1,
        "projection_years": 1,
        "partner_sales_by_year": { "1": 10, "4": 99 },
        "additional_revenue": 5000
    }))
    .unwrap();
    let warnings = s.warnings();
    assert_eq!(warnings.len(), 2, "{warnings:?}");
    assert!(warnings.iter().any(|w| w.contains("partner_sales_by_year") && w.contains("year 4")));
    assert!(warnings.iter().any(|w| w.contains("additional_revenue")));

    let clean = Scenario::load(&data_path("scenarios/growth_plan.json")).unwrap();
    assert!(clean.warnings().is_empty());
}
