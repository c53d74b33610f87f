use cartproj_core::{
    config::{ProcessFamily, VesselType},
    consumables_stage::{consumable_usage, monthly_runs},
    engine::ProjectionEngine,
    scenario::{Scenario, YearMap},
    ModelConfig,
};

#[test]
fn baseline_cart_runs_fourteen_point_four_times_a_year() {
    let config = ModelConfig::default_test();
    let runs = config.process.total_runs_per_year_per_cart();
    assert!((runs - 14.4).abs() < 1e-9, "got {runs}");
}

#[test]
fn monthly_runs_scale_with_installed_base() {
    let config = ModelConfig::default_test();
    // 10 carts × 4 vessels × 1.2 runs/month × 0.8 utilization
    assert!((monthly_runs(&config, 10.0) - 38.4).abs() < 1e-9);
    assert_eq!(monthly_runs(&config, 0.0), 0.0);
}

#[test]
fn vessel_volume_splits_by_run_percentage() {
    let config = ModelConfig::default_test();
    let usage = consumable_usage(&config, 10.0);

    let names: Vec<&str> = usage.vessels.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Mammalian_Vessels", "Mammalian_Glass_Vessels", "AAV_Man_Vessels", "AAV_Auto_Vessels"]
    );

    let runs = usage.monthly_runs;
    assert!((usage.vessels[0].volume - runs * 0.64).abs() < 1e-9);
    assert!((usage.vessels[1].volume - runs * 0.16).abs() < 1e-9);
    assert_eq!(usage.vessels[2].volume, 0.0);
    assert!((usage.vessels[3].volume - runs * 0.20).abs() < 1e-9);

    // Baseline mix sums to 100%, so every run consumes a vessel.
    assert!((usage.total_vessels - runs).abs() < 1e-9);
}

#[test]
fn extra_vessel_type_joins_the_split() {
    let mut config = ModelConfig::default_test();
    config.process.families.push(ProcessFamily {
        name: "Lenti".into(),
        runs_per_month: 1.0,
        vessel_types: vec![VesselType { name: "Lenti_Vessels".into(), run_percentage: 0.0 }],
    });
    let usage = consumable_usage(&config, 5.0);
    assert_eq!(usage.vessels.len(), 5);
    assert_eq!(usage.vessels[4].name, "Lenti_Vessels");
    // Zero share adds no runs.
    assert!((config.process.total_runs_per_year_per_cart() - 14.4).abs() < 1e-9);
}

#[test]
fn usage_tracks_the_row_installed_base() {
    let partner: YearMap = [(1, 30.0), (2, 71.0)].into_iter().collect();
    let engine = ProjectionEngine::build_test();
    let projection = engine.run(&Scenario::new(2025, 7, 2, partner)).unwrap();

    for row in &projection.rows {
        let expected = monthly_runs(engine.config(), row.sales.total_carts as f64);
        assert_eq!(row.usage.monthly_runs, expected);
        if row.sales.total_carts == 0 {
            assert_eq!(row.usage.total_vessels, 0.0);
        } else {
            assert!(row.usage.total_vessels > 0.0);
        }
    }
}
