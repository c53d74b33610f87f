//! Same configuration, same scenario: identical tables.
//!
//! An evaluation reads only its inputs. Two runs, or two threads running
//! at once, must agree cell for cell.

use cartproj_core::{
    engine::ProjectionEngine,
    scenario::{Scenario, YearMap},
    ModelConfig,
};

fn scenario() -> Scenario {
    let partner: YearMap = [(1, 12.0), (2, 40.0), (3, 75.0)].into_iter().collect();
    let direct: YearMap = [(2, 5.0), (3, 9.0)].into_iter().collect();
    let mut s = Scenario::new(2026, 3, 3, partner);
    s.direct_sales_by_year = direct;
    s.apply_inflation = true;
    s.apply_reduction = true;
    s.cost_reduction = 0.04;
    s.enable_service = true;
    s.service_adoption = 0.6;
    s.selling_price_reduction_by_year = [(3, 0.05)].into_iter().collect();
    s
}

#[test]
fn same_inputs_produce_identical_rows() {
    let engine_a = ProjectionEngine::build(ModelConfig::default_test());
    let engine_b = ProjectionEngine::build(ModelConfig::default_test());

    let a = engine_a.run_with_id("det-a".into(), &scenario()).unwrap();
    let b = engine_b.run_with_id("det-b".into(), &scenario()).unwrap();

    assert_eq!(a.rows.len(), 36);
    for (i, (ra, rb)) in a.rows.iter().zip(&b.rows).enumerate() {
        assert_eq!(ra, rb, "row {i} diverged");
    }
}

#[test]
fn concurrent_evaluations_share_one_engine() {
    let engine = ProjectionEngine::build_test();
    let baseline = engine.run(&scenario()).unwrap();

    let other: YearMap = [(1, 100.0)].into_iter().collect();
    let other = Scenario::new(2024, 11, 2, other);

    let (first, second) = std::thread::scope(|s| {
        let h1 = s.spawn(|| engine.run(&scenario()));
        let h2 = s.spawn(|| engine.run(&other));
        (h1.join().unwrap(), h2.join().unwrap())
    });

    let first = first.unwrap();
    let second = second.unwrap();
    assert_eq!(first.rows, baseline.rows);
    assert_eq!(second.rows.len(), 24);
    assert_ne!(first.run_id, second.run_id);
}

#[test]
fn run_ids_are_unique_per_evaluation() {
    let engine = ProjectionEngine::build_test();
    let a = engine.run(&scenario()).unwrap();
    let b = engine.run(&scenario()).unwrap();
    assert_ne!(a.run_id, b.run_id);
    assert_eq!(a.rows, b.rows);
}
