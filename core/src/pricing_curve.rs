//! Price/cost curve: the one formula every line item goes through.
//!
//!   value = base
//!         × (1 + inflation_rate) ^ year_fraction      if inflation is on
//!         × (1 − cost_reduction × year_fraction)      if reduction is on
//!
//! Inflation compounds; cost reduction is linear in elapsed years.
//! Selling prices never take cost reduction, whatever the toggle says.

use crate::{config::ModelConfig, scenario::Scenario};

/// Whether a line is a selling price or an internal cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRole {
    Price,
    Cost,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePolicy {
    pub inflation_rate: f64,
    pub cost_reduction: f64,
    pub apply_inflation: bool,
    pub apply_reduction: bool,
}

impl CurvePolicy {
    pub fn new(config: &ModelConfig, scenario: &Scenario) -> Self {
        Self {
            inflation_rate:  config.financial.inflation_rate,
            cost_reduction:  scenario.cost_reduction,
            apply_inflation: scenario.apply_inflation,
            apply_reduction: scenario.apply_reduction,
        }
    }

    /// Value of a line with nominal `base` at `year_fraction` years in.
    pub fn value(&self, base: f64, year_fraction: f64, role: LineRole) -> f64 {
        match role {
            LineRole::Price => {
                apply_inflation_and_reduction(base, year_fraction, self.inflation_rate, 0.0, self.apply_inflation, false)
            }
            LineRole::Cost => apply_inflation_and_reduction(
                base,
                year_fraction,
                self.inflation_rate,
                self.cost_reduction,
                self.apply_inflation,
                self.apply_reduction,
            ),
        }
    }

    pub fn price(&self, base: f64, year_fraction: f64) -> f64 {
        self.value(base, year_fraction, LineRole::Price)
    }

    pub fn cost(&self, base: f64, year_fraction: f64) -> f64 {
        self.value(base, year_fraction, LineRole::Cost)
    }
}

pub fn apply_inflation_and_reduction(
    base: f64,
    year_fraction: f64,
    inflation_rate: f64,
    cost_reduction: f64,
    apply_inflation: bool,
    apply_reduction: bool,
) -> f64 {
    let mut value = base;
    if apply_inflation {
        value *= (1.0 + inflation_rate).powf(year_fraction);
    }
    if apply_reduction {
        value *= 1.0 - cost_reduction * year_fraction;
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(apply_inflation: bool, apply_reduction: bool) -> CurvePolicy {
        CurvePolicy {
            inflation_rate: 0.025,
            cost_reduction: 0.05,
            apply_inflation,
            apply_reduction,
        }
    }

    #[test]
    fn both_toggles_off_is_identity() {
        let p = policy(false, false);
        for k in [0.0, 0.5, 1.0, 4.9166] {
            assert_eq!(p.cost(325.0, k), 325.0);
            assert_eq!(p.price(600.0, k), 600.0);
        }
    }

    #[test]
    fn inflation_compounds() {
        let p = policy(true, false);
        let v = p.cost(100.0, 2.0);
        assert!((v - 105.0625).abs() < 1e-9, "got {v}");
    }

    #[test]
    fn reduction_is_linear_and_cost_only() {
        let p = policy(false, true);
        assert!((p.cost(100.0, 2.0) - 90.0).abs() < 1e-9);
        assert_eq!(p.price(100.0, 2.0), 100.0);
    }

    #[test]
    fn inflation_then_reduction() {
        let p = policy(true, true);
        let expected = 100.0 * 1.025_f64.powf(1.5) * (1.0 - 0.05 * 1.5);
        assert!((p.cost(100.0, 1.5) - expected).abs() < 1e-9);
    }
}
