//! Unit sales stage: spreads annual per-channel targets over months.
//!
//! The seasonal curve is anchored to the scenario's start month: relative
//! months 1–3 take the first quarter weight, 4–6 the second, and so on.
//! Each cell is rounded on its own (ties to even), so a year's monthly
//! units may drift a unit or two from the annual target. The drift is not
//! reconciled.

use crate::{
    error::ProjResult,
    row::{ColumnGroup, ProjectionTable},
    stage::{ProjectionStage, StageContext},
};

pub const QUARTER_WEIGHTS: [f64; 4] = [0.15, 0.20, 0.25, 0.40];
pub const MONTH_IN_QUARTER_WEIGHTS: [f64; 3] = [0.20, 0.30, 0.50];

/// (quarter weight, in-quarter weight) for a relative month in 1..=12.
pub fn seasonal_weights(relative_month: u32) -> (f64, f64) {
    let idx = relative_month.clamp(1, 12) - 1;
    (
        QUARTER_WEIGHTS[(idx / 3) as usize],
        MONTH_IN_QUARTER_WEIGHTS[(idx % 3) as usize],
    )
}

/// Units sold in one relative month out of an annual target.
/// Ties round to even.
pub fn monthly_units(annual_target: f64, relative_month: u32) -> i64 {
    let (q, m) = seasonal_weights(relative_month);
    (annual_target * q * m).round_ties_even() as i64
}

pub struct UnitSalesStage;

impl ProjectionStage for UnitSalesStage {
    fn name(&self) -> &'static str { "unit_sales" }

    fn requires(&self) -> &'static [ColumnGroup] { &[] }

    fn produces(&self) -> ColumnGroup { ColumnGroup::UnitSales }

    fn apply(&self, table: &mut ProjectionTable, ctx: &StageContext<'_>) -> ProjResult<()> {
        let scenario = ctx.scenario;

        let mut total_carts = 0;
        let mut cumulative_partner = 0;
        let mut cumulative_direct = 0;

        for row in &mut table.rows {
            let year = row.period.relative_year;
            let month = row.period.relative_month;

            let partner = monthly_units(scenario.partner_target(year), month);
            let direct = monthly_units(scenario.direct_target(year), month);
            let new_carts = partner + direct;

            total_carts += new_carts;
            cumulative_partner += partner;
            cumulative_direct += direct;

            let sales = &mut row.sales;
            sales.partner_carts = partner;
            sales.direct_carts = direct;
            sales.monthly_new_carts = new_carts;
            sales.total_carts = total_carts;
            sales.cumulative_partner_carts = cumulative_partner;
            sales.cumulative_direct_carts = cumulative_direct;
        }

        log::debug!(
            "unit sales: {cumulative_partner} partner + {cumulative_direct} direct carts over {} months",
            table.len()
        );
        Ok(())
    }
}
