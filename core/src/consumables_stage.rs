//! Consumables stage: monthly runs and vessel volume from installed base.
//!
//!   monthly_runs = installed_base × vessels_per_run_cycle
//!                × (runs_per_cart_per_year / 12) × utilization
//!
//! Vessel volume per type is monthly_runs × that type's run percentage.
//! Percentages are expected to sum to at most 1; that is the config's
//! responsibility and only produces a warning at load time.

use crate::{
    config::ModelConfig,
    error::ProjResult,
    row::{ColumnGroup, ConsumableUsage, ProjectionTable, VesselVolume},
    stage::{ProjectionStage, StageContext},
};

pub struct ConsumablesStage;

impl ProjectionStage for ConsumablesStage {
    fn name(&self) -> &'static str { "consumables" }

    fn requires(&self) -> &'static [ColumnGroup] { &[ColumnGroup::UnitSales] }

    fn produces(&self) -> ColumnGroup { ColumnGroup::ConsumableUsage }

    fn apply(&self, table: &mut ProjectionTable, ctx: &StageContext<'_>) -> ProjResult<()> {
        for row in &mut table.rows {
            row.usage = consumable_usage(ctx.config, row.sales.total_carts as f64);
        }
        log::debug!(
            "consumables: {:.2} runs/cart/year across {} vessel types",
            ctx.config.process.total_runs_per_year_per_cart(),
            ctx.config.process.vessel_types().count()
        );
        Ok(())
    }
}

pub fn monthly_runs(config: &ModelConfig, installed_base: f64) -> f64 {
    installed_base
        * config.process.vessels_per_run_cycle
        * (config.process.total_runs_per_year_per_cart() / 12.0)
        * config.operational.cart_utilization_percentage
}

pub fn consumable_usage(config: &ModelConfig, installed_base: f64) -> ConsumableUsage {
    let runs = monthly_runs(config, installed_base);
    let vessels: Vec<VesselVolume> = config
        .process
        .vessel_types()
        .map(|v| VesselVolume {
            name: v.name.clone(),
            volume: runs * v.run_percentage,
        })
        .collect();
    let total_vessels = vessels.iter().map(|v| v.volume).sum();

    ConsumableUsage {
        monthly_runs: runs,
        vessels,
        total_vessels,
    }
}
