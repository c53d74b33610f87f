//! Pricing stage: per-month unit economics for every line item.
//!
//! Every price and cost column is a pure function of the configuration,
//! the row's year fraction and the scenario toggles. The only cross-row
//! input is the scenario's per-relative-year haircut on the base hardware
//! end price, which lands in a separate "adjusted" column.

use crate::{
    error::ProjResult,
    row::{ColumnGroup, ProjectionTable, UnitEconomics},
    stage::{ProjectionStage, StageContext},
};

pub struct PricingStage;

impl ProjectionStage for PricingStage {
    fn name(&self) -> &'static str { "pricing" }

    fn requires(&self) -> &'static [ColumnGroup] { &[] }

    fn produces(&self) -> ColumnGroup { ColumnGroup::UnitEconomics }

    fn apply(&self, table: &mut ProjectionTable, ctx: &StageContext<'_>) -> ProjResult<()> {
        for row in &mut table.rows {
            let price_reduction = ctx.scenario.price_reduction(row.period.relative_year);
            row.economics = unit_economics(ctx, row.period.year_fraction, price_reduction);
        }
        log::debug!(
            "pricing: {} rows (inflation={}, reduction={} @ {:.3})",
            table.len(),
            ctx.curve.apply_inflation,
            ctx.curve.apply_reduction,
            ctx.curve.cost_reduction
        );
        Ok(())
    }
}

/// Unit economics at one point in time. `price_reduction` is the
/// scenario's haircut for the row's relative year (0 when unmapped).
pub fn unit_economics(ctx: &StageContext<'_>, year_fraction: f64, price_reduction: f64) -> UnitEconomics {
    let cfg = ctx.config;
    let curve = &ctx.curve;
    let ops = &cfg.operational;
    let hw_factor = 1.0 - ops.partner_hardware_discount;
    let cons_factor = 1.0 - ops.partner_consumables_discount;

    // Base hardware
    let base_hardware_end_price = curve.price(cfg.financial.base_hardware_price, year_fraction);
    let base_hardware_end_price_adjusted = base_hardware_end_price * (1.0 - price_reduction);
    let base_hardware_manufacturing_cost = curve.cost(cfg.cart.base_hardware_cost(), year_fraction);

    // TCU: pass-through, the partner pays manufacturing cost.
    let tcu_end_price = curve.price(cfg.cart.tcu_price, year_fraction);
    let tcu_mfg_cost = curve.cost(cfg.cart.tcu_cost, year_fraction);

    let utility_cart_end_price = curve.price(cfg.cart.utility_cart_price, year_fraction);
    let autofiller_unit_end_price = curve.price(cfg.cart.autofiller_price, year_fraction);
    let vessel_end_price = curve.price(cfg.consumables.vessel_price, year_fraction);
    let autofiller_pack_end_price = curve.price(cfg.consumables.autofiller_pack_price, year_fraction);

    UnitEconomics {
        base_hardware_end_price,
        base_hardware_end_price_adjusted,
        base_hardware_manufacturing_cost,
        base_hardware_partner_price: base_hardware_end_price_adjusted * hw_factor,

        tcu_end_price,
        tcu_mfg_cost,
        tcu_partner_price: tcu_mfg_cost,

        utility_cart_end_price,
        utility_cart_mfg_cost: curve.cost(cfg.cart.utility_cart_cost, year_fraction),
        utility_cart_partner_price: utility_cart_end_price * hw_factor,

        // The autofiller unit is discounted like a consumable.
        autofiller_unit_end_price,
        autofiller_unit_mfg_cost: curve.cost(cfg.cart.autofiller_cost, year_fraction),
        autofiller_unit_partner_price: autofiller_unit_end_price * cons_factor,

        installation_end_price: curve.price(ops.installation_price, year_fraction),
        installation_unit_cost: curve.cost(ops.installation_cost, year_fraction),

        software_end_price: curve.price(cfg.software.subscription_price, year_fraction),
        software_partner_price: 0.0,

        vessel_end_price,
        vessel_manufacturing_cost: curve.cost(cfg.consumables.vessel_cost, year_fraction),
        vessel_partner_price: vessel_end_price * cons_factor,

        autofiller_pack_end_price,
        autofiller_pack_mfg_cost: curve.cost(cfg.consumables.autofiller_pack_cost, year_fraction),
        autofiller_pack_partner_price: autofiller_pack_end_price * cons_factor,
    }
}
