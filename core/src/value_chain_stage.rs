//! Value-chain stage: cost, revenue and partner profit per line item.
//!
//! Three perspectives per line and month:
//!   - our cost:        units (or volume) × manufacturing/internal cost
//!   - our revenue:     partner units × partner price, plus the direct
//!                      channel billed at end-customer price
//!   - market revenue:  partner units × end-customer price
//!
//! Consumables revenue is split between channels by installed-base share.
//! Service is billed one month in arrears: it reads the PRIOR row's
//! cumulative installed base.

use crate::{
    error::ProjResult,
    row::{ColumnGroup, ConsumableUsage, LineAmounts, ProjectionTable, UnitEconomics, UnitSales, ValueChain},
    stage::{ProjectionStage, StageContext},
    types::safe_ratio,
};

pub struct ValueChainStage;

/// Cumulative installed base at the end of the previous month.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriorBase {
    pub total: f64,
    pub partner: f64,
    pub direct: f64,
}

impl PriorBase {
    fn after(sales: &UnitSales) -> Self {
        Self {
            total: sales.total_carts as f64,
            partner: sales.cumulative_partner_carts as f64,
            direct: sales.cumulative_direct_carts as f64,
        }
    }
}

impl ProjectionStage for ValueChainStage {
    fn name(&self) -> &'static str { "value_chain" }

    fn requires(&self) -> &'static [ColumnGroup] {
        &[ColumnGroup::UnitSales, ColumnGroup::UnitEconomics, ColumnGroup::ConsumableUsage]
    }

    fn produces(&self) -> ColumnGroup { ColumnGroup::ValueChain }

    fn apply(&self, table: &mut ProjectionTable, ctx: &StageContext<'_>) -> ProjResult<()> {
        let mut prior = PriorBase::default();
        for row in &mut table.rows {
            row.value_chain = value_chain(ctx, &row.sales, &row.economics, &row.usage, prior);
            prior = PriorBase::after(&row.sales);
        }
        log::debug!("value chain: {} rows (service={})", table.len(), ctx.scenario.enable_service);
        Ok(())
    }
}

fn line(our_cost: f64, partner_revenue: f64, direct_revenue: f64, market_revenue: f64) -> LineAmounts {
    LineAmounts {
        our_cost,
        partner_revenue,
        direct_revenue,
        our_revenue: partner_revenue + direct_revenue,
        market_revenue,
    }
}

/// One month of the value chain.
pub fn value_chain(
    ctx: &StageContext<'_>,
    sales: &UnitSales,
    e: &UnitEconomics,
    usage: &ConsumableUsage,
    prior: PriorBase,
) -> ValueChain {
    let cfg = ctx.config;
    let scenario = ctx.scenario;
    let safety = cfg.consumables.safety_factor;

    let partner = sales.partner_carts as f64;
    let direct = sales.direct_carts as f64;
    let new_carts = sales.monthly_new_carts as f64;
    let volume = usage.total_vessels;

    let installed = sales.total_carts as f64;
    let ratio_partner = safe_ratio(sales.cumulative_partner_carts as f64, installed);
    let ratio_direct = safe_ratio(sales.cumulative_direct_carts as f64, installed);

    // ── Hardware system ────────────────────────────────────────

    let base_hardware = line(
        new_carts * e.base_hardware_manufacturing_cost,
        partner * e.base_hardware_partner_price,
        direct * e.base_hardware_end_price_adjusted,
        partner * e.base_hardware_end_price_adjusted,
    );
    // Pass-through: partner revenue is manufacturing cost, zero margin.
    let tcu = line(
        new_carts * e.tcu_mfg_cost,
        partner * e.tcu_partner_price,
        direct * e.tcu_end_price,
        partner * e.tcu_end_price,
    );
    let utility_cart = line(
        new_carts * e.utility_cart_mfg_cost,
        partner * e.utility_cart_partner_price,
        direct * e.utility_cart_end_price,
        partner * e.utility_cart_end_price,
    );
    let autofiller_unit = line(
        new_carts * e.autofiller_unit_mfg_cost,
        partner * e.autofiller_unit_partner_price,
        direct * e.autofiller_unit_end_price,
        partner * e.autofiller_unit_end_price,
    );

    // ── Installation & software ────────────────────────────────

    // Installation is billed at end price on both sides.
    let installation = line(
        new_carts * e.installation_unit_cost,
        partner * e.installation_end_price,
        direct * e.installation_end_price,
        partner * e.installation_end_price,
    );
    // Software is billed by us at end price and never passes through
    // the partner.
    let software = line(
        0.0,
        partner * e.software_end_price,
        direct * e.software_end_price,
        partner * e.software_end_price,
    );

    // ── Service (one month in arrears) ─────────────────────────

    let service = if scenario.enable_service {
        let contract = cfg.software.service_contract_percentage;
        let adoption = scenario.service_adoption;
        let monthly = |base: f64| base * e.base_hardware_end_price_adjusted * contract / 12.0 * adoption;
        let partner_revenue = monthly(prior.partner);
        line(
            monthly(prior.total) * cfg.operational.service_cost_ratio,
            partner_revenue,
            monthly(prior.direct),
            partner_revenue,
        )
    } else {
        LineAmounts::default()
    };

    // ── Consumables (installed-base share) ─────────────────────

    let vessel = line(
        volume * e.vessel_manufacturing_cost,
        volume * ratio_partner * e.vessel_partner_price,
        volume * ratio_direct * e.vessel_end_price,
        volume * ratio_partner * e.vessel_end_price,
    );
    let autofiller_pack = line(
        volume * e.autofiller_pack_mfg_cost * safety,
        volume * ratio_partner * e.autofiller_pack_partner_price * safety,
        volume * ratio_direct * e.autofiller_pack_end_price * safety,
        volume * ratio_partner * e.autofiller_pack_end_price * safety,
    );

    // ── Totals ─────────────────────────────────────────────────

    let total_our_cost = base_hardware.our_cost
        + tcu.our_cost
        + utility_cart.our_cost
        + autofiller_unit.our_cost
        + installation.our_cost
        + vessel.our_cost
        + autofiller_pack.our_cost
        + service.our_cost
        + software.our_cost;

    let total_hardware_system_our_revenue =
        base_hardware.our_revenue + tcu.our_revenue + utility_cart.our_revenue + autofiller_unit.our_revenue;
    let total_hardware_system_market_revenue = base_hardware.market_revenue
        + tcu.market_revenue
        + utility_cart.market_revenue
        + autofiller_unit.market_revenue;
    let total_consumables_our_revenue = vessel.our_revenue + autofiller_pack.our_revenue;
    let total_consumables_market_revenue = vessel.market_revenue + autofiller_pack.market_revenue;

    let total_our_revenue = total_hardware_system_our_revenue
        + installation.our_revenue
        + software.our_revenue
        + service.our_revenue
        + total_consumables_our_revenue;
    let total_market_revenue = total_hardware_system_market_revenue
        + installation.market_revenue
        + software.market_revenue
        + service.market_revenue
        + total_consumables_market_revenue;

    let mut chain = ValueChain {
        base_hardware,
        tcu,
        utility_cart,
        autofiller_unit,
        installation,
        software,
        vessel,
        autofiller_pack,
        service,
        ratio_partner,
        ratio_direct,
        total_hardware_system_our_revenue,
        total_hardware_system_market_revenue,
        total_consumables_our_revenue,
        total_consumables_market_revenue,
        total_our_cost,
        total_our_revenue,
        total_direct_revenue: 0.0,
        total_market_revenue,
        partner_profit: 0.0,
    };

    chain.total_direct_revenue = chain.lines().map(|(_, l)| l.direct_revenue).sum();
    // Summing spreads line by line keeps software and pass-through items
    // out exactly, not merely to rounding.
    chain.partner_profit = chain
        .lines()
        .filter(|(kind, _)| kind.earns_partner_spread())
        .map(|(_, l)| l.partner_spread())
        .sum();
    chain
}
