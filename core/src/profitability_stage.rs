//! Profitability stage: margins and revenue mix.
//!
//! All ratios are zero-safe: a month with no revenue reads 0, never NaN.

use crate::{
    error::ProjResult,
    row::{ColumnGroup, ContributionRatios, LineItemKind, LineMargins, Profitability, ProjectionTable, RevenueCategory, ValueChain},
    stage::{ProjectionStage, StageContext},
    types::safe_ratio,
};

pub struct ProfitabilityStage;

impl ProjectionStage for ProfitabilityStage {
    fn name(&self) -> &'static str { "profitability" }

    fn requires(&self) -> &'static [ColumnGroup] { &[ColumnGroup::ValueChain] }

    fn produces(&self) -> ColumnGroup { ColumnGroup::Profitability }

    fn apply(&self, table: &mut ProjectionTable, _ctx: &StageContext<'_>) -> ProjResult<()> {
        for row in &mut table.rows {
            row.profitability = profitability(&row.value_chain);
        }
        Ok(())
    }
}

/// Partner-channel market revenue the partner actually trades on: software
/// is removed entirely, and pass-through items only keep the portion the
/// partner pays us for.
pub fn partner_attributable_revenue(chain: &ValueChain) -> f64 {
    let pass_through_markup: f64 = chain
        .lines()
        .filter(|(kind, _)| kind.is_pass_through())
        .map(|(_, l)| l.market_revenue - l.partner_revenue)
        .sum();
    chain.total_market_revenue - chain.software.market_revenue - pass_through_markup
}

pub fn profitability(chain: &ValueChain) -> Profitability {
    let our_gross_profit = chain.total_our_revenue - chain.total_our_cost;
    let partner_revenue = partner_attributable_revenue(chain);

    let mut line_margins = LineMargins::default();
    for kind in LineItemKind::ALL {
        let l = chain.line(kind);
        line_margins.set(kind, safe_ratio(l.our_revenue - l.our_cost, l.our_revenue));
    }

    let share = |category: RevenueCategory| safe_ratio(chain.category_revenue(category), chain.total_our_revenue);
    let contribution = ContributionRatios {
        hardware_system: share(RevenueCategory::HardwareSystem),
        installation: share(RevenueCategory::Installation),
        software: share(RevenueCategory::Software),
        service: share(RevenueCategory::Service),
        consumables: share(RevenueCategory::Consumables),
    };

    Profitability {
        our_gross_profit,
        our_gross_margin: safe_ratio(our_gross_profit, chain.total_our_revenue),
        partner_attributable_revenue: partner_revenue,
        partner_margin: safe_ratio(chain.partner_profit, partner_revenue),
        line_margins,
        contribution,
    }
}
