//! Annual roll-up of the monthly table.
//!
//! Sums flow columns per group and recomputes margins from the sums; the
//! installed base is a stock, so the group reports its last value.

use crate::{row::ProjectionRow, types::safe_ratio};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    /// Calendar year.
    Year,
    RelativeYear,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnualSummary {
    /// Calendar or relative year, depending on the grouping.
    pub year: i64,
    pub months: u32,
    pub partner_carts: i64,
    pub direct_carts: i64,
    pub installed_base: i64,
    pub total_vessels: f64,
    pub total_our_cost: f64,
    pub total_our_revenue: f64,
    pub total_direct_revenue: f64,
    pub total_market_revenue: f64,
    pub partner_profit: f64,
    pub partner_attributable_revenue: f64,
    pub gross_profit: f64,
    pub gross_margin: f64,
    pub partner_margin: f64,
}

pub fn annual_summary(rows: &[ProjectionRow], group_by: GroupBy) -> Vec<AnnualSummary> {
    let mut groups: BTreeMap<i64, AnnualSummary> = BTreeMap::new();

    for row in rows {
        let key = match group_by {
            GroupBy::Year => row.period.year as i64,
            GroupBy::RelativeYear => row.period.relative_year as i64,
        };
        let s = groups.entry(key).or_insert_with(|| AnnualSummary {
            year: key,
            ..AnnualSummary::default()
        });
        let vc = &row.value_chain;

        s.months += 1;
        s.partner_carts += row.sales.partner_carts;
        s.direct_carts += row.sales.direct_carts;
        s.installed_base = row.sales.total_carts;
        s.total_vessels += row.usage.total_vessels;
        s.total_our_cost += vc.total_our_cost;
        s.total_our_revenue += vc.total_our_revenue;
        s.total_direct_revenue += vc.total_direct_revenue;
        s.total_market_revenue += vc.total_market_revenue;
        s.partner_profit += vc.partner_profit;
        s.partner_attributable_revenue += row.profitability.partner_attributable_revenue;
    }

    groups
        .into_values()
        .map(|mut s| {
            s.gross_profit = s.total_our_revenue - s.total_our_cost;
            s.gross_margin = safe_ratio(s.gross_profit, s.total_our_revenue);
            s.partner_margin = safe_ratio(s.partner_profit, s.partner_attributable_revenue);
            s
        })
        .collect()
}
