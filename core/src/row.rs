//! The projection table: one wide record per month.
//!
//! Each stage owns exactly one column group and fills it for every row.
//! Rows are never reordered or removed after the time grid creates them.

use crate::time_grid::Period;
use serde::{Deserialize, Serialize};

// ── Unit sales ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitSales {
    pub partner_carts: i64,
    pub direct_carts: i64,
    pub monthly_new_carts: i64,
    /// Cumulative installed base across both channels.
    pub total_carts: i64,
    pub cumulative_partner_carts: i64,
    pub cumulative_direct_carts: i64,
}

// ── Unit economics ─────────────────────────────────────────────────

/// Time-varying per-unit prices and costs for every line item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitEconomics {
    pub base_hardware_end_price: f64,
    /// End price after the scenario's per-year haircut.
    pub base_hardware_end_price_adjusted: f64,
    pub base_hardware_manufacturing_cost: f64,
    pub base_hardware_partner_price: f64,

    pub tcu_end_price: f64,
    pub tcu_mfg_cost: f64,
    pub tcu_partner_price: f64,

    pub utility_cart_end_price: f64,
    pub utility_cart_mfg_cost: f64,
    pub utility_cart_partner_price: f64,

    pub autofiller_unit_end_price: f64,
    pub autofiller_unit_mfg_cost: f64,
    pub autofiller_unit_partner_price: f64,

    pub installation_end_price: f64,
    pub installation_unit_cost: f64,

    pub software_end_price: f64,
    pub software_partner_price: f64,

    pub vessel_end_price: f64,
    pub vessel_manufacturing_cost: f64,
    pub vessel_partner_price: f64,

    pub autofiller_pack_end_price: f64,
    pub autofiller_pack_mfg_cost: f64,
    pub autofiller_pack_partner_price: f64,
}

// ── Consumables usage ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselVolume {
    pub name: String,
    pub volume: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsumableUsage {
    pub monthly_runs: f64,
    /// One entry per configured vessel type, in configuration order.
    pub vessels: Vec<VesselVolume>,
    pub total_vessels: f64,
}

// ── Value chain ────────────────────────────────────────────────────

/// The nine line items of the value chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LineItemKind {
    BaseHardware,
    Tcu,
    UtilityCart,
    AutofillerUnit,
    Installation,
    Software,
    Vessel,
    AutofillerPack,
    Service,
}

/// Revenue categories. Together they partition total internal revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RevenueCategory {
    HardwareSystem,
    Installation,
    Software,
    Service,
    Consumables,
}

impl LineItemKind {
    pub const ALL: [LineItemKind; 9] = [
        LineItemKind::BaseHardware,
        LineItemKind::Tcu,
        LineItemKind::UtilityCart,
        LineItemKind::AutofillerUnit,
        LineItemKind::Installation,
        LineItemKind::Software,
        LineItemKind::Vessel,
        LineItemKind::AutofillerPack,
        LineItemKind::Service,
    ];

    /// Column-name prefix used by the export.
    pub fn column_prefix(self) -> &'static str {
        match self {
            LineItemKind::BaseHardware   => "Base_Hardware",
            LineItemKind::Tcu            => "TCU",
            LineItemKind::UtilityCart    => "Utility_Cart",
            LineItemKind::AutofillerUnit => "Autofiller_Unit",
            LineItemKind::Installation   => "Installation",
            LineItemKind::Software       => "Software",
            LineItemKind::Vessel         => "Vessel",
            LineItemKind::AutofillerPack => "Autofiller_Pack",
            LineItemKind::Service        => "Service",
        }
    }

    /// Export name of the line's monthly cost total. Installation keeps
    /// `Installation_Our_Cost` for its per-unit cost, so its total carries a
    /// `_Total` suffix.
    pub fn our_cost_column(self) -> String {
        match self {
            LineItemKind::Installation => "Installation_Our_Cost_Total".to_string(),
            _ => format!("{}_Our_Cost", self.column_prefix()),
        }
    }

    pub fn category(self) -> RevenueCategory {
        match self {
            LineItemKind::BaseHardware
            | LineItemKind::Tcu
            | LineItemKind::UtilityCart
            | LineItemKind::AutofillerUnit => RevenueCategory::HardwareSystem,
            LineItemKind::Installation => RevenueCategory::Installation,
            LineItemKind::Software => RevenueCategory::Software,
            LineItemKind::Service => RevenueCategory::Service,
            LineItemKind::Vessel | LineItemKind::AutofillerPack => RevenueCategory::Consumables,
        }
    }

    /// Resold to the partner at manufacturing cost, no markup.
    ///
    /// Neutrality holds for the partner channel only: direct carts are
    /// billed at the end-customer price like any other hardware, so with
    /// direct sales the line's internal margin is no longer zero.
    pub fn is_pass_through(self) -> bool {
        matches!(self, LineItemKind::Tcu)
    }

    /// Whether the partner earns a spread on this line. Software is billed
    /// by the manufacturer and pass-through items carry no spread.
    pub fn earns_partner_spread(self) -> bool {
        !matches!(self, LineItemKind::Software) && !self.is_pass_through()
    }
}

impl RevenueCategory {
    pub const ALL: [RevenueCategory; 5] = [
        RevenueCategory::HardwareSystem,
        RevenueCategory::Installation,
        RevenueCategory::Software,
        RevenueCategory::Service,
        RevenueCategory::Consumables,
    ];

    pub fn column_prefix(self) -> &'static str {
        match self {
            RevenueCategory::HardwareSystem => "Hardware_System",
            RevenueCategory::Installation   => "Installation",
            RevenueCategory::Software       => "Software",
            RevenueCategory::Service        => "Service",
            RevenueCategory::Consumables    => "Consumables",
        }
    }
}

/// One line item's cost and revenue for one month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LineAmounts {
    pub our_cost: f64,
    /// Billed to the partner (partner channel).
    pub partner_revenue: f64,
    /// Billed to end customers directly (direct channel).
    pub direct_revenue: f64,
    /// Everything the manufacturer bills: partner + direct.
    pub our_revenue: f64,
    /// What partner-channel end customers pay.
    pub market_revenue: f64,
}

impl LineAmounts {
    /// The partner's spread on this line.
    pub fn partner_spread(&self) -> f64 {
        self.market_revenue - self.partner_revenue
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueChain {
    pub base_hardware: LineAmounts,
    pub tcu: LineAmounts,
    pub utility_cart: LineAmounts,
    pub autofiller_unit: LineAmounts,
    pub installation: LineAmounts,
    pub software: LineAmounts,
    pub vessel: LineAmounts,
    pub autofiller_pack: LineAmounts,
    pub service: LineAmounts,

    /// Installed-base shares used to split consumables revenue.
    pub ratio_partner: f64,
    pub ratio_direct: f64,

    pub total_hardware_system_our_revenue: f64,
    pub total_hardware_system_market_revenue: f64,
    pub total_consumables_our_revenue: f64,
    pub total_consumables_market_revenue: f64,

    pub total_our_cost: f64,
    pub total_our_revenue: f64,
    pub total_direct_revenue: f64,
    pub total_market_revenue: f64,
    pub partner_profit: f64,
}

impl ValueChain {
    pub fn line(&self, kind: LineItemKind) -> &LineAmounts {
        match kind {
            LineItemKind::BaseHardware   => &self.base_hardware,
            LineItemKind::Tcu            => &self.tcu,
            LineItemKind::UtilityCart    => &self.utility_cart,
            LineItemKind::AutofillerUnit => &self.autofiller_unit,
            LineItemKind::Installation   => &self.installation,
            LineItemKind::Software       => &self.software,
            LineItemKind::Vessel         => &self.vessel,
            LineItemKind::AutofillerPack => &self.autofiller_pack,
            LineItemKind::Service        => &self.service,
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = (LineItemKind, &LineAmounts)> + '_ {
        LineItemKind::ALL.into_iter().map(move |k| (k, self.line(k)))
    }

    /// Internal revenue of one category.
    pub fn category_revenue(&self, category: RevenueCategory) -> f64 {
        match category {
            RevenueCategory::HardwareSystem => self.total_hardware_system_our_revenue,
            RevenueCategory::Consumables    => self.total_consumables_our_revenue,
            RevenueCategory::Installation   => self.installation.our_revenue,
            RevenueCategory::Software       => self.software.our_revenue,
            RevenueCategory::Service        => self.service.our_revenue,
        }
    }
}

// ── Profitability ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LineMargins {
    pub base_hardware: f64,
    pub tcu: f64,
    pub utility_cart: f64,
    pub autofiller_unit: f64,
    pub installation: f64,
    pub software: f64,
    pub vessel: f64,
    pub autofiller_pack: f64,
    pub service: f64,
}

impl LineMargins {
    pub fn get(&self, kind: LineItemKind) -> f64 {
        match kind {
            LineItemKind::BaseHardware   => self.base_hardware,
            LineItemKind::Tcu            => self.tcu,
            LineItemKind::UtilityCart    => self.utility_cart,
            LineItemKind::AutofillerUnit => self.autofiller_unit,
            LineItemKind::Installation   => self.installation,
            LineItemKind::Software       => self.software,
            LineItemKind::Vessel         => self.vessel,
            LineItemKind::AutofillerPack => self.autofiller_pack,
            LineItemKind::Service        => self.service,
        }
    }

    pub fn set(&mut self, kind: LineItemKind, margin: f64) {
        let slot = match kind {
            LineItemKind::BaseHardware   => &mut self.base_hardware,
            LineItemKind::Tcu            => &mut self.tcu,
            LineItemKind::UtilityCart    => &mut self.utility_cart,
            LineItemKind::AutofillerUnit => &mut self.autofiller_unit,
            LineItemKind::Installation   => &mut self.installation,
            LineItemKind::Software       => &mut self.software,
            LineItemKind::Vessel         => &mut self.vessel,
            LineItemKind::AutofillerPack => &mut self.autofiller_pack,
            LineItemKind::Service        => &mut self.service,
        };
        *slot = margin;
    }
}

/// Share of total internal revenue per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ContributionRatios {
    pub hardware_system: f64,
    pub installation: f64,
    pub software: f64,
    pub service: f64,
    pub consumables: f64,
}

impl ContributionRatios {
    pub fn get(&self, category: RevenueCategory) -> f64 {
        match category {
            RevenueCategory::HardwareSystem => self.hardware_system,
            RevenueCategory::Installation   => self.installation,
            RevenueCategory::Software       => self.software,
            RevenueCategory::Service        => self.service,
            RevenueCategory::Consumables    => self.consumables,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profitability {
    pub our_gross_profit: f64,
    pub our_gross_margin: f64,
    /// Partner-channel market revenue net of software and of the
    /// markup-free portion of pass-through items.
    pub partner_attributable_revenue: f64,
    pub partner_margin: f64,
    pub line_margins: LineMargins,
    pub contribution: ContributionRatios,
}

// ── Row & table ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRow {
    pub period: Period,
    pub sales: UnitSales,
    pub economics: UnitEconomics,
    pub usage: ConsumableUsage,
    pub value_chain: ValueChain,
    pub profitability: Profitability,
}

impl ProjectionRow {
    pub fn new(period: Period) -> Self {
        Self {
            period,
            sales: UnitSales::default(),
            economics: UnitEconomics::default(),
            usage: ConsumableUsage::default(),
            value_chain: ValueChain::default(),
            profitability: Profitability::default(),
        }
    }
}

/// Column groups, in the order the pipeline fills them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnGroup {
    UnitSales,
    UnitEconomics,
    ConsumableUsage,
    ValueChain,
    Profitability,
}

impl ColumnGroup {
    pub fn name(self) -> &'static str {
        match self {
            ColumnGroup::UnitSales       => "unit_sales",
            ColumnGroup::UnitEconomics   => "unit_economics",
            ColumnGroup::ConsumableUsage => "consumable_usage",
            ColumnGroup::ValueChain      => "value_chain",
            ColumnGroup::Profitability   => "profitability",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProjectionTable {
    pub rows: Vec<ProjectionRow>,
    completed: Vec<ColumnGroup>,
}

impl ProjectionTable {
    pub fn from_periods(periods: Vec<Period>) -> Self {
        Self {
            rows: periods.into_iter().map(ProjectionRow::new).collect(),
            completed: Vec::new(),
        }
    }

    pub fn is_complete(&self, group: ColumnGroup) -> bool {
        self.completed.contains(&group)
    }

    pub fn mark_complete(&mut self, group: ColumnGroup) {
        if !self.is_complete(group) {
            self.completed.push(group);
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<ProjectionRow> {
        self.rows
    }
}
