//! Delimited export of the projection table.
//!
//! One header line, one record per month, every column by name. The
//! column set is the contract with downstream reporting: it groups by
//! `Year` or `Relative_Year` and sums named columns.

use crate::{
    error::ProjResult,
    row::{LineItemKind, ProjectionRow, RevenueCategory},
};
use std::io::Write;
use std::path::{Path, PathBuf};

/// A single exported cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    fn render(&self) -> String {
        match self {
            Cell::Int(v) => v.to_string(),
            Cell::Float(v) => v.to_string(),
            Cell::Text(v) => v.clone(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            Cell::Text(_) => None,
        }
    }
}

fn int(cols: &mut Vec<(String, Cell)>, name: &str, v: i64) {
    cols.push((name.to_string(), Cell::Int(v)));
}

fn float(cols: &mut Vec<(String, Cell)>, name: &str, v: f64) {
    cols.push((name.to_string(), Cell::Float(v)));
}

/// Every column of one row, in export order.
pub fn row_columns(row: &ProjectionRow) -> Vec<(String, Cell)> {
    let mut cols: Vec<(String, Cell)> = Vec::with_capacity(160);

    // ── Period ─────────────────────────────────────────────────
    let p = &row.period;
    int(&mut cols, "Year", p.year as i64);
    int(&mut cols, "Month", p.month as i64);
    int(&mut cols, "Date_Value", p.date_value);
    int(&mut cols, "Months_From_Start", p.months_from_start as i64);
    int(&mut cols, "Relative_Year", p.relative_year as i64);
    int(&mut cols, "Relative_Month", p.relative_month as i64);
    int(&mut cols, "Quarter", p.quarter as i64);
    int(&mut cols, "Month_in_Quarter", p.month_in_quarter as i64);
    cols.push(("Year_Month".into(), Cell::Text(p.year_month.clone())));
    float(&mut cols, "Year_Fraction", p.year_fraction);

    // ── Unit sales ─────────────────────────────────────────────
    let s = &row.sales;
    int(&mut cols, "Partner_Carts", s.partner_carts);
    int(&mut cols, "Direct_Carts", s.direct_carts);
    int(&mut cols, "Monthly_New_Carts", s.monthly_new_carts);
    int(&mut cols, "Total_Carts", s.total_carts);
    int(&mut cols, "Cumulative_Partner_Carts", s.cumulative_partner_carts);
    int(&mut cols, "Cumulative_Direct_Carts", s.cumulative_direct_carts);

    // ── Unit economics ─────────────────────────────────────────
    let e = &row.economics;
    for (name, v) in [
        ("Base_Hardware_End_Price", e.base_hardware_end_price),
        ("Base_Hardware_End_Price_Adjusted", e.base_hardware_end_price_adjusted),
        ("Base_Hardware_Manufacturing_Cost", e.base_hardware_manufacturing_cost),
        ("Base_Hardware_Partner_Price", e.base_hardware_partner_price),
        ("TCU_End_Price", e.tcu_end_price),
        ("TCU_Mfg_Cost", e.tcu_mfg_cost),
        ("TCU_Partner_Price", e.tcu_partner_price),
        ("Utility_Cart_End_Price", e.utility_cart_end_price),
        ("Utility_Cart_Mfg_Cost", e.utility_cart_mfg_cost),
        ("Utility_Cart_Partner_Price", e.utility_cart_partner_price),
        ("Autofiller_Unit_End_Price", e.autofiller_unit_end_price),
        ("Autofiller_Unit_Mfg_Cost", e.autofiller_unit_mfg_cost),
        ("Autofiller_Unit_Partner_Price", e.autofiller_unit_partner_price),
        ("Installation_End_Price", e.installation_end_price),
        ("Installation_Our_Cost", e.installation_unit_cost),
        ("End_Customer_Software_Price", e.software_end_price),
        ("Software_Partner_Price", e.software_partner_price),
        ("End_Customer_Vessel_Price", e.vessel_end_price),
        ("Vessel_Manufacturing_Cost", e.vessel_manufacturing_cost),
        ("Vessel_Partner_Price", e.vessel_partner_price),
        ("End_Customer_Autofiller_Pack_Price", e.autofiller_pack_end_price),
        ("Autofiller_Pack_Mfg_Cost", e.autofiller_pack_mfg_cost),
        ("Autofiller_Pack_Partner_Price", e.autofiller_pack_partner_price),
    ] {
        float(&mut cols, name, v);
    }

    // ── Consumables usage ──────────────────────────────────────
    float(&mut cols, "Monthly_Runs", row.usage.monthly_runs);
    for vessel in &row.usage.vessels {
        float(&mut cols, &vessel.name, vessel.volume);
    }
    float(&mut cols, "Total_Vessels", row.usage.total_vessels);

    // ── Value chain ────────────────────────────────────────────
    let vc = &row.value_chain;
    for (kind, l) in vc.lines() {
        let prefix = kind.column_prefix();
        float(&mut cols, &kind.our_cost_column(), l.our_cost);
        float(&mut cols, &format!("{prefix}_Partner_Revenue"), l.partner_revenue);
        float(&mut cols, &format!("{prefix}_Direct_Revenue"), l.direct_revenue);
        float(&mut cols, &format!("{prefix}_Our_Revenue"), l.our_revenue);
        float(&mut cols, &format!("{prefix}_Market_Revenue"), l.market_revenue);
    }
    for (name, v) in [
        ("Ratio_Partner", vc.ratio_partner),
        ("Ratio_Direct", vc.ratio_direct),
        ("Total_Hardware_System_Our_Revenue", vc.total_hardware_system_our_revenue),
        ("Total_Hardware_System_Market_Revenue", vc.total_hardware_system_market_revenue),
        ("Total_Consumables_Our_Revenue", vc.total_consumables_our_revenue),
        ("Total_Consumables_Market_Revenue", vc.total_consumables_market_revenue),
        ("Total_Our_Cost", vc.total_our_cost),
        ("Total_Our_Revenue", vc.total_our_revenue),
        ("Total_Direct_Revenue", vc.total_direct_revenue),
        ("Total_Market_Revenue", vc.total_market_revenue),
        ("Partner_Profit", vc.partner_profit),
    ] {
        float(&mut cols, name, v);
    }

    // ── Profitability ──────────────────────────────────────────
    let pr = &row.profitability;
    float(&mut cols, "Our_Gross_Profit", pr.our_gross_profit);
    float(&mut cols, "Our_Gross_Margin", pr.our_gross_margin);
    float(&mut cols, "Partner_Attributable_Revenue", pr.partner_attributable_revenue);
    float(&mut cols, "Partner_Margin", pr.partner_margin);
    for kind in LineItemKind::ALL {
        float(&mut cols, &format!("{}_Margin", kind.column_prefix()), pr.line_margins.get(kind));
    }
    for category in RevenueCategory::ALL {
        float(&mut cols, &format!("{}_Revenue_Share", category.column_prefix()), pr.contribution.get(category));
    }

    cols
}

/// Write the whole table as CSV. An empty table writes nothing.
pub fn write_csv<W: Write>(rows: &[ProjectionRow], writer: W) -> ProjResult<()> {
    let mut out = csv::Writer::from_writer(writer);
    let mut header_written = false;

    for row in rows {
        let cols = row_columns(row);
        if !header_written {
            out.write_record(cols.iter().map(|(name, _)| name.as_str()))?;
            header_written = true;
        }
        out.write_record(cols.iter().map(|(_, cell)| cell.render()))?;
    }

    out.flush()?;
    Ok(())
}

/// Write `financial_projection_<YYYYmmdd_HHMMSS>.csv` into `dir`.
pub fn export_timestamped(rows: &[ProjectionRow], dir: &Path) -> ProjResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("financial_projection_{timestamp}.csv"));
    let file = std::fs::File::create(&path)?;
    write_csv(rows, std::io::BufWriter::new(file))?;
    log::info!("Financial projection exported to: {}", path.display());
    Ok(path)
}
