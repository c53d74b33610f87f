//! SQLite persistence for projection runs.
//!
//! RULE: Only store.rs talks to the database.
//! The engine never touches the store; persisting a run is the caller's
//! choice, made after the projection is complete.

use crate::{
    engine::Projection,
    error::ProjResult,
    row::ProjectionRow,
    summary::AnnualSummary,
};
use rusqlite::{params, Connection};

pub struct ProjectionStore {
    conn: Connection,
}

impl ProjectionStore {
    /// Open (or create) the projection database at `path`.
    pub fn open(path: &str) -> ProjResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only for real files; :memory: ignores it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> ProjResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> ProjResult<()> {
        self.conn.execute_batch(include_str!("../../migrations/001_projection.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(&self, projection: &Projection, version: &str) -> ProjResult<()> {
        let scenario_json = serde_json::to_string(&projection.scenario)?;
        self.conn.execute(
            "INSERT INTO projection_run
                (run_id, version, start_year, start_month, projection_years, scenario_json, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                projection.run_id,
                version,
                projection.scenario.start_year,
                projection.scenario.start_month,
                projection.scenario.projection_years,
                scenario_json,
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn run_ids(&self) -> ProjResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT run_id FROM projection_run ORDER BY created_at ASC, run_id ASC")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(ids)
    }

    // ── Rows ───────────────────────────────────────────────────

    /// Insert every row of a run in one transaction.
    pub fn insert_rows(&self, run_id: &str, rows: &[ProjectionRow]) -> ProjResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO projection_row
                    (run_id, row_index, year, month, relative_year, relative_month,
                     partner_carts, direct_carts, total_carts, total_vessels,
                     total_our_cost, total_our_revenue, total_direct_revenue,
                     total_market_revenue, partner_profit, partner_attributable_revenue,
                     payload)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            )?;
            for (index, row) in rows.iter().enumerate() {
                let vc = &row.value_chain;
                stmt.execute(params![
                    run_id,
                    index as i64,
                    row.period.year,
                    row.period.month,
                    row.period.relative_year,
                    row.period.relative_month,
                    row.sales.partner_carts,
                    row.sales.direct_carts,
                    row.sales.total_carts,
                    row.usage.total_vessels,
                    vc.total_our_cost,
                    vc.total_our_revenue,
                    vc.total_direct_revenue,
                    vc.total_market_revenue,
                    vc.partner_profit,
                    row.profitability.partner_attributable_revenue,
                    serde_json::to_string(row)?,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Persist a finished projection: run record plus all rows.
    pub fn save_projection(&self, projection: &Projection, version: &str) -> ProjResult<()> {
        self.insert_run(projection, version)?;
        self.insert_rows(&projection.run_id, &projection.rows)?;
        log::info!(
            "run={} store: saved {} rows",
            projection.run_id,
            projection.rows.len()
        );
        Ok(())
    }

    pub fn row_count(&self, run_id: &str) -> ProjResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM projection_row WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Rows of a run, in calendar order.
    pub fn load_rows(&self, run_id: &str) -> ProjResult<Vec<ProjectionRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT payload FROM projection_row WHERE run_id = ?1 ORDER BY row_index ASC",
        )?;
        let payloads = stmt
            .query_map(params![run_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        payloads
            .iter()
            .map(|p| -> ProjResult<ProjectionRow> { Ok(serde_json::from_str(p)?) })
            .collect()
    }

    /// Per-relative-year totals, computed in SQL.
    pub fn annual_totals(&self, run_id: &str) -> ProjResult<Vec<AnnualSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT relative_year,
                    COUNT(*),
                    SUM(partner_carts),
                    SUM(direct_carts),
                    MAX(total_carts),
                    SUM(total_vessels),
                    SUM(total_our_cost),
                    SUM(total_our_revenue),
                    SUM(total_direct_revenue),
                    SUM(total_market_revenue),
                    SUM(partner_profit),
                    SUM(partner_attributable_revenue)
             FROM projection_row
             WHERE run_id = ?1
             GROUP BY relative_year
             ORDER BY relative_year ASC",
        )?;
        let totals = stmt
            .query_map(params![run_id], |row| {
                let total_our_cost: f64 = row.get(6)?;
                let total_our_revenue: f64 = row.get(7)?;
                let partner_profit: f64 = row.get(10)?;
                let partner_attributable_revenue: f64 = row.get(11)?;
                let gross_profit = total_our_revenue - total_our_cost;
                Ok(AnnualSummary {
                    year: row.get(0)?,
                    months: row.get(1)?,
                    partner_carts: row.get(2)?,
                    direct_carts: row.get(3)?,
                    installed_base: row.get(4)?,
                    total_vessels: row.get(5)?,
                    total_our_cost,
                    total_our_revenue,
                    total_direct_revenue: row.get(8)?,
                    total_market_revenue: row.get(9)?,
                    partner_profit,
                    partner_attributable_revenue,
                    gross_profit,
                    gross_margin: crate::types::safe_ratio(gross_profit, total_our_revenue),
                    partner_margin: crate::types::safe_ratio(partner_profit, partner_attributable_revenue),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(totals)
    }
}
