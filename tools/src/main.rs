//! proj-runner: headless scenario runner for the cart projection model.
//!
//! Usage:
//!   proj-runner --scenario data/scenarios/oem_partnership.json
//!   proj-runner --scenario s.json --config data/model_config.json --out-dir ~/Downloads
//!   proj-runner --scenario s.json --db runs.db --group-by relative --json

use anyhow::Result;
use cartproj_core::{
    engine::{Projection, ProjectionEngine},
    export,
    store::ProjectionStore,
    summary::{AnnualSummary, GroupBy},
    ModelConfig, Scenario,
};
use std::env;
use std::path::Path;

#[derive(serde::Serialize)]
struct RunReport<'a> {
    run_id: &'a str,
    start: String,
    end: String,
    rows: usize,
    group_by: GroupBy,
    annual: Vec<AnnualSummary>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let scenario_path = arg_value(&args, "--scenario").unwrap_or("./data/scenarios/oem_partnership.json");
    let config_path = arg_value(&args, "--config");
    let out_dir = arg_value(&args, "--out-dir");
    let db = arg_value(&args, "--db");
    let json = args.iter().any(|a| a == "--json");
    let group_by = match arg_value(&args, "--group-by").unwrap_or("year") {
        "relative" | "relative_year" => GroupBy::RelativeYear,
        "year" => GroupBy::Year,
        other => anyhow::bail!("--group-by must be 'year' or 'relative', got '{other}'"),
    };

    let config = match config_path {
        Some(path) => ModelConfig::load(path)?,
        None => ModelConfig::default(),
    };
    let scenario = Scenario::load(scenario_path)?;

    if !json {
        println!("Cart projection: proj-runner");
        println!("  started:   {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
        println!("  scenario:  {scenario_path}");
        println!("  config:    {}", config_path.unwrap_or("(built-in defaults)"));
        println!("  db:        {}", db.unwrap_or("(none)"));
        println!();
    }

    let engine = ProjectionEngine::build(config);
    let projection = engine.run(&scenario)?;

    if let Some(dir) = out_dir {
        let path = export::export_timestamped(&projection.rows, Path::new(dir))?;
        if !json {
            println!("Financial projection exported to: {}", path.display());
        }
    }

    if let Some(db) = db {
        let store = ProjectionStore::open(db)?;
        store.migrate()?;
        store.save_projection(&projection, env!("CARGO_PKG_VERSION"))?;
        log::info!("run={} saved to {db}", projection.run_id);
    }

    let annual = projection.annual_summary(group_by);
    if json {
        let report = RunReport {
            run_id: &projection.run_id,
            start: projection.start.format("%Y-%m").to_string(),
            end: projection.end.format("%Y-%m").to_string(),
            rows: projection.rows.len(),
            group_by,
            annual,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&projection, group_by, &annual);
    }

    Ok(())
}

fn print_summary(projection: &Projection, group_by: GroupBy, annual: &[AnnualSummary]) {
    let label = match group_by {
        GroupBy::Year => "Year",
        GroupBy::RelativeYear => "RelYear",
    };

    println!("=== RUN SUMMARY ===");
    println!("  run_id:   {}", projection.run_id);
    println!(
        "  horizon:  {} to {} ({} months)",
        projection.start.format("%Y-%m"),
        projection.end.format("%Y-%m"),
        projection.rows.len()
    );
    println!();
    println!("=== KEY METRICS ===");
    println!(
        "  {label:>7} | {:>14} | {:>14} | {:>7} | {:>14} | {:>7} | {:>7}",
        "Our Revenue", "Gross Profit", "Margin", "Market Rev", "Direct", "Partner"
    );
    for s in annual {
        println!(
            "  {:>7} | {:>14.0} | {:>14.0} | {:>6.1}% | {:>14.0} | {:>7} | {:>7}",
            s.year,
            s.total_our_revenue,
            s.gross_profit,
            s.gross_margin * 100.0,
            s.total_market_revenue,
            s.direct_carts,
            s.partner_carts
        );
    }
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
