//! The projection engine: wires a scenario through the pipeline.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   0. Time grid            (engine internal, creates the rows)
//!   1. Unit sales stage
//!   2. Pricing stage
//!   3. Consumables stage
//!   4. Value-chain stage
//!   5. Profitability stage
//!
//! RULES:
//!   - Stages execute in registration order, once per evaluation.
//!   - Each stage fills exactly one column group and only reads others.
//!   - A stage whose inputs are not filled yet fails the run.
//!   - An evaluation touches no shared mutable state; engines may be
//!     used from several threads at once.

use crate::{
    config::ModelConfig,
    consumables_stage::ConsumablesStage,
    error::{ProjError, ProjResult},
    pricing_stage::PricingStage,
    profitability_stage::ProfitabilityStage,
    row::{ProjectionRow, ProjectionTable},
    scenario::Scenario,
    stage::{ProjectionStage, StageContext},
    summary::{annual_summary, AnnualSummary, GroupBy},
    time_grid::build_time_grid,
    types::RunId,
    unit_sales_stage::UnitSalesStage,
    value_chain_stage::ValueChainStage,
};
use chrono::NaiveDate;

/// The result of one scenario evaluation.
#[derive(Debug, Clone)]
pub struct Projection {
    pub run_id:   RunId,
    pub scenario: Scenario,
    pub start:    NaiveDate,
    pub end:      NaiveDate,
    pub rows:     Vec<ProjectionRow>,
}

impl Projection {
    pub fn annual_summary(&self, group_by: GroupBy) -> Vec<AnnualSummary> {
        annual_summary(&self.rows, group_by)
    }
}

pub struct ProjectionEngine {
    config: ModelConfig,
    stages: Vec<Box<dyn ProjectionStage>>,
}

impl ProjectionEngine {
    /// An engine with no stages registered. Rows carry the time grid only.
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            stages: Vec::new(),
        }
    }

    /// Build a fully wired engine with all stages registered.
    /// Call this instead of new() + manual register() calls.
    pub fn build(config: ModelConfig) -> Self {
        let mut engine = ProjectionEngine::new(config);

        // EXECUTION ORDER: fixed, documented, never reordered.
        engine.register(Box::new(UnitSalesStage));
        engine.register(Box::new(PricingStage));
        engine.register(Box::new(ConsumablesStage));
        engine.register(Box::new(ValueChainStage));
        engine.register(Box::new(ProfitabilityStage));
        engine
    }

    /// Engine over the baseline configuration, for tests.
    pub fn build_test() -> Self {
        Self::build(ModelConfig::default_test())
    }

    /// Register a stage. Call in the documented execution order.
    pub fn register(&mut self, stage: Box<dyn ProjectionStage>) {
        self.stages.push(stage);
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Evaluate a scenario under a fresh run id.
    pub fn run(&self, scenario: &Scenario) -> ProjResult<Projection> {
        self.run_with_id(uuid::Uuid::new_v4().to_string(), scenario)
    }

    pub fn run_with_id(&self, run_id: RunId, scenario: &Scenario) -> ProjResult<Projection> {
        scenario.validate()?;
        for warning in scenario.warnings() {
            log::warn!("run={run_id} scenario: {warning}");
        }
        log::info!(
            "run={run_id} projection: start {}-{:02}, {} years",
            scenario.start_year,
            scenario.start_month,
            scenario.projection_years
        );

        let grid = build_time_grid(scenario.start_year, scenario.start_month, scenario.projection_years)?;
        let mut table = ProjectionTable::from_periods(grid.periods);
        let ctx = StageContext::new(&self.config, scenario);

        for stage in &self.stages {
            if let Some(missing) = stage.requires().iter().find(|g| !table.is_complete(**g)) {
                return Err(ProjError::StageOrder {
                    stage:   stage.name(),
                    missing: missing.name(),
                });
            }
            stage.apply(&mut table, &ctx)?;
            table.mark_complete(stage.produces());
            log::debug!("run={run_id} stage '{}' complete", stage.name());
        }

        log::info!("run={run_id} projection: {} rows", table.len());

        Ok(Projection {
            run_id,
            scenario: scenario.clone(),
            start: grid.start,
            end: grid.end,
            rows: table.into_rows(),
        })
    }
}
