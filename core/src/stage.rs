//! Stage trait and shared context.
//!
//! RULE: Every pipeline step implements ProjectionStage.
//! The engine calls apply() on each registered stage in registration
//! order, once per projection. Execution order is fixed and documented
//! in engine.rs.

use crate::{
    config::ModelConfig,
    error::ProjResult,
    pricing_curve::CurvePolicy,
    row::{ColumnGroup, ProjectionTable},
    scenario::Scenario,
};

/// Read-only inputs shared by every stage of one evaluation.
pub struct StageContext<'a> {
    pub config:   &'a ModelConfig,
    pub scenario: &'a Scenario,
    pub curve:    CurvePolicy,
}

impl<'a> StageContext<'a> {
    pub fn new(config: &'a ModelConfig, scenario: &'a Scenario) -> Self {
        Self {
            config,
            scenario,
            curve: CurvePolicy::new(config, scenario),
        }
    }
}

/// The contract every stage must fulfill.
pub trait ProjectionStage: Send + Sync {
    /// Unique stable name for this stage.
    fn name(&self) -> &'static str;

    /// Column groups that must be filled before this stage runs.
    fn requires(&self) -> &'static [ColumnGroup];

    /// The single column group this stage fills.
    fn produces(&self) -> ColumnGroup;

    /// Fill `produces()` for every row. Earlier groups are read, never
    /// written.
    fn apply(&self, table: &mut ProjectionTable, ctx: &StageContext<'_>) -> ProjResult<()>;
}
