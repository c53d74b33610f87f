//! Monthly financial projection engine for a cart-plus-consumables
//! business sold through partner and direct channels.
//!
//! Pipeline: time grid → unit sales → pricing → consumables usage →
//! value chain → profitability. See engine.rs for the execution rules.

pub mod config;
pub mod consumables_stage;
pub mod engine;
pub mod error;
pub mod export;
pub mod pricing_curve;
pub mod pricing_stage;
pub mod profitability_stage;
pub mod row;
pub mod scenario;
pub mod stage;
pub mod store;
pub mod summary;
pub mod time_grid;
pub mod types;
pub mod unit_sales_stage;
pub mod value_chain_stage;

pub use config::ModelConfig;
pub use engine::{Projection, ProjectionEngine};
pub use error::{ProjError, ProjResult};
pub use scenario::Scenario;
