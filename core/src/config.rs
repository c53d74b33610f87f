//! Model configuration: the immutable constant tables every stage reads.
//!
//! Loaded once per run and shared read-only. The only logic here is the
//! derived runs-per-cart figure and load-time validation.

use crate::error::{ProjError, ProjResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ── Hardware ───────────────────────────────────────────────────────

/// Costs and end-customer prices for the cart and its add-on components.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartConfig {
    /// Bill of materials for the base hardware (cart without TCU,
    /// utility cart or autofiller).
    pub components_cost: f64,
    /// Labor loaded on top of components, as a fraction of components.
    pub labor_cost_percentage: f64,
    pub tcu_cost: f64,
    pub tcu_price: f64,
    pub utility_cart_cost: f64,
    pub utility_cart_price: f64,
    pub autofiller_cost: f64,
    pub autofiller_price: f64,
}

impl CartConfig {
    /// Manufacturing cost of the base hardware, labor included.
    pub fn base_hardware_cost(&self) -> f64 {
        self.components_cost * (1.0 + self.labor_cost_percentage)
    }
}

// ── Consumables ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumablesConfig {
    pub vessel_cost: f64,
    pub vessel_price: f64,
    pub autofiller_pack_cost: f64,
    pub autofiller_pack_price: f64,
    /// Multiplier on autofiller-pack volume (wastage/buffer). 1.0 in every
    /// configuration seen so far.
    pub safety_factor: f64,
}

// ── Software & service ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftwareConfig {
    /// One-time software subscription billed per cart sold.
    pub subscription_price: f64,
    /// Annual service contract as a fraction of the hardware price.
    pub service_contract_percentage: f64,
}

// ── Operational ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationalConfig {
    pub cart_utilization_percentage: f64,
    pub partner_hardware_discount: f64,
    pub partner_consumables_discount: f64,
    pub installation_price: f64,
    pub installation_cost: f64,
    /// Share of service revenue spent delivering the service.
    pub service_cost_ratio: f64,
}

// ── Macro financial ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialConfig {
    pub inflation_rate: f64,
    /// End-customer list price of the base hardware portion.
    pub base_hardware_price: f64,
}

// ── Process / run mix ──────────────────────────────────────────────

/// One vessel type within a process family, with its share of all runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VesselType {
    pub name: String,
    pub run_percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessFamily {
    pub name: String,
    pub runs_per_month: f64,
    pub vessel_types: Vec<VesselType>,
}

impl ProcessFamily {
    pub fn run_share(&self) -> f64 {
        self.vessel_types.iter().map(|v| v.run_percentage).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessConfig {
    /// Vessels operated per cart per run cycle.
    pub vessels_per_run_cycle: f64,
    pub families: Vec<ProcessFamily>,
}

impl ProcessConfig {
    /// Runs per cart per year: monthly runs × 12 × the family's share of
    /// the run mix, summed over families.
    pub fn total_runs_per_year_per_cart(&self) -> f64 {
        self.families
            .iter()
            .map(|f| f.runs_per_month * 12.0 * f.run_share())
            .sum()
    }

    /// Every configured vessel type, family order then declaration order.
    pub fn vessel_types(&self) -> impl Iterator<Item = &VesselType> {
        self.families.iter().flat_map(|f| f.vessel_types.iter())
    }

    pub fn total_run_percentage(&self) -> f64 {
        self.vessel_types().map(|v| v.run_percentage).sum()
    }
}

// ── Root ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub cart: CartConfig,
    pub consumables: ConsumablesConfig,
    pub software: SoftwareConfig,
    pub operational: OperationalConfig,
    pub financial: FinancialConfig,
    pub process: ProcessConfig,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            cart: CartConfig {
                components_cost: 76_000.0,
                labor_cost_percentage: 0.25,
                tcu_cost: 5_000.0,
                tcu_price: 6_000.0,
                utility_cart_cost: 3_000.0,
                utility_cart_price: 6_000.0,
                autofiller_cost: 3_000.0,
                autofiller_price: 6_000.0,
            },
            consumables: ConsumablesConfig {
                vessel_cost: 325.0,
                vessel_price: 600.0,
                autofiller_pack_cost: 29.0,
                autofiller_pack_price: 80.0,
                safety_factor: 1.0,
            },
            software: SoftwareConfig {
                subscription_price: 10_000.0,
                service_contract_percentage: 0.10,
            },
            operational: OperationalConfig {
                cart_utilization_percentage: 0.80,
                partner_hardware_discount: 0.25,
                partner_consumables_discount: 0.30,
                installation_price: 10_000.0,
                installation_cost: 5_000.0,
                service_cost_ratio: 0.40,
            },
            financial: FinancialConfig {
                inflation_rate: 0.025,
                base_hardware_price: 212_000.0,
            },
            process: ProcessConfig {
                vessels_per_run_cycle: 4.0,
                families: vec![
                    ProcessFamily {
                        name: "Mammalian".into(),
                        runs_per_month: 1.0,
                        vessel_types: vec![
                            VesselType { name: "Mammalian_Vessels".into(), run_percentage: 0.64 },
                            VesselType { name: "Mammalian_Glass_Vessels".into(), run_percentage: 0.16 },
                        ],
                    },
                    ProcessFamily {
                        name: "AAV".into(),
                        runs_per_month: 2.0,
                        vessel_types: vec![
                            VesselType { name: "AAV_Man_Vessels".into(), run_percentage: 0.00 },
                            VesselType { name: "AAV_Auto_Vessels".into(), run_percentage: 0.20 },
                        ],
                    },
                ],
            },
        }
    }
}

impl ModelConfig {
    /// Load from a JSON file.
    /// In tests, use ModelConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: ModelConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        log::info!(
            "config: loaded {path} ({} vessel types, {:.2} runs/cart/year)",
            config.process.vessel_types().count(),
            config.process.total_runs_per_year_per_cart()
        );
        Ok(config)
    }

    /// Config with the baseline constants, for use in tests.
    pub fn default_test() -> Self {
        Self::default()
    }

    /// Reject values no scenario could make sense of. A run mix above 100%
    /// is only warned about: it is the caller's to keep consistent.
    pub fn validate(&self) -> ProjResult<()> {
        let fractions = [
            ("cart.labor_cost_percentage", self.cart.labor_cost_percentage),
            ("software.service_contract_percentage", self.software.service_contract_percentage),
            ("operational.cart_utilization_percentage", self.operational.cart_utilization_percentage),
            ("operational.partner_hardware_discount", self.operational.partner_hardware_discount),
            ("operational.partner_consumables_discount", self.operational.partner_consumables_discount),
            ("operational.service_cost_ratio", self.operational.service_cost_ratio),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(ProjError::InvalidConfig {
                    reason: format!("{name} must be within [0, 1], got {value}"),
                });
            }
        }

        for vessel in self.process.vessel_types() {
            if !(0.0..=1.0).contains(&vessel.run_percentage) {
                return Err(ProjError::InvalidConfig {
                    reason: format!(
                        "run percentage for {} must be within [0, 1], got {}",
                        vessel.name, vessel.run_percentage
                    ),
                });
            }
        }

        let amounts = self.to_flat_map();
        if let Some((name, value)) = amounts.iter().find(|(_, v)| !v.is_finite() || **v < 0.0) {
            return Err(ProjError::InvalidConfig {
                reason: format!("{name} must be a non-negative number, got {value}"),
            });
        }

        let mix = self.process.total_run_percentage();
        if mix > 1.0 + 1e-9 {
            log::warn!("config: run-mix percentages sum to {mix:.3} (> 1.0)");
        }
        Ok(())
    }

    /// Every numeric constant keyed by its dotted path, for debugging/logging.
    pub fn to_flat_map(&self) -> BTreeMap<String, f64> {
        let mut out = BTreeMap::new();
        // Serializing plain structs of numbers and strings cannot fail.
        if let Ok(value) = serde_json::to_value(self) {
            flatten_numbers("", &value, &mut out);
        }
        out
    }
}

fn flatten_numbers(prefix: &str, value: &serde_json::Value, out: &mut BTreeMap<String, f64>) {
    use serde_json::Value;
    match value {
        Value::Number(n) => {
            if let Some(f) = n.as_f64() {
                out.insert(prefix.to_string(), f);
            }
        }
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() { key.clone() } else { format!("{prefix}.{key}") };
                flatten_numbers(&path, child, out);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                flatten_numbers(&format!("{prefix}[{i}]"), child, out);
            }
        }
        _ => {}
    }
}
