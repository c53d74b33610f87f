//! Scenario parameters: one evaluation's deterministic inputs.
//!
//! Parsing goes through an all-optional raw shape so that a missing
//! required key is reported by name instead of as a generic serde error.
//! Secondary knobs default to an inert value (off / zero).

use crate::{
    error::{ProjError, ProjResult},
    types::RelativeYear,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Relative year → value. Years absent from the map contribute zero.
pub type YearMap = BTreeMap<RelativeYear, f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub start_year: i32,
    pub start_month: u32,
    pub projection_years: u32,
    /// Flat annual cost-reduction rate, applied linearly to internal costs.
    pub cost_reduction: f64,
    /// Fraction of the installed base that buys a service contract.
    pub service_adoption: f64,
    pub apply_inflation: bool,
    pub apply_reduction: bool,
    pub enable_service: bool,
    /// Accepted for compatibility with older scenario files; not consumed.
    pub additional_revenue: f64,
    pub selling_price_reduction_by_year: YearMap,
    pub partner_sales_by_year: YearMap,
    pub direct_sales_by_year: YearMap,
}

#[derive(Debug, Default, Deserialize)]
struct RawScenario {
    start_year: Option<i32>,
    start_month: Option<u32>,
    projection_years: Option<u32>,
    cost_reduction: Option<f64>,
    service_adoption: Option<f64>,
    apply_inflation: Option<bool>,
    apply_reduction: Option<bool>,
    enable_service: Option<bool>,
    additional_revenue: Option<f64>,
    selling_price_reduction_by_year: Option<YearMap>,
    partner_sales_by_year: Option<YearMap>,
    direct_sales_by_year: Option<YearMap>,
}

impl Scenario {
    /// A scenario with the given horizon and partner targets and every
    /// optional knob inert.
    pub fn new(start_year: i32, start_month: u32, projection_years: u32, partner_sales_by_year: YearMap) -> Self {
        Self {
            start_year,
            start_month,
            projection_years,
            cost_reduction: 0.0,
            service_adoption: 0.0,
            apply_inflation: false,
            apply_reduction: false,
            enable_service: false,
            additional_revenue: 0.0,
            selling_price_reduction_by_year: YearMap::new(),
            partner_sales_by_year,
            direct_sales_by_year: YearMap::new(),
        }
    }

    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        Ok(Self::from_json_str(&content)?)
    }

    pub fn from_json_str(json: &str) -> ProjResult<Self> {
        let raw: RawScenario = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    pub fn from_value(value: serde_json::Value) -> ProjResult<Self> {
        let raw: RawScenario = serde_json::from_value(value)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawScenario) -> ProjResult<Self> {
        let scenario = Self {
            start_year: raw.start_year.ok_or(ProjError::MissingScenarioKey { key: "start_year" })?,
            start_month: raw.start_month.ok_or(ProjError::MissingScenarioKey { key: "start_month" })?,
            projection_years: raw
                .projection_years
                .ok_or(ProjError::MissingScenarioKey { key: "projection_years" })?,
            partner_sales_by_year: raw
                .partner_sales_by_year
                .ok_or(ProjError::MissingScenarioKey { key: "partner_sales_by_year" })?,
            cost_reduction: raw.cost_reduction.unwrap_or(0.0),
            service_adoption: raw.service_adoption.unwrap_or(0.0),
            apply_inflation: raw.apply_inflation.unwrap_or(false),
            apply_reduction: raw.apply_reduction.unwrap_or(false),
            enable_service: raw.enable_service.unwrap_or(false),
            additional_revenue: raw.additional_revenue.unwrap_or(0.0),
            selling_price_reduction_by_year: raw.selling_price_reduction_by_year.unwrap_or_default(),
            direct_sales_by_year: raw.direct_sales_by_year.unwrap_or_default(),
        };
        scenario.validate()?;
        Ok(scenario)
    }

    /// Reject inputs no projection can make sense of. Silent: advisory
    /// findings come from `warnings()`.
    pub fn validate(&self) -> ProjResult<()> {
        if !(1..=12).contains(&self.start_month) {
            return Err(invalid(format!("start_month must be 1..=12, got {}", self.start_month)));
        }
        if self.projection_years == 0 {
            return Err(invalid("projection_years must be at least 1".into()));
        }

        let scalars = [
            ("cost_reduction", self.cost_reduction),
            ("service_adoption", self.service_adoption),
            ("additional_revenue", self.additional_revenue),
        ];
        for (name, value) in scalars {
            if !value.is_finite() {
                return Err(invalid(format!("{name} must be finite, got {value}")));
            }
        }
        if self.cost_reduction < 0.0 {
            return Err(invalid(format!("cost_reduction must be non-negative, got {}", self.cost_reduction)));
        }
        if !(0.0..=1.0).contains(&self.service_adoption) {
            return Err(invalid(format!(
                "service_adoption must be within [0, 1], got {}",
                self.service_adoption
            )));
        }

        for (name, map) in self.year_maps() {
            for (year, value) in map {
                if !value.is_finite() {
                    return Err(invalid(format!("{name}[{year}] must be finite, got {value}")));
                }
            }
        }
        for (name, map) in [
            ("partner_sales_by_year", &self.partner_sales_by_year),
            ("direct_sales_by_year", &self.direct_sales_by_year),
        ] {
            if let Some((year, value)) = map.iter().find(|(_, v)| **v < 0.0) {
                return Err(invalid(format!("{name}[{year}] must be non-negative, got {value}")));
            }
        }
        if let Some((year, value)) = self
            .selling_price_reduction_by_year
            .iter()
            .find(|(_, v)| !(0.0..=1.0).contains(*v))
        {
            return Err(invalid(format!(
                "selling_price_reduction_by_year[{year}] must be within [0, 1], got {value}"
            )));
        }
        Ok(())
    }

    /// Legal but suspicious inputs: map entries outside the horizon and a
    /// nonzero `additional_revenue`, which the model does not consume.
    pub fn warnings(&self) -> Vec<String> {
        let mut out = Vec::new();
        for (name, map) in self.year_maps() {
            for year in map.keys() {
                if *year == 0 || *year > self.projection_years {
                    out.push(format!(
                        "{name} has relative year {year} outside the {}-year horizon; ignored",
                        self.projection_years
                    ));
                }
            }
        }
        if self.additional_revenue != 0.0 {
            out.push(format!(
                "additional_revenue={} is not consumed by the model",
                self.additional_revenue
            ));
        }
        out
    }

    fn year_maps(&self) -> [(&'static str, &YearMap); 3] {
        [
            ("selling_price_reduction_by_year", &self.selling_price_reduction_by_year),
            ("partner_sales_by_year", &self.partner_sales_by_year),
            ("direct_sales_by_year", &self.direct_sales_by_year),
        ]
    }

    pub fn partner_target(&self, year: RelativeYear) -> f64 {
        self.partner_sales_by_year.get(&year).copied().unwrap_or(0.0)
    }

    pub fn direct_target(&self, year: RelativeYear) -> f64 {
        self.direct_sales_by_year.get(&year).copied().unwrap_or(0.0)
    }

    pub fn price_reduction(&self, year: RelativeYear) -> f64 {
        self.selling_price_reduction_by_year.get(&year).copied().unwrap_or(0.0)
    }
}

fn invalid(reason: String) -> ProjError {
    ProjError::InvalidScenario { reason }
}
