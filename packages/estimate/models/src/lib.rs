#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Types for estimating the cost and duration of a gang improvement.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A tunable cost or productivity parameter.
///
/// The snake_case name is the key used in override maps.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CostParameter {
    /// Paving cost in Rupiah per square meter.
    UnitCostPaving,
    /// Drain cleaning cost in Rupiah per meter.
    UnitCostDrainClean,
    /// Square meters one crew paves per day.
    PavingProductivity,
    /// Meters of drain one crew cleans per day.
    CleaningProductivity,
}

impl CostParameter {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::UnitCostPaving,
            Self::UnitCostDrainClean,
            Self::PavingProductivity,
            Self::CleaningProductivity,
        ]
    }

    /// Whether this parameter is a crew productivity rate.
    #[must_use]
    pub const fn is_productivity(self) -> bool {
        matches!(self, Self::PavingProductivity | Self::CleaningProductivity)
    }
}

/// Unit costs and crew productivities used by the estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostParameters {
    /// Rp/m².
    pub unit_cost_paving: f64,
    /// Rp/m.
    pub unit_cost_drain_clean: f64,
    /// m²/crew-day.
    pub paving_productivity: f64,
    /// m/crew-day.
    pub cleaning_productivity: f64,
}

impl Default for CostParameters {
    fn default() -> Self {
        Self {
            unit_cost_paving: 350_000.0,
            unit_cost_drain_clean: 50_000.0,
            paving_productivity: 15.0,
            cleaning_productivity: 30.0,
        }
    }
}

impl CostParameters {
    /// Returns the value of `parameter`.
    #[must_use]
    pub const fn get(&self, parameter: CostParameter) -> f64 {
        match parameter {
            CostParameter::UnitCostPaving => self.unit_cost_paving,
            CostParameter::UnitCostDrainClean => self.unit_cost_drain_clean,
            CostParameter::PavingProductivity => self.paving_productivity,
            CostParameter::CleaningProductivity => self.cleaning_productivity,
        }
    }

    /// Replaces the value of `parameter`.
    pub const fn set(&mut self, parameter: CostParameter, value: f64) {
        match parameter {
            CostParameter::UnitCostPaving => self.unit_cost_paving = value,
            CostParameter::UnitCostDrainClean => self.unit_cost_drain_clean = value,
            CostParameter::PavingProductivity => self.paving_productivity = value,
            CostParameter::CleaningProductivity => self.cleaning_productivity = value,
        }
    }
}

/// Dimensions and risk of the gang to estimate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimationInput {
    /// Gang width in meters.
    pub width: f64,
    /// Gang length in meters.
    pub length: f64,
    /// Flood risk score (1-5), if known.
    #[serde(default)]
    pub risk_score: Option<i64>,
    /// Parameter overrides keyed by [`CostParameter`] name. `None` values
    /// and unknown keys leave the default in place.
    #[serde(default)]
    pub overrides: BTreeMap<String, Option<f64>>,
}

/// Cost and duration plan for one gang.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimationResult {
    /// Paved area in m².
    pub area: f64,
    /// Parameters actually used, after overrides.
    pub parameters: CostParameters,
    /// Area times the paving unit cost, in Rupiah.
    pub paving_cost: f64,
    /// Length times the drain cleaning unit cost, in Rupiah.
    pub cleaning_cost: f64,
    /// Factor applied to the subtotal for the location's flood risk.
    pub risk_multiplier: f64,
    /// Paving and cleaning cost scaled by the risk multiplier.
    pub total_cost: f64,
    /// Crew-days to pave the area, rounded up.
    pub paving_days: u64,
    /// Crew-days to clean the drain, rounded up.
    pub cleaning_days: u64,
    /// Paving plus cleaning days with schedule overhead, rounded up.
    pub total_days: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_keys_are_snake_case() {
        assert_eq!(CostParameter::UnitCostDrainClean.to_string(), "unit_cost_drain_clean");
        assert_eq!(
            "paving_productivity".parse::<CostParameter>(),
            Ok(CostParameter::PavingProductivity)
        );
        assert!("labour_rate".parse::<CostParameter>().is_err());
    }

    #[test]
    fn get_and_set_cover_every_parameter() {
        let mut params = CostParameters::default();
        for (i, parameter) in CostParameter::all().iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let value = i as f64 + 0.5;
            params.set(*parameter, value);
            assert!((params.get(*parameter) - value).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn input_deserializes_with_defaults() {
        let input: EstimationInput =
            serde_json::from_str(r#"{ "width": 2.0, "length": 10.0 }"#).unwrap();
        assert_eq!(input.risk_score, None);
        assert!(input.overrides.is_empty());

        let input: EstimationInput = serde_json::from_str(
            r#"{ "width": 2.0, "length": 10.0, "riskScore": 3, "overrides": { "unit_cost_paving": null } }"#,
        )
        .unwrap();
        assert_eq!(input.risk_score, Some(3));
        assert_eq!(input.overrides.get("unit_cost_paving"), Some(&None));
    }

    #[test]
    fn productivity_parameters() {
        assert!(CostParameter::PavingProductivity.is_productivity());
        assert!(!CostParameter::UnitCostPaving.is_productivity());
    }
}
