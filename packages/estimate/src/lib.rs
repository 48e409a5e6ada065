#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Cost and duration estimation for paving a gang and cleaning its drain.
//!
//! The estimate covers two work items: paving the gang's full area and
//! cleaning a drain running its length. The subtotal is scaled by a
//! multiplier for the location's flood risk, and the schedule carries a
//! fixed overhead on top of the crew-days for both items.

use bedah_gang_estimate_models::{CostParameter, CostParameters, EstimationInput, EstimationResult};
use thiserror::Error;

/// Errors that can occur while estimating.
#[derive(Debug, Error)]
pub enum EstimateError {
    /// An input dimension or cost parameter is out of range.
    #[error("Invalid {parameter} = {value}: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        parameter: String,
        /// The rejected value.
        value: f64,
        /// What the value must satisfy.
        reason: String,
    },
}

/// Schedule overhead applied to the summed crew-days, as `NUM / DEN`.
const OVERHEAD_NUM: u64 = 6;
const OVERHEAD_DEN: u64 = 5;

/// Cost multiplier for a flood risk score.
///
/// Scores outside 1-5, and an unknown score, use `1.0`.
#[must_use]
pub fn risk_multiplier(risk_score: Option<i64>) -> f64 {
    match risk_score {
        Some(2) => 1.05,
        Some(3) => 1.10,
        Some(4) => 1.20,
        Some(5) => 1.30,
        _ => 1.00,
    }
}

/// Applies recognized overrides on top of the default parameters.
///
/// `None` values and unknown keys are skipped.
#[must_use]
pub fn effective_parameters(input: &EstimationInput) -> CostParameters {
    let mut params = CostParameters::default();
    for (key, value) in &input.overrides {
        let Ok(parameter) = key.parse::<CostParameter>() else {
            log::debug!("Ignoring unknown cost parameter override '{key}'");
            continue;
        };
        if let Some(value) = value {
            params.set(parameter, *value);
        }
    }
    params
}

/// Estimates cost and duration for `input`.
///
/// # Errors
///
/// Returns [`EstimateError::InvalidParameter`] if the width or length is
/// negative or not finite, a unit cost is negative or not finite, or a
/// productivity is not a positive finite number.
pub fn estimate(input: &EstimationInput) -> Result<EstimationResult, EstimateError> {
    let parameters = effective_parameters(input);
    validate(&parameters, input)?;

    let area = input.width * input.length;
    let paving_cost = area * parameters.unit_cost_paving;
    let cleaning_cost = input.length * parameters.unit_cost_drain_clean;
    let risk_multiplier = risk_multiplier(input.risk_score);
    let total_cost = (paving_cost + cleaning_cost) * risk_multiplier;

    let paving_days = crew_days(area, parameters.paving_productivity);
    let cleaning_days = crew_days(input.length, parameters.cleaning_productivity);
    let total_days = with_overhead(paving_days.saturating_add(cleaning_days));

    log::debug!(
        "Estimated {area} m² at risk {:?}: Rp {total_cost:.0}, {total_days} days",
        input.risk_score
    );

    Ok(EstimationResult {
        area,
        parameters,
        paving_cost,
        cleaning_cost,
        risk_multiplier,
        total_cost,
        paving_days,
        cleaning_days,
        total_days,
    })
}

fn validate(parameters: &CostParameters, input: &EstimationInput) -> Result<(), EstimateError> {
    for (name, value) in [("width", input.width), ("length", input.length)] {
        if !value.is_finite() || value < 0.0 {
            return Err(invalid(name, value, "must be a non-negative number"));
        }
    }

    for parameter in CostParameter::all() {
        let value = parameters.get(*parameter);
        if parameter.is_productivity() {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(parameter.as_ref(), value, "must be greater than zero"));
            }
        } else if !value.is_finite() || value < 0.0 {
            return Err(invalid(parameter.as_ref(), value, "must be a non-negative number"));
        }
    }

    Ok(())
}

fn invalid(parameter: &str, value: f64, reason: &str) -> EstimateError {
    EstimateError::InvalidParameter {
        parameter: parameter.to_string(),
        value,
        reason: reason.to_string(),
    }
}

/// Whole crew-days to cover `quantity` at `productivity` per day.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn crew_days(quantity: f64, productivity: f64) -> u64 {
    if quantity > 0.0 {
        // Saturates for absurdly large quantities.
        (quantity / productivity).ceil() as u64
    } else {
        0
    }
}

/// `ceil(days * 6 / 5)` without going through floating point.
const fn with_overhead(days: u64) -> u64 {
    days.saturating_mul(OVERHEAD_NUM)
        .saturating_add(OVERHEAD_DEN - 1)
        / OVERHEAD_DEN
}
