//! TEA computation core: alignment, projection, and derived views.

use log::info;
use serde::Serialize;

use crate::error::TeaError;
use crate::io::tables::{ActivityTable, PriceTable};

/// Read-only cumulative and month-averaged views for charting.
pub mod aggregate;
/// Horizon alignment of the source tables.
pub mod align;
pub mod projector;
pub mod report;
pub mod types;

use align::{AlignedSeries, align};
use projector::Projector;
use types::{CaseParameters, ConsumptionFormula, CostSeries, DataCenter, DiscountMode, SimConfig};

/// Everything a run consumes besides the source tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunInputs {
    /// Horizon, region, and discounting settings.
    pub config: SimConfig,
    /// Rack fleet shared by all cases.
    pub datacenter: DataCenter,
    /// Cases in display order.
    pub cases: Vec<CaseParameters>,
    /// Consumption formula; the granularity's own when `None`.
    pub consumption: Option<ConsumptionFormula>,
}

impl RunInputs {
    /// Checks every parameter and returns all violations found.
    ///
    /// Returns an empty vector if the inputs are valid.
    pub fn validate(&self) -> Vec<TeaError> {
        let mut errors = Vec::new();

        if let Err(e) = self.config.horizon_steps() {
            errors.push(e);
        }
        // Nominal runs ignore the entered rate
        let rate = self.config.interest_rate_pct;
        if self.config.discounting == DiscountMode::Present && (!rate.is_finite() || rate <= -100.0)
        {
            errors.push(TeaError::invalid(
                "simulation.interest_rate_pct",
                format!("must be a number above -100, got {rate}"),
            ));
        }
        if self.config.region.trim().is_empty() {
            errors.push(TeaError::invalid("simulation.region", "must not be empty"));
        }

        let kw = self.datacenter.rack_power_kw;
        if !kw.is_finite() || kw < 0.0 {
            errors.push(TeaError::invalid(
                "datacenter.rack_power_kw",
                format!("must be a non-negative number, got {kw}"),
            ));
        }

        if self.cases.is_empty() {
            errors.push(TeaError::invalid("cases.names", "at least one case is required"));
        }
        for (i, case) in self.cases.iter().enumerate() {
            errors.extend(case.validate(i));
        }

        errors
    }
}

/// Result of one run: the inputs, aligned series, and per-case costs.
///
/// Produced once per invocation and never mutated by the views built from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeaRun {
    /// Settings the run used.
    pub config: SimConfig,
    /// Rack fleet.
    pub datacenter: DataCenter,
    /// Case parameters, index-aligned with `series`.
    pub cases: Vec<CaseParameters>,
    /// Price and activity per step.
    pub aligned: AlignedSeries,
    /// Cost breakdown per case.
    pub series: Vec<CostSeries>,
}

/// Runs the full TEA: validate, align, project.
///
/// A pure function of its arguments, so it is safe to call concurrently and
/// yields bit-identical output for identical input.
///
/// # Errors
///
/// Returns the first validation error, or any alignment/projection error.
/// No partial result is produced.
pub fn run(
    inputs: RunInputs,
    prices: &PriceTable,
    activity: &ActivityTable,
) -> Result<TeaRun, TeaError> {
    if let Some(e) = inputs.validate().into_iter().next() {
        return Err(e);
    }

    let RunInputs {
        config,
        datacenter,
        cases,
        consumption,
    } = inputs;

    let aligned = align(prices, activity, &config)?;
    let mut projector = Projector::new(&config, datacenter, &aligned)?;
    if let Some(formula) = consumption {
        projector = projector.with_consumption_formula(formula);
    }
    let series = projector.project(&cases)?;

    info!(
        "computed {} case(s) over {} {} steps for {}",
        series.len(),
        aligned.len(),
        config.granularity,
        config.region
    );

    Ok(TeaRun {
        config,
        datacenter,
        cases,
        aligned,
        series,
    })
}
