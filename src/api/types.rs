//! API response and query types.
//!
//! Record field names follow the CSV export header so that both formats
//! read the same.

use serde::{Deserialize, Serialize};

use crate::calendar::MonthLabel;
use crate::sim::TeaRun;
use crate::sim::report::TeaReport;
use crate::sim::types::{CaseParameters, DataCenter, SimConfig};

/// Scenario inputs plus the cost report.
#[derive(Debug, Serialize)]
pub struct StateResponse {
    /// Run settings.
    pub config: SimConfig,
    /// Rack fleet.
    pub datacenter: DataCenter,
    /// Case parameters.
    pub cases: Vec<CaseParameters>,
    /// Horizon totals per case.
    pub report: TeaReport,
}

/// One case at one step.
#[derive(Debug, Serialize)]
pub struct StepRecord {
    /// Case label.
    pub case: String,
    /// Step index.
    pub step: usize,
    /// Step position in years.
    pub time_years: f64,
    /// Calendar month of the step.
    pub month: MonthLabel,
    /// Electricity price (currency per kWh).
    pub price_per_kwh: f64,
    /// Activity fraction.
    pub activity: f64,
    /// Capital cost.
    pub capital: f64,
    /// IT energy cost.
    pub it_energy: f64,
    /// Cooling energy cost.
    pub cooling_energy: f64,
    /// Maintenance cost.
    pub maintenance: f64,
    /// Total cost.
    pub total: f64,
    /// Electricity consumption.
    pub consumption: f64,
}

impl StepRecord {
    /// Builds the record of case `c` at step `i`.
    pub fn from_run(run: &TeaRun, c: usize, i: usize) -> Self {
        let s = &run.series[c];
        Self {
            case: s.name.clone(),
            step: i,
            time_years: i as f64 / run.config.granularity.steps_per_year() as f64,
            month: run.aligned.months[i],
            price_per_kwh: run.aligned.price[i],
            activity: run.aligned.activity[i],
            capital: s.capital[i],
            it_energy: s.it_energy[i],
            cooling_energy: s.cooling_energy[i],
            maintenance: s.maintenance[i],
            total: s.total[i],
            consumption: s.consumption[i],
        }
    }
}

/// Optional filters for the series endpoint.
#[derive(Debug, Deserialize)]
pub struct SeriesQuery {
    /// Case name; all cases when absent.
    pub case: Option<String>,
    /// Start step (inclusive).
    pub from: Option<usize>,
    /// End step (inclusive).
    pub to: Option<usize>,
}

/// View selection for the chart endpoint.
#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    /// Menu label or slug; `None` view when absent.
    pub view: Option<String>,
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
